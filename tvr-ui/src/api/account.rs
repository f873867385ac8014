//! Account management endpoints
//!
//! Email change, password change, and account deletion. All routes here sit
//! behind the session middleware.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tvr_common::auth::verify_password;
use tvr_common::db::init::get_setting_i64;

use crate::api::session::{clear_session_cookie, session_cookie, CurrentUser};
use crate::db::{profiles, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/account
pub async fn get_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<serde_json::Value>> {
    let user = users::find_by_guid(&state.db, &current.guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    let email_verified = profiles::find_by_user(&state.db, &current.guid)
        .await?
        .map(|p| p.email_verified)
        .unwrap_or(false);

    Ok(Json(json!({
        "guid": user.guid,
        "username": user.username,
        "email": user.email,
        "email_verified": email_verified,
        "is_admin": user.is_admin,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EmailChangeRequest {
    pub email: String,
}

/// POST /api/account/email
pub async fn change_email(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<EmailChangeRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    let user = users::find_by_guid(&state.db, &current.guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if email != user.email && users::email_exists(&state.db, email).await? {
        return Err(ApiError::Conflict(
            "This email address is already in use".to_string(),
        ));
    }

    users::update_email(&state.db, &current.guid, email).await?;

    Ok(Json(json!({ "message": "Your email has been updated" })))
}

#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/account/password
///
/// On success every existing session is dropped and a fresh one is issued so
/// the caller stays logged in.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<PasswordChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.new_password.is_empty() {
        return Err(ApiError::BadRequest("New password must not be empty".to_string()));
    }

    let user = users::find_by_guid(&state.db, &current.guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    if !verify_password(
        &request.current_password,
        &user.password_salt,
        &user.password_hash,
    ) {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    users::update_password(&state.db, &current.guid, &request.new_password).await?;

    // Rotate sessions so stolen cookies die with the old password
    sessions::delete_sessions_for_user(&state.db, &current.guid).await?;
    let ttl = get_setting_i64(&state.db, "session_timeout_seconds", 1_209_600).await?;
    let session = sessions::create_session(&state.db, &current.guid, ttl).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, session_cookie(&session.token, ttl))]),
        Json(json!({ "message": "Your password has been updated" })),
    ))
}

/// DELETE /api/account
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    // Profile and sessions cascade with the user row
    users::delete_user(&state.db, &current.guid).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "message": "Your account has been deleted" })),
    ))
}
