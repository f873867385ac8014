//! Registration, login, and email verification endpoints
//!
//! Registration creates the user plus a profile row holding a random
//! verification code with a 30-minute expiry, emails the code, and opens a
//! session right away. Full account features stay gated until the code is
//! confirmed.

use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tvr_common::auth::{generate_verification_code, VERIFICATION_CODE_TTL_MINUTES};
use tvr_common::db::init::get_setting_i64;
use tvr_common::time;

use crate::api::session::{clear_session_cookie, resolve_session, session_cookie, CurrentUser};
use crate::db::{profiles, sessions, users};
use crate::error::{ApiError, ApiResult};
use crate::mailer::send_verification_email;
use crate::AppState;

const USERNAME_TAKEN: &str = "This username is already taken";
const EMAIL_TAKEN: &str = "This email address is already in use";

async fn session_ttl(state: &AppState) -> ApiResult<i64> {
    Ok(get_setting_i64(&state.db, "session_timeout_seconds", 1_209_600).await?)
}

async fn code_ttl_minutes(state: &AppState) -> ApiResult<i64> {
    Ok(get_setting_i64(
        &state.db,
        "verification_code_ttl_minutes",
        VERIFICATION_CODE_TTL_MINUTES,
    )
    .await?)
}

// ========================================
// Registration
// ========================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
///
/// Creates the account, issues the verification code, emails it, and logs the
/// new user in. The response points the client at the verification step.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let username = request.username.trim();
    let email = request.email.trim();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username, email and password are required".to_string(),
        ));
    }

    if users::username_exists(&state.db, username).await? {
        return Err(ApiError::Conflict(USERNAME_TAKEN.to_string()));
    }
    if users::email_exists(&state.db, email).await? {
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let user = users::create_user(&state.db, username, email, &request.password).await?;

    // Profile carries the verification state
    let code = generate_verification_code();
    let expires_at = time::minutes_from_now(code_ttl_minutes(&state).await?);
    profiles::create_profile(&state.db, &user.guid, &code, expires_at).await?;

    send_verification_email(state.mailer.as_ref(), email, &code)
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to send verification email: {}", e)))?;

    // Log the new user in immediately; verification happens next
    let ttl = session_ttl(&state).await?;
    let session = sessions::create_session(&state.db, &user.guid, ttl).await?;

    Ok((
        StatusCode::CREATED,
        AppendHeaders([(SET_COOKIE, session_cookie(&session.token, ttl))]),
        Json(json!({
            "message": "Registration successful. Check your email for a verification code.",
            "username": user.username,
            "verification_required": true,
        })),
    ))
}

// ========================================
// Username/Email Existence Probe
// ========================================

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub username_error: Option<String>,
    pub email_error: Option<String>,
}

/// GET /api/auth/check?username=&email=
///
/// AJAX probe used by the registration form to flag taken names before
/// submission.
pub async fn check_username_email(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Json<CheckResponse>> {
    let username_error = match query.username.as_deref() {
        Some(username) if !username.is_empty() => users::username_exists(&state.db, username)
            .await?
            .then(|| USERNAME_TAKEN.to_string()),
        _ => None,
    };

    let email_error = match query.email.as_deref() {
        Some(email) if !email.is_empty() => users::email_exists(&state.db, email)
            .await?
            .then(|| EMAIL_TAKEN.to_string()),
        _ => None,
    };

    Ok(Json(CheckResponse {
        username_error,
        email_error,
    }))
}

// ========================================
// Login / Logout
// ========================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/auth/login
///
/// Already-authenticated callers get a short-circuit response instead of a
/// second session.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<axum::response::Response> {
    if let Some((_, user)) = resolve_session(&state, &headers).await? {
        return Ok(Json(json!({
            "message": "Already logged in",
            "username": user.username,
        }))
        .into_response());
    }

    let user = users::find_by_username(&state.db, request.username.trim())
        .await?
        .filter(|user| {
            tvr_common::auth::verify_password(
                &request.password,
                &user.password_salt,
                &user.password_hash,
            )
        })
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let ttl = session_ttl(&state).await?;
    let session = sessions::create_session(&state.db, &user.guid, ttl).await?;

    let email_verified = profiles::find_by_user(&state.db, &user.guid)
        .await?
        .map(|p| p.email_verified)
        .unwrap_or(false);

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, session_cookie(&session.token, ttl))]),
        Json(json!({
            "message": "Logged in",
            "username": user.username,
            "email_verified": email_verified,
        })),
    )
        .into_response())
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    sessions::delete_session(&state.db, &current.session_token).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "message": "Logged out" })),
    ))
}

// ========================================
// Email Verification
// ========================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: Option<String>,
}

/// POST /api/auth/verify
///
/// Exact-code lookup, expiry check, then a single mutation that flips the
/// verified flag and clears the code. Success logs the user in.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    let code = request.code.unwrap_or_default();
    if code.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter the verification code".to_string(),
        ));
    }

    let profile = profiles::find_by_code(&state.db, code.trim())
        .await?
        .ok_or_else(|| ApiError::BadRequest("Incorrect verification code".to_string()))?;

    if let Some(expiry) = profile.code_expires_at {
        if tvr_common::time::is_expired(expiry) {
            return Err(ApiError::BadRequest(
                "Verification code has expired".to_string(),
            ));
        }
    }

    profiles::mark_verified(&state.db, &profile.user_guid).await?;

    // The emailed code proves account ownership, so log the user in
    let ttl = session_ttl(&state).await?;
    let session = sessions::create_session(&state.db, &profile.user_guid, ttl).await?;

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, session_cookie(&session.token, ttl))]),
        Json(json!({ "message": "Your account has been verified" })),
    ))
}

/// POST /api/auth/resend
///
/// Issues a fresh code for users whose previous code expired.
pub async fn resend_verification(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<serde_json::Value>> {
    let profile = profiles::find_by_user(&state.db, &current.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("Profile missing for user".to_string()))?;

    if profile.email_verified {
        return Err(ApiError::BadRequest("Account is already verified".to_string()));
    }

    let user = users::find_by_guid(&state.db, &current.guid)
        .await?
        .ok_or_else(|| ApiError::Internal("User row missing".to_string()))?;

    let code = generate_verification_code();
    let expires_at = time::minutes_from_now(code_ttl_minutes(&state).await?);
    profiles::reset_verification_code(&state.db, &current.guid, &code, expires_at).await?;

    send_verification_email(state.mailer.as_ref(), &user.email, &code)
        .await
        .map_err(|e| ApiError::Upstream(format!("Failed to send verification email: {}", e)))?;

    Ok(Json(json!({
        "message": "A new verification code has been emailed"
    })))
}
