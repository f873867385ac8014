//! Session cookie middleware
//!
//! Protected routes run behind [`session_middleware`], which resolves the
//! session cookie to a [`CurrentUser`] request extension. Handlers on public
//! routes can still peek at the session with [`resolve_session`].

use axum::{
    extract::{Request, State},
    http::header::{HeaderMap, COOKIE},
    middleware::Next,
    response::Response,
};
use tvr_common::db::models::User;

use crate::db::{sessions, users};
use crate::error::ApiError;
use crate::AppState;

/// Name of the login session cookie
pub const SESSION_COOKIE: &str = "tvr_session";

/// Authenticated user attached to the request by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub guid: String,
    pub username: String,
    pub is_admin: bool,
    /// Token backing this request, needed for logout
    pub session_token: String,
}

/// Extract the session token from the Cookie header, if any
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Build the Set-Cookie value for a fresh session
pub fn session_cookie(token: &str, max_age_seconds: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_seconds
    )
}

/// Build the Set-Cookie value that clears the session
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Resolve the request's session cookie to its user, if the session is valid
pub async fn resolve_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<(String, User)>, ApiError> {
    let Some(token) = session_token_from_headers(headers) else {
        return Ok(None);
    };

    let Some(session) = sessions::find_valid(&state.db, &token).await? else {
        return Ok(None);
    };

    let Some(user) = users::find_by_guid(&state.db, &session.user_guid).await? else {
        // Session for a deleted user; drop it
        sessions::delete_session(&state.db, &token).await?;
        return Ok(None);
    };

    Ok(Some((token, user)))
}

/// Session middleware for protected routes
///
/// Returns 401 Unauthorized when the cookie is missing, unknown, or expired.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some((token, user)) = resolve_session(&state, request.headers()).await? else {
        return Err(ApiError::Unauthorized("Login required".to_string()));
    };

    request.extensions_mut().insert(CurrentUser {
        guid: user.guid,
        username: user.username,
        is_admin: user.is_admin,
        session_token: token,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_parsed_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; tvr_session=abc123; lang=en"),
        );

        assert_eq!(session_token_from_headers(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn test_missing_cookie_header() {
        let headers = HeaderMap::new();
        assert_eq!(session_token_from_headers(&headers), None);
    }

    #[test]
    fn test_other_cookies_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(session_token_from_headers(&headers), None);
    }

    #[test]
    fn test_cookie_strings() {
        let cookie = session_cookie("tok", 60);
        assert!(cookie.starts_with("tvr_session=tok;"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
