//! Login session database operations

use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};
use tvr_common::auth::generate_session_token;
use tvr_common::db::models::Session;
use tvr_common::Result;

/// Open a session for the user and return it
pub async fn create_session(
    pool: &SqlitePool,
    user_guid: &str,
    ttl_seconds: i64,
) -> Result<Session> {
    let token = generate_session_token();
    let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

    sqlx::query("INSERT INTO sessions (token, user_guid, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_guid)
        .bind(expires_at.to_rfc3339())
        .execute(pool)
        .await?;

    Ok(Session {
        token,
        user_guid: user_guid.to_string(),
        expires_at,
    })
}

/// Look up a session by token, rejecting expired ones
pub async fn find_valid(pool: &SqlitePool, token: &str) -> Result<Option<Session>> {
    let row = sqlx::query("SELECT token, user_guid, expires_at FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: String = row.get("expires_at");
    let expires_at = DateTime::parse_from_rfc3339(&expires_at)
        .map_err(|e| tvr_common::Error::Internal(format!("Failed to parse expires_at: {}", e)))?
        .with_timezone(&Utc);

    if expires_at < Utc::now() {
        // Expired sessions are dropped on sight
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(pool)
            .await?;
        return Ok(None);
    }

    Ok(Some(Session {
        token: row.get("token"),
        user_guid: row.get("user_guid"),
        expires_at,
    }))
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Drop every session the user holds (password change, account deletion)
pub async fn delete_sessions_for_user(pool: &SqlitePool, user_guid: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE user_guid = ?")
        .bind(user_guid)
        .execute(pool)
        .await?;

    Ok(())
}
