//! User profile database operations
//!
//! The profile row carries the email-verification state: a short-lived random
//! code that is cleared the moment verification succeeds.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tvr_common::db::models::UserProfile;
use tvr_common::Result;

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile> {
    let code_expires_at: Option<String> = row.get("code_expires_at");
    let code_expires_at = code_expires_at
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    tvr_common::Error::Internal(format!("Failed to parse code_expires_at: {}", e))
                })
        })
        .transpose()?;

    Ok(UserProfile {
        user_guid: row.get("user_guid"),
        email_verified: row.get::<i64, _>("email_verified") != 0,
        verification_code: row.get("verification_code"),
        code_expires_at,
    })
}

/// Create the profile row for a newly registered user
pub async fn create_profile(
    pool: &SqlitePool,
    user_guid: &str,
    verification_code: &str,
    code_expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (user_guid, email_verified, verification_code, code_expires_at)
        VALUES (?, 0, ?, ?)
        "#,
    )
    .bind(user_guid)
    .bind(verification_code)
    .bind(code_expires_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Exact-code lookup used by the verification endpoint
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> Result<Option<UserProfile>> {
    let row = sqlx::query("SELECT * FROM user_profiles WHERE verification_code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_profile).transpose()
}

pub async fn find_by_user(pool: &SqlitePool, user_guid: &str) -> Result<Option<UserProfile>> {
    let row = sqlx::query("SELECT * FROM user_profiles WHERE user_guid = ?")
        .bind(user_guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_profile).transpose()
}

/// Flip the verified flag and clear the code in one step
pub async fn mark_verified(pool: &SqlitePool, user_guid: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET email_verified = 1, verification_code = NULL, code_expires_at = NULL
        WHERE user_guid = ?
        "#,
    )
    .bind(user_guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Issue a fresh verification code, e.g. after an email change
pub async fn reset_verification_code(
    pool: &SqlitePool,
    user_guid: &str,
    verification_code: &str,
    code_expires_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE user_profiles
        SET email_verified = 0, verification_code = ?, code_expires_at = ?
        WHERE user_guid = ?
        "#,
    )
    .bind(verification_code)
    .bind(code_expires_at.to_rfc3339())
    .bind(user_guid)
    .execute(pool)
    .await?;

    Ok(())
}
