//! User account database operations

use sqlx::{Row, SqlitePool};
use tvr_common::auth::{generate_salt, hash_password};
use tvr_common::db::models::User;
use tvr_common::{uuid_utils, Result};

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        guid: row.get("guid"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        password_salt: row.get("password_salt"),
        is_admin: row.get::<i64, _>("is_admin") != 0,
    }
}

/// Create a user with a fresh salt/hash pair
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User> {
    let guid = uuid_utils::generate().to_string();
    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    sqlx::query(
        r#"
        INSERT INTO users (guid, username, email, password_hash, password_salt)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(username)
    .bind(email)
    .bind(&hash)
    .bind(&salt)
    .execute(pool)
    .await?;

    Ok(User {
        guid,
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash,
        password_salt: salt,
        is_admin: false,
    })
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(row_to_user))
}

pub async fn find_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE guid = ?")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(row_to_user))
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
        .bind(username)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = ?)")
        .bind(email)
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

pub async fn update_email(pool: &SqlitePool, guid: &str, new_email: &str) -> Result<()> {
    sqlx::query("UPDATE users SET email = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?")
        .bind(new_email)
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}

/// Replace the stored credential pair with a fresh salt and hash
pub async fn update_password(pool: &SqlitePool, guid: &str, new_password: &str) -> Result<()> {
    let salt = generate_salt();
    let hash = hash_password(new_password, &salt);

    sqlx::query(
        r#"
        UPDATE users SET password_hash = ?, password_salt = ?, updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&hash)
    .bind(&salt)
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete the account; profile and sessions cascade
pub async fn delete_user(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
