//! Media attachment database operations

use sqlx::{Row, SqlitePool};
use tvr_common::db::models::MediaFile;
use tvr_common::{uuid_utils, Result};

/// Retrieve media rows for one violation record
pub async fn media_for_violation(pool: &SqlitePool, violation_guid: &str) -> Result<Vec<MediaFile>> {
    let rows = sqlx::query(
        "SELECT guid, violation_guid, file FROM media_files WHERE violation_guid = ? ORDER BY created_at",
    )
    .bind(violation_guid)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| MediaFile {
            guid: row.get("guid"),
            violation_guid: row.get("violation_guid"),
            file: row.get("file"),
        })
        .collect())
}

/// File names only, for the detail endpoint
pub async fn media_file_names(pool: &SqlitePool, violation_guid: &str) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT file FROM media_files WHERE violation_guid = ? ORDER BY created_at",
    )
    .bind(violation_guid)
    .fetch_all(pool)
    .await?;

    Ok(names)
}

pub async fn add_media(pool: &SqlitePool, violation_guid: &str, file: &str) -> Result<()> {
    sqlx::query("INSERT INTO media_files (guid, violation_guid, file) VALUES (?, ?, ?)")
        .bind(uuid_utils::generate().to_string())
        .bind(violation_guid)
        .bind(file)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn remove_media(pool: &SqlitePool, violation_guid: &str, file: &str) -> Result<()> {
    sqlx::query("DELETE FROM media_files WHERE violation_guid = ? AND file = ?")
        .bind(violation_guid)
        .bind(file)
        .execute(pool)
        .await?;

    Ok(())
}

/// Apply an attachment edit: remove the dropped files, add the new ones
pub async fn sync_media_files(
    pool: &SqlitePool,
    violation_guid: &str,
    new_files: &[String],
    removed_files: &[String],
) -> Result<()> {
    for file in removed_files {
        remove_media(pool, violation_guid, file).await?;
    }

    for file in new_files {
        add_media(pool, violation_guid, file).await?;
    }

    Ok(())
}
