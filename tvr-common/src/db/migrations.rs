//! Database schema migrations
//!
//! Versioned migrations allow seamless database upgrades without manual
//! deletion or data loss.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing migrations** - They must remain stable for users upgrading from older versions
//! 2. **Always add new migrations** - Create a new migration function for each schema change
//! 3. **Use ALTER TABLE** - Prefer ALTER TABLE over DROP/CREATE to preserve data

use crate::geo::parse_lat_lng;
use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

/// Current schema version
///
/// **IMPORTANT:** Increment this when adding new migrations
const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Set schema version in database
async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        warn!("This may indicate a downgrade. Proceeding with caution.");
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    // Run migrations sequentially
    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("✓ Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("✓ Migration v2 completed");
    }

    info!("All migrations completed successfully");
    Ok(())
}

/// Migration v1: Add user_input_type column to traffic_violations
///
/// **Background:** Early report forms did not record how the location was
/// captured (map pin vs. address lookup). This migration adds the column to
/// existing databases.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: Add user_input_type column to traffic_violations");

    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='traffic_violations'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        // Table doesn't exist yet - will be created with correct schema
        info!("  traffic_violations table doesn't exist yet - skipping migration");
        return Ok(());
    }

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('traffic_violations') WHERE name = 'user_input_type'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  user_input_type column already exists - skipping");
        return Ok(());
    }

    sqlx::query("ALTER TABLE traffic_violations ADD COLUMN user_input_type TEXT")
        .execute(pool)
        .await?;

    info!("  ✓ Added user_input_type column to traffic_violations table");
    Ok(())
}

/// Migration v2: Split combined location column into latitude/longitude/address
///
/// **Background:** Early schemas stored a single `location` TEXT column holding
/// a combined "lat,lng" string that every reader had to split. The schema now
/// stores separate REAL columns plus an optional street address. Rows whose
/// location string does not parse keep 0.0/0.0 and are logged.
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: Split location column into latitude/longitude/address");

    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='traffic_violations'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        info!("  traffic_violations table doesn't exist yet - skipping migration");
        return Ok(());
    }

    let has_location: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('traffic_violations') WHERE name = 'location'",
    )
    .fetch_one(pool)
    .await?;

    if has_location == 0 {
        info!("  location column already removed - skipping");
        return Ok(());
    }

    for (column, definition) in [
        ("latitude", "REAL NOT NULL DEFAULT 0.0"),
        ("longitude", "REAL NOT NULL DEFAULT 0.0"),
        ("address", "TEXT"),
    ] {
        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('traffic_violations') WHERE name = ?",
        )
        .bind(column)
        .fetch_one(pool)
        .await?;

        if has_column == 0 {
            let sql = format!(
                "ALTER TABLE traffic_violations ADD COLUMN {} {}",
                column, definition
            );
            sqlx::query(&sql).execute(pool).await?;
            info!("  ✓ Added {} column to traffic_violations table", column);
        }
    }

    // Backfill coordinates from the combined strings
    let rows = sqlx::query("SELECT guid, location FROM traffic_violations")
        .fetch_all(pool)
        .await?;

    let mut migrated = 0u64;
    for row in &rows {
        let guid: String = row.get("guid");
        let location: Option<String> = row.get("location");

        let Some(location) = location else { continue };

        match parse_lat_lng(&location) {
            Ok((lat, lng)) => {
                sqlx::query(
                    "UPDATE traffic_violations SET latitude = ?, longitude = ? WHERE guid = ?",
                )
                .bind(lat)
                .bind(lng)
                .bind(&guid)
                .execute(pool)
                .await?;
                migrated += 1;
            }
            Err(_) => {
                warn!(
                    "  Record {} has unparseable location '{}' - keeping 0.0/0.0",
                    guid, location
                );
            }
        }
    }

    sqlx::query("ALTER TABLE traffic_violations DROP COLUMN location")
        .execute(pool)
        .await?;

    info!(
        "  ✓ Migrated {} of {} location strings and dropped the location column",
        migrated,
        rows.len()
    );
    Ok(())
}
