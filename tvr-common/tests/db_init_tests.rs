//! Tests for database initialization and schema migrations

use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use tvr_common::db::init::{get_setting_i64, init_database};
use tvr_common::db::migrations::run_migrations;

fn temp_db_path(tag: &str) -> PathBuf {
    PathBuf::from(format!("/tmp/tvr-test-{}-{}.db", tag, std::process::id()))
}

#[tokio::test]
async fn test_database_creation_when_missing() {
    let db_path = temp_db_path("create");
    let _ = std::fs::remove_file(&db_path);

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_database_opens_existing() {
    let db_path = temp_db_path("existing");
    let _ = std::fs::remove_file(&db_path);

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());

    // Open database second time (should succeed)
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());

    drop(pool1);
    drop(pool2);
    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let db_path = temp_db_path("settings");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    let timeout = get_setting_i64(&pool, "session_timeout_seconds", 0)
        .await
        .unwrap();
    assert_eq!(timeout, 1_209_600);

    let ttl = get_setting_i64(&pool, "verification_code_ttl_minutes", 0)
        .await
        .unwrap();
    assert_eq!(ttl, 30);

    let _ = std::fs::remove_file(&db_path);
}

#[tokio::test]
async fn test_all_tables_created() {
    let db_path = temp_db_path("tables");
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.unwrap();

    for table in [
        "users",
        "user_profiles",
        "sessions",
        "traffic_violations",
        "media_files",
        "settings",
        "schema_version",
    ] {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists, "Table {} was not created", table);
    }

    let _ = std::fs::remove_file(&db_path);
}

/// A database from a build that still used the combined location column gets
/// its coordinates split out and the column dropped.
#[tokio::test]
async fn test_migration_splits_legacy_location_column() {
    let db_path = temp_db_path("legacy-location");
    let _ = std::fs::remove_file(&db_path);

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await
        .unwrap();

    // Legacy schema: combined location string, no coordinate columns
    sqlx::query(
        r#"
        CREATE TABLE traffic_violations (
            guid TEXT PRIMARY KEY,
            username TEXT NOT NULL,
            license_plate TEXT NOT NULL,
            violation TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL,
            location TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            officer TEXT
        )
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO traffic_violations (guid, username, license_plate, violation, date, time, location)
         VALUES ('v1', 'amy', 'ABC-123', 'red light', '2023-12-01', '08:30', '25.0330,121.5654')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO traffic_violations (guid, username, license_plate, violation, date, time, location)
         VALUES ('v2', 'amy', 'XYZ-999', 'speeding', '2023-12-02', '09:00', 'not-a-location')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE schema_version (version INTEGER PRIMARY KEY, applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP)",
    )
    .execute(&pool)
    .await
    .unwrap();

    run_migrations(&pool).await.unwrap();

    // Parsed row carries the split coordinates
    let (lat, lng): (f64, f64) = sqlx::query_as(
        "SELECT latitude, longitude FROM traffic_violations WHERE guid = 'v1'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(lat, 25.0330);
    assert_eq!(lng, 121.5654);

    // Unparseable row falls back to 0.0/0.0 rather than failing the migration
    let (lat, lng): (f64, f64) = sqlx::query_as(
        "SELECT latitude, longitude FROM traffic_violations WHERE guid = 'v2'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(lat, 0.0);
    assert_eq!(lng, 0.0);

    // Combined column is gone
    let has_location: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('traffic_violations') WHERE name = 'location'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(has_location, 0);

    // Migrations are idempotent
    run_migrations(&pool).await.unwrap();

    let _ = std::fs::remove_file(&db_path);
}
