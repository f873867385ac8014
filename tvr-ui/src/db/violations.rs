//! Traffic violation database operations

use sqlx::{Row, SqlitePool};
use tvr_common::db::models::{TrafficViolation, ViolationStatus};
use tvr_common::Result;

fn row_to_violation(row: &sqlx::sqlite::SqliteRow) -> Result<TrafficViolation> {
    let status: String = row.get("status");
    let status = ViolationStatus::parse(&status)
        .ok_or_else(|| tvr_common::Error::Internal(format!("Unknown status '{}'", status)))?;

    Ok(TrafficViolation {
        guid: row.get("guid"),
        username: row.get("username"),
        license_plate: row.get("license_plate"),
        violation: row.get("violation"),
        date: row.get("date"),
        time: row.get("time"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
        address: row.get("address"),
        user_input_type: row.get("user_input_type"),
        status,
        officer: row.get("officer"),
    })
}

/// Persist a violation record together with its media file rows
pub async fn insert_violation(
    pool: &SqlitePool,
    violation: &TrafficViolation,
    media_files: &[String],
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO traffic_violations (
            guid, username, license_plate, violation, date, time,
            latitude, longitude, address, user_input_type, status, officer
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&violation.guid)
    .bind(&violation.username)
    .bind(&violation.license_plate)
    .bind(&violation.violation)
    .bind(&violation.date)
    .bind(&violation.time)
    .bind(violation.latitude)
    .bind(violation.longitude)
    .bind(&violation.address)
    .bind(&violation.user_input_type)
    .bind(violation.status.as_str())
    .bind(&violation.officer)
    .execute(pool)
    .await?;

    for file_name in media_files {
        crate::db::media::add_media(pool, &violation.guid, file_name).await?;
    }

    Ok(())
}

/// Retrieve all records submitted by one user
pub async fn violations_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Vec<TrafficViolation>> {
    let rows = sqlx::query(
        "SELECT * FROM traffic_violations WHERE username = ? ORDER BY date DESC, time DESC",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_violation).collect()
}

pub async fn find_by_guid(pool: &SqlitePool, guid: &str) -> Result<Option<TrafficViolation>> {
    let row = sqlx::query("SELECT * FROM traffic_violations WHERE guid = ?")
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_violation).transpose()
}

/// Partial update of a violation record; absent fields keep their value
#[derive(Debug, Default, Clone)]
pub struct ViolationUpdate {
    pub license_plate: Option<String>,
    pub violation: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub user_input_type: Option<String>,
    pub status: Option<ViolationStatus>,
    pub officer: Option<String>,
}

pub async fn update_violation(
    pool: &SqlitePool,
    guid: &str,
    update: &ViolationUpdate,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE traffic_violations SET
            license_plate = COALESCE(?, license_plate),
            violation = COALESCE(?, violation),
            date = COALESCE(?, date),
            time = COALESCE(?, time),
            latitude = COALESCE(?, latitude),
            longitude = COALESCE(?, longitude),
            address = COALESCE(?, address),
            user_input_type = COALESCE(?, user_input_type),
            status = COALESCE(?, status),
            officer = COALESCE(?, officer),
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&update.license_plate)
    .bind(&update.violation)
    .bind(&update.date)
    .bind(&update.time)
    .bind(update.latitude)
    .bind(update.longitude)
    .bind(&update.address)
    .bind(&update.user_input_type)
    .bind(update.status.map(|s| s.as_str()))
    .bind(&update.officer)
    .bind(guid)
    .execute(pool)
    .await?;

    Ok(())
}

/// Keyword and date-range search across violation records
///
/// The keyword matches license plate, violation type, and address. The date
/// range is applied only when both endpoints are present (inclusive).
pub async fn search_violations(
    pool: &SqlitePool,
    keyword: &str,
    from_date: Option<&str>,
    to_date: Option<&str>,
) -> Result<Vec<TrafficViolation>> {
    let mut sql = String::from("SELECT * FROM traffic_violations WHERE 1=1");

    if !keyword.is_empty() {
        sql.push_str(
            " AND (license_plate LIKE ? OR violation LIKE ? OR COALESCE(address, '') LIKE ?)",
        );
    }

    let date_range = match (from_date, to_date) {
        (Some(from), Some(to)) => {
            sql.push_str(" AND date BETWEEN ? AND ?");
            Some((from, to))
        }
        _ => None,
    };

    sql.push_str(" ORDER BY date DESC, time DESC");

    let mut query = sqlx::query(&sql);
    if !keyword.is_empty() {
        let pattern = format!("%{}%", keyword);
        query = query.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    if let Some((from, to)) = date_range {
        query = query.bind(from).bind(to);
    }

    let rows = query.fetch_all(pool).await?;
    rows.iter().map(row_to_violation).collect()
}

/// Map marker row: record guid plus coordinates
pub async fn marker_rows(pool: &SqlitePool) -> Result<Vec<(String, f64, f64)>> {
    let rows = sqlx::query("SELECT guid, latitude, longitude FROM traffic_violations")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("guid"), row.get("latitude"), row.get("longitude")))
        .collect())
}
