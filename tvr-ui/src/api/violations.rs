//! Public violation query endpoints: search, map markers, and record detail

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tvr_common::db::models::TrafficViolation;
use uuid::Uuid;

use crate::db::{media, violations};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

/// GET /api/violations/search?keyword=&from_date=&to_date=
///
/// Keyword matches license plate, violation type, and address. The date range
/// applies only when both endpoints are given.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<TrafficViolation>>> {
    let results = violations::search_violations(
        &state.db,
        query.keyword.trim(),
        query.from_date.as_deref(),
        query.to_date.as_deref(),
    )
    .await?;

    Ok(Json(results))
}

/// Map marker for one violation record
#[derive(Debug, Serialize)]
pub struct Marker {
    pub traffic_violation_id: String,
    pub lat: f64,
    pub lng: f64,
}

/// GET /api/violations/markers
pub async fn markers(State(state): State<AppState>) -> ApiResult<Json<Vec<Marker>>> {
    let rows = violations::marker_rows(&state.db).await?;

    Ok(Json(
        rows.into_iter()
            .map(|(guid, lat, lng)| Marker {
                traffic_violation_id: guid,
                lat,
                lng,
            })
            .collect(),
    ))
}

/// Detail payload for one violation record
#[derive(Debug, Serialize)]
pub struct ViolationDetail {
    pub lat: f64,
    pub lng: f64,
    /// "PLATE - VIOLATION" display title
    pub title: String,
    pub media: Vec<String>,
    pub license_plate: String,
    pub date: String,
    pub time: String,
    pub violation: String,
    pub status: String,
    pub officer: Option<String>,
}

/// GET /api/violations/:id
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ViolationDetail>> {
    // Record ids are UUIDs; reject malformed ones up front
    Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid violation id: {}", id)))?;

    let violation = violations::find_by_guid(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Traffic violation not found".to_string()))?;

    let media = media::media_file_names(&state.db, &id).await?;

    Ok(Json(ViolationDetail {
        lat: violation.latitude,
        lng: violation.longitude,
        title: format!("{} - {}", violation.license_plate, violation.violation),
        media,
        license_plate: violation.license_plate,
        date: violation.date,
        time: violation.time,
        violation: violation.violation,
        status: violation.status.as_str().to_string(),
        officer: violation.officer,
    }))
}
