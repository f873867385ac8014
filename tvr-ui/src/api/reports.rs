//! Report submission and editing endpoints
//!
//! Submission accepts either split latitude/longitude fields or the legacy
//! combined "lat,lng" location string. Edits may change record fields and
//! add/remove media attachments in one call; status and officer assignment
//! are reserved for admins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use tvr_common::db::models::{MediaFile, TrafficViolation, ViolationStatus};
use tvr_common::{geo, uuid_utils};

use crate::api::session::CurrentUser;
use crate::db::violations::ViolationUpdate;
use crate::db::{media, profiles, violations};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitReportRequest {
    pub license_plate: String,
    pub violation: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Legacy combined "lat,lng" string
    pub location: Option<String>,
    pub address: Option<String>,
    pub user_input_type: Option<String>,
    #[serde(default)]
    pub media: Vec<String>,
}

/// POST /api/reports
pub async fn submit_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<SubmitReportRequest>,
) -> ApiResult<impl IntoResponse> {
    // Unverified accounts may browse but not report
    let verified = profiles::find_by_user(&state.db, &current.guid)
        .await?
        .map(|p| p.email_verified)
        .unwrap_or(false);
    if !verified {
        return Err(ApiError::Forbidden(
            "Verify your email address before submitting reports".to_string(),
        ));
    }

    if request.license_plate.trim().is_empty() || request.violation.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "License plate and violation type are required".to_string(),
        ));
    }

    let (latitude, longitude) = match (request.latitude, request.longitude) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => {
            let location = request.location.as_deref().ok_or_else(|| {
                ApiError::BadRequest("Either latitude/longitude or location is required".to_string())
            })?;
            geo::parse_lat_lng(location)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?
        }
    };

    let violation = TrafficViolation {
        guid: uuid_utils::generate().to_string(),
        username: current.username,
        license_plate: request.license_plate.trim().to_string(),
        violation: request.violation.trim().to_string(),
        date: request.date,
        time: request.time,
        latitude,
        longitude,
        address: request.address,
        user_input_type: request.user_input_type,
        status: ViolationStatus::Pending,
        officer: None,
    };

    violations::insert_violation(&state.db, &violation, &request.media).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Report submitted",
            "traffic_violation_id": violation.guid,
        })),
    ))
}

/// GET /api/reports/mine
pub async fn my_reports(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<TrafficViolation>>> {
    let records = violations::violations_by_username(&state.db, &current.username).await?;
    Ok(Json(records))
}

/// GET /api/reports/:id/media
pub async fn report_media(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<MediaFile>>> {
    let violation = violations::find_by_guid(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Traffic violation not found".to_string()))?;

    if violation.username != current.username && !current.is_admin {
        return Err(ApiError::Forbidden(
            "Only the reporter or an admin may view these attachments".to_string(),
        ));
    }

    Ok(Json(media::media_for_violation(&state.db, &id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateReportRequest {
    pub license_plate: Option<String>,
    pub violation: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub user_input_type: Option<String>,
    pub status: Option<String>,
    pub officer: Option<String>,
    #[serde(default)]
    pub new_media: Vec<String>,
    #[serde(default)]
    pub removed_media: Vec<String>,
}

/// PUT /api/reports/:id
pub async fn update_report(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateReportRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let violation = violations::find_by_guid(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Traffic violation not found".to_string()))?;

    if violation.username != current.username && !current.is_admin {
        return Err(ApiError::Forbidden(
            "Only the reporter or an admin may edit this record".to_string(),
        ));
    }

    if (request.status.is_some() || request.officer.is_some()) && !current.is_admin {
        return Err(ApiError::Forbidden(
            "Only an admin may change status or officer assignment".to_string(),
        ));
    }

    let status = request
        .status
        .as_deref()
        .map(|s| {
            ViolationStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status '{}'", s)))
        })
        .transpose()?;

    let update = ViolationUpdate {
        license_plate: request.license_plate,
        violation: request.violation,
        date: request.date,
        time: request.time,
        latitude: request.latitude,
        longitude: request.longitude,
        address: request.address,
        user_input_type: request.user_input_type,
        status,
        officer: request.officer,
    };

    violations::update_violation(&state.db, &id, &update).await?;
    media::sync_media_files(&state.db, &id, &request.new_media, &request.removed_media).await?;

    Ok(Json(json!({ "message": "Report updated" })))
}
