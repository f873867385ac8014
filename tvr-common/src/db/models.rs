//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub is_admin: bool,
}

/// Per-user verification state, created 1:1 at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_guid: String,
    pub email_verified: bool,
    /// Cleared once verification succeeds
    pub verification_code: Option<String>,
    pub code_expires_at: Option<DateTime<Utc>>,
}

/// Login session backing the cookie
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_guid: String,
    pub expires_at: DateTime<Utc>,
}

/// Report lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationStatus {
    Pending,
    InProgress,
    Closed,
}

impl ViolationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationStatus::Pending => "pending",
            ViolationStatus::InProgress => "in_progress",
            ViolationStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ViolationStatus::Pending),
            "in_progress" => Some(ViolationStatus::InProgress),
            "closed" => Some(ViolationStatus::Closed),
            _ => None,
        }
    }
}

/// A submitted traffic violation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficViolation {
    pub guid: String,
    /// Reporter's username
    pub username: String,
    pub license_plate: String,
    /// Violation type, e.g. "red light" or "illegal parking"
    pub violation: String,
    /// Report date, YYYY-MM-DD
    pub date: String,
    /// Report time, HH:MM
    pub time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    /// How the location was captured (map pin, address lookup, ...)
    pub user_input_type: Option<String>,
    pub status: ViolationStatus,
    /// Assigned officer's username, if any
    pub officer: Option<String>,
}

/// Photo/video attachment, many-to-one with a violation record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub guid: String,
    pub violation_guid: String,
    pub file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            ViolationStatus::Pending,
            ViolationStatus::InProgress,
            ViolationStatus::Closed,
        ] {
            assert_eq!(ViolationStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert_eq!(ViolationStatus::parse("escalated"), None);
    }

    #[test]
    fn test_user_serialization_hides_credentials() {
        let user = User {
            guid: "g".into(),
            username: "amy".into(),
            email: "amy@example.com".into(),
            password_hash: "hash".into(),
            password_salt: "salt".into(),
            is_admin: false,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("amy"));
        assert!(!json.contains("hash"));
        assert!(!json.contains("salt"));
    }
}
