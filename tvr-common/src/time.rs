//! Timestamp utilities

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Expiry timestamp a number of minutes from now
pub fn minutes_from_now(minutes: i64) -> DateTime<Utc> {
    Utc::now() + Duration::minutes(minutes)
}

/// True when the given deadline lies in the past
pub fn is_expired(deadline: DateTime<Utc>) -> bool {
    deadline < Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_minutes_from_now_is_in_future() {
        let deadline = minutes_from_now(30);
        assert!(deadline > now());
        // Within a second of exactly 30 minutes out
        let delta = deadline - now();
        assert!(delta.num_seconds() > 29 * 60);
        assert!(delta.num_seconds() <= 30 * 60);
    }

    #[test]
    fn test_is_expired_past_deadline() {
        let past = now() - Duration::minutes(1);
        assert!(is_expired(past));
    }

    #[test]
    fn test_is_expired_future_deadline() {
        let future = minutes_from_now(1);
        assert!(!is_expired(future));
    }
}
