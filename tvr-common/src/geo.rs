//! Coordinate helpers
//!
//! Early report forms submitted a single combined "lat,lng" string. The
//! database now stores separate latitude/longitude columns, but combined
//! strings still arrive from legacy clients and from the location migration.

use crate::{Error, Result};

/// Parse a combined "lat,lng" string into (latitude, longitude)
///
/// # Examples
///
/// ```
/// use tvr_common::geo::parse_lat_lng;
///
/// let (lat, lng) = parse_lat_lng("25.0330,121.5654").unwrap();
/// assert_eq!(lat, 25.0330);
/// assert_eq!(lng, 121.5654);
/// ```
pub fn parse_lat_lng(location: &str) -> Result<(f64, f64)> {
    let mut parts = location.splitn(2, ',');

    let lat = parts
        .next()
        .ok_or_else(|| Error::InvalidInput(format!("Missing latitude in '{}'", location)))?
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidInput(format!("Invalid latitude in '{}'", location)))?;

    let lng = parts
        .next()
        .ok_or_else(|| Error::InvalidInput(format!("Missing longitude in '{}'", location)))?
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidInput(format!("Invalid longitude in '{}'", location)))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::InvalidInput(format!("Latitude out of range: {}", lat)));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(Error::InvalidInput(format!("Longitude out of range: {}", lng)));
    }

    Ok((lat, lng))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_pair() {
        let (lat, lng) = parse_lat_lng("25.0330,121.5654").unwrap();
        assert_eq!(lat, 25.0330);
        assert_eq!(lng, 121.5654);
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let (lat, lng) = parse_lat_lng(" 24.15 , 120.67 ").unwrap();
        assert_eq!(lat, 24.15);
        assert_eq!(lng, 120.67);
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let (lat, lng) = parse_lat_lng("-33.8688,-151.2093").unwrap();
        assert_eq!(lat, -33.8688);
        assert_eq!(lng, -151.2093);
    }

    #[test]
    fn test_parse_rejects_missing_longitude() {
        assert!(parse_lat_lng("25.0330").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_lat_lng("north,south").is_err());
        assert!(parse_lat_lng("").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(parse_lat_lng("91.0,0.0").is_err());
        assert!(parse_lat_lng("0.0,181.0").is_err());
    }
}
