use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::{normalize_number, parse_finite};

/// Which half of a coordinate pair failed the range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// User-facing coordinate errors. Checks run in declaration order and stop at
/// the first failure.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Latitude and longitude are required")]
    MissingCoordinate,
    #[error("Latitude and longitude must be valid numbers")]
    NotANumber,
    #[error("{} must be between {} and {} degrees", capitalized(.axis), -axis_limit(.axis), axis_limit(.axis))]
    OutOfRange { axis: Axis, value: f64 },
}

fn axis_limit(axis: &Axis) -> f64 {
    match axis {
        Axis::Latitude => 90.0,
        Axis::Longitude => 180.0,
    }
}

fn capitalized(axis: &Axis) -> &'static str {
    match axis {
        Axis::Latitude => "Latitude",
        Axis::Longitude => "Longitude",
    }
}

/// A validated, in-range coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Validate free-form latitude/longitude input.
///
/// Presence is checked first, then parseability, then range.
pub fn validate_coordinates(lat_raw: &str, lon_raw: &str) -> Result<Coordinates, ValidationError> {
    let lat_raw = lat_raw.trim();
    let lon_raw = lon_raw.trim();

    if lat_raw.is_empty() || lon_raw.is_empty() {
        return Err(ValidationError::MissingCoordinate);
    }

    let latitude = parse_finite(&normalize_number(Some(lat_raw)));
    let longitude = parse_finite(&normalize_number(Some(lon_raw)));

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ValidationError::NotANumber);
    };

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::OutOfRange { axis: Axis::Latitude, value: latitude });
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::OutOfRange { axis: Axis::Longitude, value: longitude });
    }

    Ok(Coordinates { latitude, longitude })
}
