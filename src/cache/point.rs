//! Geo Point Module
//!
//! Defines the coordinate key type and the truncation that turns nearby
//! points into the same cache key.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Precision ==
/// Number of decimal digits kept when normalizing a coordinate.
///
/// Each variant is named after the size of the cell it produces at the
/// equator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Precision {
    /// 1 digit, e.g. 41.3, 29.6
    Within11Km = 1,
    /// 2 digits, e.g. 41.36, 29.63
    Within1Km = 2,
    /// 3 digits, e.g. 41.367, 29.631
    #[default]
    Within110M = 3,
    /// 4 digits, e.g. 41.3674, 29.6316
    Within11M = 4,
    /// 5 digits, e.g. 41.36742, 29.63168
    Within1M = 5,
    /// 6 digits, e.g. 41.367421, 29.631689
    Within11Cm = 6,
    /// 7 digits, e.g. 41.3674211, 29.6316893
    Within11Mm = 7,
    /// 8 digits, e.g. 41.36742115, 29.63168932
    Within1Mm = 8,
}

impl Precision {
    /// Returns the number of fractional digits retained.
    pub fn digits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Precision {
    type Error = CacheError;

    fn try_from(digits: u8) -> Result<Self, Self::Error> {
        match digits {
            1 => Ok(Precision::Within11Km),
            2 => Ok(Precision::Within1Km),
            3 => Ok(Precision::Within110M),
            4 => Ok(Precision::Within11M),
            5 => Ok(Precision::Within1M),
            6 => Ok(Precision::Within11Cm),
            7 => Ok(Precision::Within11Mm),
            8 => Ok(Precision::Within1Mm),
            other => Err(CacheError::InvalidConfiguration(format!(
                "precision must be within 1-8, got {}",
                other
            ))),
        }
    }
}

// == Geo Point ==
/// A latitude/longitude pair, used both as raw input and as cache key.
///
/// Equality and hashing compare the bit patterns of both coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    // == Normalize ==
    /// Truncates both coordinates toward zero to `precision` decimal digits.
    ///
    /// Truncation works on the shortest decimal representation of each
    /// value, so two floats that print the same up to `precision` digits
    /// always land on the same key. Non-finite coordinates are returned
    /// unchanged.
    pub fn normalize(self, precision: Precision) -> Self {
        Self {
            latitude: truncate_coordinate(self.latitude, precision.digits()),
            longitude: truncate_coordinate(self.longitude, precision.digits()),
        }
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for GeoPoint {}

impl Hash for GeoPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Free-function form of [`GeoPoint::normalize`].
pub fn normalize(point: GeoPoint, precision: Precision) -> GeoPoint {
    point.normalize(precision)
}

// == Truncation ==
fn truncate_coordinate(value: f64, digits: u8) -> f64 {
    if !value.is_finite() {
        return value;
    }

    // `Display` for f64 yields the shortest round-trip form, never exponent notation.
    let repr = value.to_string();
    let keep = usize::from(digits);

    let truncated = match repr.find('.') {
        Some(dot) if repr.len() - dot - 1 > keep => &repr[..dot + 1 + keep],
        _ => return value + 0.0,
    };

    // Adding +0.0 folds a truncated "-0.0" into 0.0.
    truncated.parse::<f64>().map(|v| v + 0.0).unwrap_or(value)
}
