//! Free-text coordinate parsing.
//!
//! Accepts the `"lat,lon"` form typed by the user. Validation is syntax-only
//! by default; range checks are an opt-in mode.

use std::fmt;

use thiserror::Error;

use crate::constants::{MAXIMUM_LATITUDE, MAXIMUM_LONGITUDE, MINIMUM_LATITUDE, MINIMUM_LONGITUDE};

/// A parsed geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for Coordinate {
    /// Renders as `40.7128°N, 74.0060°W`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            if self.latitude >= 0.0 { "N" } else { "S" },
            self.longitude.abs(),
            if self.longitude >= 0.0 { "E" } else { "W" }
        )
    }
}

/// How strictly parsed coordinates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateValidation {
    /// Only malformed syntax is rejected.
    #[default]
    SyntaxOnly,
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    Ranged,
}

impl CoordinateValidation {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            CoordinateValidation::Ranged
        } else {
            CoordinateValidation::SyntaxOnly
        }
    }
}

/// Reasons a coordinate string was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("no coordinates entered")]
    Empty,
    #[error("expected a single comma between latitude and longitude, found {commas}")]
    CommaCount { commas: usize },
    #[error("'{value}' is not a valid number")]
    InvalidNumber { value: String },
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// Parse a `"lat,lon"` string into a [`Coordinate`].
///
/// Whitespace around either half is ignored. Anything Rust's `f64` parser
/// accepts is a valid half, including exponents.
///
/// # Examples
/// ```
/// use sunalert::geo::{Coordinate, CoordinateValidation, parse_coordinates};
/// let coord = parse_coordinates(" 40.7128 , -74.0060 ", CoordinateValidation::SyntaxOnly).unwrap();
/// assert_eq!(coord, Coordinate::new(40.7128, -74.0060));
/// assert!(parse_coordinates("40.7128", CoordinateValidation::SyntaxOnly).is_err());
/// ```
pub fn parse_coordinates(
    raw: &str,
    validation: CoordinateValidation,
) -> Result<Coordinate, FormatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormatError::Empty);
    }

    let commas = raw.matches(',').count();
    if commas != 1 {
        return Err(FormatError::CommaCount { commas });
    }

    // Exactly one comma was counted above.
    let (lat_text, lon_text) = raw.split_once(',').ok_or(FormatError::CommaCount { commas })?;
    let latitude = parse_half(lat_text)?;
    let longitude = parse_half(lon_text)?;

    if validation == CoordinateValidation::Ranged {
        if !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&latitude) {
            return Err(FormatError::LatitudeOutOfRange(latitude));
        }
        if !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&longitude) {
            return Err(FormatError::LongitudeOutOfRange(longitude));
        }
    }

    Ok(Coordinate::new(latitude, longitude))
}

fn parse_half(text: &str) -> Result<f64, FormatError> {
    let text = text.trim();
    text.parse::<f64>()
        .map_err(|_| FormatError::InvalidNumber {
            value: text.to_string(),
        })
}
