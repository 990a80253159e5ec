//! Geographic input handling.
//!
//! This module provides functionality for:
//! - Parsing user-entered `"lat,lon"` strings
//! - Optional latitude/longitude range validation

pub mod coordinates;

pub use coordinates::{Coordinate, CoordinateValidation, FormatError, parse_coordinates};
