//! # sunalert
//!
//! Looks up sunrise and sunset for a coordinate, shows them in local time and
//! raises a reminder five minutes before each event.
//!
//! ## Architecture
//!
//! - **alerts**: One-shot reminder planning and timer tasks
//! - **args**: Command-line parsing
//! - **config**: Optional TOML configuration, defaults and validation
//! - **constants**: Application-wide constants and defaults
//! - **display**: Status and alert text owned by the event loop
//! - **geo**: `"lat,lon"` parsing and validation
//! - **local_time**: Clock abstraction and UTC to local conversion
//! - **logger**: Structured logging with visual formatting
//! - **sun_times**: HTTP client for the sunrise/sunset service
//! - **surface**: Terminal front end
//! - **tracker**: Fetch cycles and the event loop

pub mod alerts;
pub mod args;
pub mod config;
pub mod constants;
pub mod display;
pub mod geo;
pub mod local_time;
pub mod logger;
pub mod sun_times;
pub mod surface;
pub mod tracker;

// Re-export important types for easier access
pub use alerts::{AlertFired, AlertScheduler, AlertState, ScheduledAlert, SunEvent};
pub use config::Config;
pub use display::DisplayState;
pub use geo::{Coordinate, CoordinateValidation, FormatError, parse_coordinates};
pub use local_time::{Clock, FixedClock, LocalSunTimes, SystemClock};
pub use logger::{Log, LogLevel};
pub use sun_times::{SunTimes, SunTimesClient, SunTimesError, SunTimesSource};
pub use tracker::{FetchError, FetchOutcome, SunTracker};
