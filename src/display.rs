//! The two on-screen text regions: the status line and the alert banner.
//!
//! [`DisplayState`] is owned by the event loop. Fetch completion and alert
//! firing both write to it, and only through [`DisplayState::set_status`] and
//! [`DisplayState::set_alert`]. Each setter marks its region dirty so the
//! presentation surface redraws only what changed.

use crate::constants::{API_ERROR_STATUS, FORMAT_ERROR_STATUS, INITIAL_STATUS};
use crate::local_time::{LocalSunTimes, format_clock_time};
use crate::sun_times::SunTimesError;
use crate::tracker::FetchError;

/// Which regions changed since the last render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayChanges {
    pub status: bool,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    status: String,
    alert: String,
    changes: DisplayChanges,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayState {
    pub fn new() -> Self {
        Self {
            status: INITIAL_STATUS.to_string(),
            alert: String::new(),
            changes: DisplayChanges {
                status: true,
                alert: false,
            },
        }
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn alert(&self) -> &str {
        &self.alert
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = text.into();
        self.changes.status = true;
    }

    pub fn set_alert(&mut self, text: impl Into<String>) {
        self.alert = text.into();
        self.changes.alert = true;
    }

    /// Return and clear the pending change flags.
    pub fn take_changes(&mut self) -> DisplayChanges {
        std::mem::take(&mut self.changes)
    }
}

/// Status text for a successful lookup.
pub fn sun_times_status(times: &LocalSunTimes) -> String {
    format!(
        "🌅 Sunrise: {}\n🌇 Sunset:  {}",
        format_clock_time(&times.sunrise),
        format_clock_time(&times.sunset)
    )
}

/// Alert banner text for a fired alert.
pub fn alert_banner(message: &str) -> String {
    format!("⚠️ {}", message)
}

/// Human-readable status for a failed fetch.
///
/// Network and parse failures show their cause; upstream status codes are
/// replaced with a generic advisory.
pub fn error_status(error: &FetchError) -> String {
    match error {
        FetchError::Format(_) => FORMAT_ERROR_STATUS.to_string(),
        FetchError::SunTimes(SunTimesError::Network(cause)) => format!("Network error: {}", cause),
        FetchError::SunTimes(SunTimesError::Api { .. }) => API_ERROR_STATUS.to_string(),
        FetchError::SunTimes(SunTimesError::Parse(cause)) => {
            format!("Unexpected response: {}", cause)
        }
    }
}
