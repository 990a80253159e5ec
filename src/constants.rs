//! Application constants and default values for sunalert.
//!
//! This module contains the lookup endpoint, configuration defaults,
//! validation limits and the fixed user-facing messages.

// ═══ Sun Times Service ═══

pub const DEFAULT_API_URL: &str = "https://api.sunrise-sunset.org/json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10; // hard ceiling for one lookup
pub const API_STATUS_OK: &str = "OK";

// ═══ Alert Defaults ═══

pub const DEFAULT_ALERT_LEAD_MINUTES: u64 = 5; // alerts fire this long before the event
pub const DEFAULT_STRICT_COORDINATES: bool = false; // syntax-only validation unless asked

pub const SUNRISE_ALERT_MESSAGE: &str = "Sunrise soon! Stay indoors!";
pub const SUNSET_ALERT_MESSAGE: &str = "Sunset coming — time to go out!";

// ═══ Validation Limits ═══

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

pub const MINIMUM_REQUEST_TIMEOUT_SECS: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT_SECS: u64 = 120;

pub const MINIMUM_ALERT_LEAD_MINUTES: u64 = 1;
pub const MAXIMUM_ALERT_LEAD_MINUTES: u64 = 120;

// ═══ Display Text ═══

pub const DISPLAY_TIME_FORMAT: &str = "%I:%M %p"; // 12-hour clock with AM/PM
pub const INITIAL_STATUS: &str = "Enter coordinates and press Enter to fetch.";
pub const FETCHING_STATUS: &str = "Fetching sunrise/sunset times...";
pub const FORMAT_ERROR_STATUS: &str = "Please enter valid coordinates like: 40.7128,-74.0060";
pub const API_ERROR_STATUS: &str =
    "Error fetching data. No sun times available for that location.";
pub const INPUT_PROMPT: &str = "lat,lon> ";
pub const QUIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

// ═══ Configuration Files ═══

pub const CONFIG_DIR_NAME: &str = "sunalert";
pub const CONFIG_FILE_NAME: &str = "sunalert.toml";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1; // General failure
