//! Client for the sunrise-sunset.org lookup service.
//!
//! A lookup is one GET with `lat`, `lng` and `formatted=0` (ISO-8601
//! timestamps instead of human-readable ones). The response envelope is
//! checked in a fixed order: transport, then JSON shape, then the upstream
//! `status` field, then the two timestamps.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::constants::API_STATUS_OK;
use crate::geo::Coordinate;

/// Sunrise and sunset for one lookup, still in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTimes {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Top-level `status` reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SunTimesStatus {
    Ok,
    /// Anything other than `"OK"`, e.g. `INVALID_REQUEST` or `ZERO_RESULTS`.
    Error(String),
}

impl SunTimesStatus {
    pub fn from_api(status: &str) -> Self {
        if status == API_STATUS_OK {
            SunTimesStatus::Ok
        } else {
            SunTimesStatus::Error(status.to_string())
        }
    }
}

/// Why a lookup produced no sun times.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SunTimesError {
    /// Connection failure, timeout or non-2xx HTTP status.
    #[error("{0}")]
    Network(String),
    /// The service answered but reported no data for the request.
    #[error("service returned status {status}")]
    Api { status: String },
    /// The body was not the JSON shape the service documents.
    #[error("{0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    // Not an object when status is an error (the service sends "" there).
    #[serde(default)]
    results: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawResults {
    sunrise: String,
    sunset: String,
}

/// Interpret a response body.
///
/// # Examples
/// ```
/// use sunalert::sun_times::{SunTimesError, parse_sun_times_body};
/// let err = parse_sun_times_body(r#"{"status":"ZERO_RESULTS"}"#).unwrap_err();
/// assert_eq!(err, SunTimesError::Api { status: "ZERO_RESULTS".into() });
/// ```
pub fn parse_sun_times_body(body: &str) -> Result<SunTimes, SunTimesError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| SunTimesError::Parse(e.to_string()))?;

    if let SunTimesStatus::Error(status) = SunTimesStatus::from_api(&envelope.status) {
        return Err(SunTimesError::Api { status });
    }

    let results: RawResults = serde_json::from_value(envelope.results)
        .map_err(|e| SunTimesError::Parse(format!("invalid results: {}", e)))?;

    Ok(SunTimes {
        sunrise: parse_iso_timestamp(&results.sunrise)?,
        sunset: parse_iso_timestamp(&results.sunset)?,
    })
}

/// Parse an ISO-8601 timestamp with an explicit offset into UTC.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing.
pub fn parse_iso_timestamp(text: &str) -> Result<DateTime<Utc>, SunTimesError> {
    let text = text.trim();
    let normalized = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(stem) => format!("{}+00:00", stem),
        None => text.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SunTimesError::Parse(format!("invalid timestamp '{}': {}", text, e)))
}

/// Anything that can look up sun times for a coordinate.
pub trait SunTimesSource {
    fn fetch(&self, coordinate: Coordinate)
    -> impl Future<Output = Result<SunTimes, SunTimesError>>;
}

/// HTTP client for the lookup service.
#[derive(Debug, Clone)]
pub struct SunTimesClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl SunTimesClient {
    /// Build a client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sunalert/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::from_client(http, endpoint, timeout))
    }

    /// Wrap an already configured `reqwest::Client`.
    ///
    /// `timeout` is only used for error messages; the client must enforce it.
    pub fn from_client(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            timeout,
        }
    }

    /// The GET request a lookup for `coordinate` sends.
    pub fn request(&self, coordinate: Coordinate) -> reqwest::Result<reqwest::Request> {
        self.http
            .get(&self.endpoint)
            .query(&[
                ("lat", coordinate.latitude.to_string()),
                ("lng", coordinate.longitude.to_string()),
                ("formatted", "0".to_string()),
            ])
            .build()
    }

    fn network_error(&self, error: reqwest::Error) -> SunTimesError {
        if error.is_timeout() {
            SunTimesError::Network(format!(
                "request timed out after {}s",
                self.timeout.as_secs()
            ))
        } else {
            SunTimesError::Network(error.to_string())
        }
    }
}

impl SunTimesSource for SunTimesClient {
    async fn fetch(&self, coordinate: Coordinate) -> Result<SunTimes, SunTimesError> {
        let request = self
            .request(coordinate)
            .map_err(|e| self.network_error(e))?;

        let response = self
            .http
            .execute(request)
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| self.network_error(e))?;

        let body = response.text().await.map_err(|e| self.network_error(e))?;

        parse_sun_times_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test_constants::*;
    use crate::constants::{DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

    fn utc(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_parse_ok_body() {
        let times = parse_sun_times_body(TEST_OK_BODY).unwrap();
        assert_eq!(times.sunrise, utc("2024-06-01T10:00:00+00:00"));
        assert_eq!(times.sunset, utc("2024-06-02T00:30:00+00:00"));
    }

    #[test]
    fn test_parse_z_suffix() {
        let body = r#"{"status":"OK","results":{"sunrise":"2024-06-01T10:00:00Z","sunset":"2024-06-02T00:30:00Z"}}"#;
        let times = parse_sun_times_body(body).unwrap();
        assert_eq!(times.sunrise, utc("2024-06-01T10:00:00+00:00"));
    }

    #[test]
    fn test_parse_ignores_extra_result_fields() {
        let body = r#"{"status":"OK","tzid":"UTC","results":{"sunrise":"2024-06-01T10:00:00+00:00","sunset":"2024-06-02T00:30:00+00:00","solar_noon":"2024-06-01T17:15:00+00:00","day_length":52200}}"#;
        assert!(parse_sun_times_body(body).is_ok());
    }

    #[test]
    fn test_parse_non_ok_status() {
        assert_eq!(
            parse_sun_times_body(TEST_ZERO_RESULTS_BODY),
            Err(SunTimesError::Api {
                status: "ZERO_RESULTS".to_string()
            })
        );
        let invalid = r#"{"results":"","status":"INVALID_REQUEST"}"#;
        assert!(matches!(
            parse_sun_times_body(invalid),
            Err(SunTimesError::Api { .. })
        ));
    }

    #[test]
    fn test_parse_malformed_json() {
        assert!(matches!(
            parse_sun_times_body("<html>502 Bad Gateway</html>"),
            Err(SunTimesError::Parse(_))
        ));
        assert!(matches!(
            parse_sun_times_body(r#"{"results":{}}"#),
            Err(SunTimesError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_ok_with_missing_results() {
        let result = parse_sun_times_body(r#"{"status":"OK"}"#);
        assert!(matches!(result, Err(SunTimesError::Parse(msg)) if msg.starts_with("invalid results")));
    }

    #[test]
    fn test_parse_bad_timestamp() {
        let body = r#"{"status":"OK","results":{"sunrise":"6:00:00 AM","sunset":"2024-06-02T00:30:00+00:00"}}"#;
        assert!(matches!(
            parse_sun_times_body(body),
            Err(SunTimesError::Parse(msg)) if msg.contains("6:00:00 AM")
        ));
    }

    #[test]
    fn test_parse_iso_timestamp_with_offset() {
        assert_eq!(
            parse_iso_timestamp("2024-06-01T06:00:00-04:00").unwrap(),
            utc("2024-06-01T10:00:00+00:00")
        );
    }

    #[test]
    fn test_status_from_api() {
        assert_eq!(SunTimesStatus::from_api("OK"), SunTimesStatus::Ok);
        assert_eq!(
            SunTimesStatus::from_api("INVALID_DATE"),
            SunTimesStatus::Error("INVALID_DATE".to_string())
        );
    }

    #[test]
    fn test_request_query_parameters() {
        let client = SunTimesClient::new(
            DEFAULT_API_URL,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
        .unwrap();
        let request = client
            .request(Coordinate::new(TEST_NYC_LATITUDE, TEST_NYC_LONGITUDE))
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().host_str(), Some("api.sunrise-sunset.org"));
        assert_eq!(request.url().path(), "/json");
        assert_eq!(
            request.url().query(),
            Some("lat=40.7128&lng=-74.006&formatted=0")
        );
    }
}
