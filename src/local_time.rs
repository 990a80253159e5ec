//! UTC to local wall-clock conversion.
//!
//! Conversion adds the host's current local-minus-UTC offset, sampled when
//! the conversion happens, to the UTC instant. The offset is not looked up for
//! the event's own date, so daylight-saving changes between now and the event
//! are ignored, and the target location's timezone is never consulted. The
//! result is what the host's clock would read if its offset stayed constant.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDateTime, Utc};

use crate::constants::DISPLAY_TIME_FORMAT;
use crate::sun_times::SunTimes;

/// Source of the host's current local time.
///
/// Everything that asks "what time is it" goes through this trait so fetch
/// cycles and alert planning can run against a simulated clock.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    /// Current local time, carrying the host's current UTC offset.
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Build a fixed clock from an RFC 3339 string such as
    /// `2024-06-01T04:00:00-04:00`.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }
}

/// Host local time with the offset stripped, as shown on a wall clock.
pub fn now_local<C: Clock + ?Sized>(clock: &C) -> NaiveDateTime {
    clock.now().naive_local()
}

/// Difference between the host's local time and UTC right now.
pub fn host_utc_offset<C: Clock + ?Sized>(clock: &C) -> Duration {
    Duration::seconds(i64::from(clock.now().offset().local_minus_utc()))
}

/// Shift a UTC instant by a fixed offset into local wall-clock time.
pub fn to_local(utc: DateTime<Utc>, offset: Duration) -> NaiveDateTime {
    utc.naive_utc() + offset
}

/// Render a local time as a 12-hour clock string, e.g. `07:00 AM`.
pub fn format_clock_time(local: &NaiveDateTime) -> String {
    local.format(DISPLAY_TIME_FORMAT).to_string()
}

/// Sunrise and sunset in host wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSunTimes {
    pub sunrise: NaiveDateTime,
    pub sunset: NaiveDateTime,
}

impl LocalSunTimes {
    /// Convert both events with one offset sample.
    pub fn from_utc<C: Clock + ?Sized>(times: &SunTimes, clock: &C) -> Self {
        let offset = host_utc_offset(clock);
        Self {
            sunrise: to_local(times.sunrise, offset),
            sunset: to_local(times.sunset, offset),
        }
    }
}
