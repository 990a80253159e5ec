//! Fetch-cycle controller and the single-threaded event loop.
//!
//! A fetch cycle runs: coordinate text → [`parse_coordinates`] → sun times
//! lookup → local-time conversion → status text + up to two alerts. Every
//! outcome, success or failure, ends by overwriting the status display.
//!
//! The loop multiplexes user input, fired alerts and Ctrl-C on one task. A
//! lookup is awaited inside the loop, so at most one request is in flight and
//! alerts that fire during a lookup are applied right after it completes.
//! Ctrl-C is watched for the whole session, lookups included.

use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::alerts::{AlertFired, AlertId, AlertScheduler};
use crate::config::Config;
use crate::constants::FETCHING_STATUS;
use crate::display::{DisplayState, alert_banner, error_status, sun_times_status};
use crate::geo::{Coordinate, CoordinateValidation, FormatError, parse_coordinates};
use crate::local_time::{Clock, LocalSunTimes, now_local};
use crate::logger::Log;
use crate::sun_times::{SunTimesError, SunTimesSource};
use crate::surface::{Surface, UserInput};

/// Everything that can end a fetch cycle early.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("invalid coordinates: {0}")]
    Format(#[from] FormatError),
    #[error(transparent)]
    SunTimes(#[from] SunTimesError),
}

/// Result of one successful fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub coordinate: Coordinate,
    pub times: LocalSunTimes,
    pub scheduled: Vec<AlertId>,
}

/// Owns the display state and the alert registry for one session.
pub struct SunTracker<S, C> {
    source: S,
    clock: C,
    validation: CoordinateValidation,
    scheduler: AlertScheduler,
    display: DisplayState,
}

impl<S, C> SunTracker<S, C>
where
    S: SunTimesSource,
    C: Clock,
{
    /// Create a tracker and the receiver its alert timers report on.
    pub fn new(
        source: S,
        clock: C,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<AlertFired>) {
        let (scheduler, fired_rx) = AlertScheduler::new(config.alert_lead());
        let tracker = Self {
            source,
            clock,
            validation: config.coordinate_validation(),
            scheduler,
            display: DisplayState::new(),
        };
        (tracker, fired_rx)
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayState {
        &mut self.display
    }

    pub fn scheduler(&self) -> &AlertScheduler {
        &self.scheduler
    }

    /// Run one fetch cycle for the raw input text.
    ///
    /// Malformed input never reaches the network. On success both alerts
    /// are offered to the scheduler; `schedule_alerts = false` only displays
    /// the times.
    pub async fn fetch_cycle(
        &mut self,
        input: &str,
        schedule_alerts: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let coordinate = self.begin_cycle(input)?;
        self.finish_cycle(coordinate, schedule_alerts).await
    }

    /// Validate the input and, if it parses, show the fetching status.
    ///
    /// On failure the error status is already displayed.
    pub fn begin_cycle(&mut self, input: &str) -> Result<Coordinate, FetchError> {
        match parse_coordinates(input, self.validation) {
            Ok(coordinate) => {
                self.display.set_status(FETCHING_STATUS);
                Ok(coordinate)
            }
            Err(e) => Err(self.report_failure(e.into())),
        }
    }

    /// Look up a validated coordinate and display the result.
    pub async fn finish_cycle(
        &mut self,
        coordinate: Coordinate,
        schedule_alerts: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let utc_times = match self.source.fetch(coordinate).await {
            Ok(times) => times,
            Err(e) => return Err(self.report_failure(e.into())),
        };
        let times = LocalSunTimes::from_utc(&utc_times, &self.clock);

        let scheduled = if schedule_alerts {
            let now = now_local(&self.clock);
            self.scheduler.schedule_sun_times(&times, now)
        } else {
            Vec::new()
        };

        self.display.set_status(sun_times_status(&times));
        Log::log_debug(&format!(
            "Fetched sun times for {} ({} alert(s) scheduled)",
            coordinate,
            scheduled.len()
        ));

        Ok(FetchOutcome {
            coordinate,
            times,
            scheduled,
        })
    }

    fn report_failure(&mut self, error: FetchError) -> FetchError {
        self.display.set_status(error_status(&error));
        match &error {
            FetchError::SunTimes(SunTimesError::Api { status }) => {
                Log::log_debug(&format!("Service reported status {}", status));
            }
            other => Log::log_debug(&format!("Fetch failed: {}", other)),
        }
        error
    }

    /// Apply a fired alert to the display.
    ///
    /// Returns `false` if the alert had already fired.
    pub fn handle_alert(&mut self, fired: &AlertFired) -> bool {
        match self.scheduler.mark_fired(fired.id) {
            Some(alert) => {
                Log::log_debug(&format!("Alert #{} fired", alert.id));
                self.display.set_alert(alert_banner(alert.message));
                true
            }
            None => false,
        }
    }
}

/// Drive a session until the user quits, input ends or Ctrl-C arrives.
pub async fn run<S, C, U>(
    tracker: &mut SunTracker<S, C>,
    fired_rx: mpsc::UnboundedReceiver<AlertFired>,
    surface: &mut U,
    initial_input: Option<String>,
) -> Result<()>
where
    S: SunTimesSource,
    C: Clock,
    U: Surface,
{
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            Log::log_debug(&format!("Ctrl-C handler unavailable: {}", e));
            std::future::pending::<()>().await;
        }
        Log::log_pipe();
        Log::log_decorated("Received interrupt, shutting down");
    };

    run_until(tracker, fired_rx, surface, initial_input, interrupt).await
}

/// Drive a session until the user quits, input ends or `shutdown` resolves.
///
/// `shutdown` is polled across the whole session, including while a lookup
/// is in flight.
pub async fn run_until<S, C, U, F>(
    tracker: &mut SunTracker<S, C>,
    mut fired_rx: mpsc::UnboundedReceiver<AlertFired>,
    surface: &mut U,
    initial_input: Option<String>,
    shutdown: F,
) -> Result<()>
where
    S: SunTimesSource,
    C: Clock,
    U: Surface,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    surface.render(tracker.display_mut())?;

    if let Some(input) = initial_input {
        surface.echo_input(&input)?;
        let stopped = run_cycle(tracker, surface, &input, shutdown.as_mut()).await?;
        surface.render(tracker.display_mut())?;
        if stopped {
            return finish_session(tracker);
        }
    }

    loop {
        surface.prompt()?;

        let stopped = tokio::select! {
            input = surface.next_input() => {
                match input? {
                    UserInput::Coordinates(text) => {
                        run_cycle(tracker, surface, &text, shutdown.as_mut()).await?
                    }
                    UserInput::Quit => true,
                }
            }
            Some(fired) = fired_rx.recv() => {
                tracker.handle_alert(&fired);
                false
            }
            _ = shutdown.as_mut() => true,
        };

        surface.render(tracker.display_mut())?;
        if stopped {
            break;
        }
    }

    finish_session(tracker)
}

/// One fetch cycle with the fetching state rendered before the lookup.
///
/// Returns `true` if `shutdown` resolved while the lookup was in flight.
async fn run_cycle<S, C, U, F>(
    tracker: &mut SunTracker<S, C>,
    surface: &mut U,
    input: &str,
    shutdown: Pin<&mut F>,
) -> Result<bool>
where
    S: SunTimesSource,
    C: Clock,
    U: Surface,
    F: Future<Output = ()>,
{
    let Ok(coordinate) = tracker.begin_cycle(input) else {
        return Ok(false);
    };
    surface.render(tracker.display_mut())?;

    tokio::select! {
        _ = tracker.finish_cycle(coordinate, true) => Ok(false),
        _ = shutdown => Ok(true),
    }
}

fn finish_session<S, C>(tracker: &SunTracker<S, C>) -> Result<()>
where
    S: SunTimesSource,
    C: Clock,
{
    let pending = tracker.scheduler().pending_count();
    if pending > 0 {
        Log::log_pipe();
        Log::log_warning(&format!("Dropping {} pending alert(s)", pending));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::test_constants::*;
    use crate::constants::{API_ERROR_STATUS, FORMAT_ERROR_STATUS};
    use crate::local_time::FixedClock;
    use crate::sun_times::{SunTimes, parse_sun_times_body};
    use std::cell::Cell;

    /// Answers every lookup with a canned body and counts calls.
    struct CannedSource {
        body: &'static str,
        calls: Cell<usize>,
    }

    impl CannedSource {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: Cell::new(0),
            }
        }
    }

    impl SunTimesSource for CannedSource {
        async fn fetch(&self, _coordinate: Coordinate) -> Result<SunTimes, SunTimesError> {
            self.calls.set(self.calls.get() + 1);
            parse_sun_times_body(self.body)
        }
    }

    fn clock_at(rfc3339: &str) -> FixedClock {
        FixedClock::parse(rfc3339).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_skips_network() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        let result = tracker.fetch_cycle("", true).await;

        assert_eq!(result, Err(FetchError::Format(FormatError::Empty)));
        assert_eq!(tracker.source.calls.get(), 0);
        assert_eq!(tracker.display().status(), FORMAT_ERROR_STATUS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_results_shows_advisory_without_alerts() {
        let source = CannedSource::new(TEST_ZERO_RESULTS_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        let result = tracker.fetch_cycle(TEST_NYC_INPUT, true).await;

        assert!(matches!(
            result,
            Err(FetchError::SunTimes(SunTimesError::Api { .. }))
        ));
        assert_eq!(tracker.display().status(), API_ERROR_STATUS);
        assert!(tracker.scheduler().alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_cycle_sets_status_and_alerts() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        let outcome = tracker.fetch_cycle(TEST_NYC_INPUT, true).await.unwrap();

        assert_eq!(
            outcome.coordinate,
            Coordinate::new(TEST_NYC_LATITUDE, TEST_NYC_LONGITUDE)
        );
        assert_eq!(outcome.scheduled.len(), 2);
        assert_eq!(
            tracker.display().status(),
            "🌅 Sunrise: 06:00 AM\n🌇 Sunset:  08:30 PM"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_only_cycle_schedules_nothing() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        let outcome = tracker.fetch_cycle(TEST_NYC_INPUT, false).await.unwrap();

        assert!(outcome.scheduled.is_empty());
        assert!(tracker.scheduler().alerts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_alert_sets_banner_once() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, mut rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());
        tracker.fetch_cycle(TEST_NYC_INPUT, true).await.unwrap();

        let fired = rx.recv().await.unwrap();
        assert!(tracker.handle_alert(&fired));
        assert_eq!(tracker.display().alert(), "⚠️ Sunrise soon! Stay indoors!");
        assert!(!tracker.handle_alert(&fired));
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_cycle_shows_fetching_state() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        let coordinate = tracker.begin_cycle(TEST_NYC_INPUT).unwrap();
        assert_eq!(tracker.display().status(), FETCHING_STATUS);
        assert_eq!(tracker.source.calls.get(), 0);

        tracker.finish_cycle(coordinate, false).await.unwrap();
        assert_eq!(tracker.source.calls.get(), 1);
        assert!(tracker.display().status().contains("06:00 AM"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_begin_cycle_rejects_without_fetching_state() {
        let source = CannedSource::new(TEST_OK_BODY);
        let (mut tracker, _rx) =
            SunTracker::new(source, clock_at("2024-06-01T04:00:00-04:00"), &Config::default());

        assert!(tracker.begin_cycle("40.7128").is_err());
        assert_eq!(tracker.display().status(), FORMAT_ERROR_STATUS);
    }
}
