//! One-shot reminder alerts ahead of sunrise and sunset.
//!
//! Each alert is planned once: `fire_at = event - lead`. If that moment is
//! already behind the current local time the event is skipped without error.
//! Otherwise the delay until `fire_at` is computed a single time and handed to
//! a timer task on the event loop. When the timer elapses it sends an
//! [`AlertFired`] message back over a channel; the loop owning the display
//! then calls [`AlertScheduler::mark_fired`].
//!
//! Alerts move from `Pending` to `Fired` exactly once. There is no
//! cancellation: alerts planned by an earlier fetch keep running after a new
//! fetch schedules its own.

use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use tokio::sync::mpsc;

use crate::constants::{SUNRISE_ALERT_MESSAGE, SUNSET_ALERT_MESSAGE};
use crate::local_time::{LocalSunTimes, format_clock_time};
use crate::logger::Log;

pub type AlertId = u64;

/// The solar event an alert precedes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

impl SunEvent {
    pub fn message(self) -> &'static str {
        match self {
            SunEvent::Sunrise => SUNRISE_ALERT_MESSAGE,
            SunEvent::Sunset => SUNSET_ALERT_MESSAGE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SunEvent::Sunrise => "sunrise",
            SunEvent::Sunset => "sunset",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    Pending,
    Fired,
}

/// An alert registered with the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAlert {
    pub id: AlertId,
    pub event: SunEvent,
    pub fire_at: NaiveDateTime,
    pub message: &'static str,
    pub state: AlertState,
}

impl ScheduledAlert {
    pub fn is_pending(&self) -> bool {
        self.state == AlertState::Pending
    }
}

/// When an alert should fire and how long to wait for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPlan {
    pub fire_at: NaiveDateTime,
    pub delay: StdDuration,
}

/// Sent by a timer task when its alert's delay has elapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertFired {
    pub id: AlertId,
    pub message: &'static str,
}

/// Work out when an alert for `event_time` fires.
///
/// Returns `None` when `event_time - lead` is not strictly after `now`.
///
/// # Examples
/// ```
/// use chrono::{Duration, NaiveDate};
/// use sunalert::alerts::plan_alert;
/// let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
/// let now = day.and_hms_opt(4, 0, 0).unwrap();
/// let sunrise = day.and_hms_opt(6, 0, 0).unwrap();
/// let plan = plan_alert(sunrise, Duration::minutes(5), now).unwrap();
/// assert_eq!(plan.fire_at, day.and_hms_opt(5, 55, 0).unwrap());
/// assert_eq!(plan.delay.as_secs(), 115 * 60);
/// ```
pub fn plan_alert(
    event_time: NaiveDateTime,
    lead: Duration,
    now: NaiveDateTime,
) -> Option<AlertPlan> {
    let fire_at = event_time - lead;
    if fire_at <= now {
        return None;
    }

    let delay = (fire_at - now).to_std().ok()?;
    Some(AlertPlan { fire_at, delay })
}

/// Registry of alerts plus the channel their timers report back on.
pub struct AlertScheduler {
    alerts: Vec<ScheduledAlert>,
    next_id: AlertId,
    lead: Duration,
    fired_tx: mpsc::UnboundedSender<AlertFired>,
}

impl AlertScheduler {
    /// Create a scheduler and the receiver fired alerts arrive on.
    pub fn new(lead: Duration) -> (Self, mpsc::UnboundedReceiver<AlertFired>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            alerts: Vec::new(),
            next_id: 1,
            lead,
            fired_tx,
        };
        (scheduler, fired_rx)
    }

    /// Schedule an alert ahead of `event_time`.
    ///
    /// Must be called from within a tokio runtime when the alert is still in
    /// the future, since the timer is spawned as a task.
    pub fn schedule(
        &mut self,
        event: SunEvent,
        event_time: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Option<AlertId> {
        let Some(plan) = plan_alert(event_time, self.lead, now) else {
            Log::log_debug(&format!(
                "Skipping {} alert: {} is already past",
                event.as_str(),
                format_clock_time(&(event_time - self.lead))
            ));
            return None;
        };

        let id = self.next_id;
        self.next_id += 1;

        let message = event.message();
        self.alerts.push(ScheduledAlert {
            id,
            event,
            fire_at: plan.fire_at,
            message,
            state: AlertState::Pending,
        });

        let fired_tx = self.fired_tx.clone();
        let deadline = tokio::time::Instant::now() + plan.delay;
        tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // The loop may already be gone at shutdown.
            let _ = fired_tx.send(AlertFired { id, message });
        });

        Log::log_debug(&format!(
            "Scheduled {} alert #{} for {} (in {}s)",
            event.as_str(),
            id,
            format_clock_time(&plan.fire_at),
            plan.delay.as_secs()
        ));

        Some(id)
    }

    /// Schedule the sunrise and sunset alerts for one fetch cycle.
    pub fn schedule_sun_times(
        &mut self,
        times: &LocalSunTimes,
        now: NaiveDateTime,
    ) -> Vec<AlertId> {
        [
            (SunEvent::Sunrise, times.sunrise),
            (SunEvent::Sunset, times.sunset),
        ]
        .into_iter()
        .filter_map(|(event, at)| self.schedule(event, at, now))
        .collect()
    }

    /// Move a pending alert to `Fired` and drop it from the registry.
    ///
    /// Returns `None` for unknown ids and for alerts that already fired.
    pub fn mark_fired(&mut self, id: AlertId) -> Option<ScheduledAlert> {
        let index = self.alerts.iter().position(|alert| alert.id == id)?;
        let mut alert = self.alerts.remove(index);
        alert.state = AlertState::Fired;
        Some(alert)
    }

    /// Alerts that have not fired yet.
    pub fn alerts(&self) -> &[ScheduledAlert] {
        &self.alerts
    }

    pub fn pending_count(&self) -> usize {
        self.alerts.iter().filter(|alert| alert.is_pending()).count()
    }
}
