//! Continuous sunlight event scheduler.
//!
//! [`SolarEventEmitter`] walks forward one calendar day at a time, keeps the changes that
//! cross the configured minimum sunlight level, sleeps until each one and publishes it on a
//! channel. It runs until cancelled, until the receiver goes away or, with a simulated clock,
//! until the clock reaches its end.
//!
//! ```no_run
//! use std::sync::Arc;
//! use daybreak::{Location, RealTimeSource, SolarEventEmitter, SunlightLevel};
//!
//! # fn main() -> anyhow::Result<()> {
//! let location = Location::from_degrees(37.35, -121.95)?;
//! let (handle, events) = SolarEventEmitter::new(
//!     location,
//!     chrono_tz::America::Los_Angeles,
//!     Arc::new(RealTimeSource),
//! )
//! .with_minimum_sunlight(SunlightLevel::CivilTwilight)
//! .spawn()?;
//!
//! for event in events.iter().take(2) {
//!     println!("{event:?}");
//! }
//! handle.cancel();
//! handle.join()?;
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::math::MathError;
use crate::solar::{Location, SolarCalculator};
use crate::sunlight::{
    ElevationSample, SunlightChange, SunlightLevel, current_sunlight, daily_transitions,
    start_of_day,
};
use crate::time::{CancellationToken, MAX_TIMER_DURATION, TimeSource, WaitOutcome, wait_for};

/// What the scheduler loop is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchedulerState {
    /// Not started yet.
    Idle,
    /// Computing a day's transitions.
    Scanning,
    /// Sleeping until the next retained change.
    Waiting,
    /// Publishing a change.
    Emitting,
    /// Stopped. Terminal.
    Cancelled,
}

/// Published on the event channel, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "change", rename_all = "kebab-case")]
pub enum EmitterEvent {
    /// The scheduler has started waiting for this change.
    Waiting(SunlightChange),
    /// This change has happened.
    Changed(SunlightChange),
}

impl EmitterEvent {
    pub fn change(&self) -> &SunlightChange {
        match self {
            Self::Waiting(change) | Self::Changed(change) => change,
        }
    }
}

/// Why [`SolarEventEmitter::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The cancellation token fired.
    Cancelled,
    /// Nobody is listening anymore.
    ReceiverDropped,
    /// The simulated clock reached its end.
    ClockEnded,
}

/// Builder and runner for the continuous scheduler.
pub struct SolarEventEmitter {
    location: Location,
    zone: Tz,
    clock: Arc<dyn TimeSource>,
    calculator: SolarCalculator,
    minimum_sunlight: SunlightLevel,
    max_timer_duration: Duration,
    debug_enabled: bool,
    state: Arc<Mutex<SchedulerState>>,
}

impl SolarEventEmitter {
    /// Scheduler for `location` in `zone`, reading time from `clock`.
    pub fn new(location: Location, zone: Tz, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            location,
            zone,
            clock,
            calculator: SolarCalculator::default(),
            minimum_sunlight: SunlightLevel::default(),
            max_timer_duration: MAX_TIMER_DURATION,
            debug_enabled: false,
            state: Arc::new(Mutex::new(SchedulerState::Idle)),
        }
    }

    /// Report crossings of `level` instead of civil twilight.
    pub fn with_minimum_sunlight(mut self, level: SunlightLevel) -> Self {
        self.minimum_sunlight = level;
        self
    }

    pub fn with_calculator(mut self, calculator: SolarCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Longest single sleep handed to the clock. Longer waits are chained.
    pub fn with_max_timer_duration(mut self, max: Duration) -> Self {
        self.max_timer_duration = max;
        self
    }

    /// Log every scan and wait.
    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    pub fn minimum_sunlight(&self) -> SunlightLevel {
        self.minimum_sunlight
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sunlight level at the clock's current instant.
    pub fn current_sunlight(&self) -> Result<SunlightLevel, MathError> {
        let now = self.clock.now().with_timezone(&self.zone);
        current_sunlight(&self.calculator, &now, &self.location)
    }

    /// Whether it is currently at least as bright as the minimum level.
    pub fn should_be_active_now(&self) -> Result<bool, MathError> {
        Ok(self.current_sunlight()? >= self.minimum_sunlight)
    }

    /// Run the scheduler loop on the calling thread.
    ///
    /// Events go to `events` in emission order. Domain errors from a day's scan are returned
    /// as errors; every other way of stopping is a [`RunOutcome`].
    pub fn run(
        &self,
        events: &Sender<EmitterEvent>,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let outcome = self.run_loop(events, cancel);
        self.set_state(SchedulerState::Cancelled);
        outcome
    }

    /// Start the loop on a worker thread.
    pub fn spawn(self) -> Result<(EmitterHandle, Receiver<EmitterEvent>)> {
        let (tx, rx) = channel();
        let cancel = CancellationToken::new();
        let state = Arc::clone(&self.state);

        let thread = {
            let cancel = cancel.clone();
            std::thread::Builder::new()
                .name("daybreak-scheduler".into())
                .spawn(move || self.run(&tx, &cancel))
                .context("failed to spawn scheduler thread")?
        };

        Ok((
            EmitterHandle {
                cancel,
                state,
                thread: Some(thread),
            },
            rx,
        ))
    }

    fn run_loop(
        &self,
        events: &Sender<EmitterEvent>,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let now = self.clock.now().with_timezone(&self.zone);
        let elevation = self
            .calculator
            .elevation(&now, &self.location)
            .context("failed to compute the current solar elevation")?;
        let mut seed = ElevationSample {
            time: now,
            elevation,
        };
        let mut date = now.date_naive();

        if self.debug_enabled {
            log_debug!(
                "Scheduler starting at {} ({}, minimum {})",
                now.format("%Y-%m-%d %H:%M:%S %Z"),
                seed.level(),
                self.minimum_sunlight
            );
        }

        loop {
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled);
            }
            if self.is_past_clock_end(date) {
                return Ok(RunOutcome::ClockEnded);
            }

            self.set_state(SchedulerState::Scanning);
            let day = daily_transitions(
                &self.calculator,
                date,
                self.zone,
                &self.location,
                Some(seed.clone()),
            )
            .with_context(|| format!("failed to scan sunlight changes on {date}"))?;

            let retained: Vec<SunlightChange> = day
                .changes
                .into_iter()
                .filter(|change| change.crosses(self.minimum_sunlight))
                .collect();
            seed = day.last_sample;

            if self.debug_enabled {
                log_debug!(
                    "Scanned {}: {} change(s) cross {}",
                    date,
                    retained.len(),
                    self.minimum_sunlight
                );
            }

            let quiet_day = retained.is_empty();
            for change in retained {
                if let Some(outcome) = self.wait_and_emit(change, events, cancel) {
                    return Ok(outcome);
                }
            }

            date = next_date(date)?;
            if quiet_day && let Some(outcome) = self.wait_until_day_starts(date, cancel) {
                return Ok(outcome);
            }
        }
    }

    /// Sleep until `date` begins, so days without retained changes are not scanned ahead
    /// of time. `Some` means the loop must stop.
    fn wait_until_day_starts(
        &self,
        date: NaiveDate,
        cancel: &CancellationToken,
    ) -> Option<RunOutcome> {
        let target = start_of_day(date, &self.zone).with_timezone(&Utc);
        let delay = (target - self.clock.now()).to_std().unwrap_or(Duration::ZERO);
        if delay.is_zero() {
            return None;
        }

        self.set_state(SchedulerState::Waiting);
        if self.debug_enabled {
            log_debug!(
                "Nothing crosses {}, waiting {} until {}",
                self.minimum_sunlight,
                format_delay(delay),
                date
            );
        }

        match wait_for(self.clock.as_ref(), delay, self.max_timer_duration, cancel) {
            WaitOutcome::Cancelled => Some(RunOutcome::Cancelled),
            WaitOutcome::Elapsed => None,
        }
    }

    /// Wait for one change and publish it. `Some` means the loop must stop.
    fn wait_and_emit(
        &self,
        change: SunlightChange,
        events: &Sender<EmitterEvent>,
        cancel: &CancellationToken,
    ) -> Option<RunOutcome> {
        if cancel.is_cancelled() {
            return Some(RunOutcome::Cancelled);
        }

        self.set_state(SchedulerState::Waiting);
        if events.send(EmitterEvent::Waiting(change.clone())).is_err() {
            return Some(RunOutcome::ReceiverDropped);
        }

        let now = self.clock.now();
        let target = change.time.with_timezone(&Utc);
        let delay = (target - now).to_std().unwrap_or(Duration::ZERO);

        if target < now {
            log_warning!(
                "Running late: {} was due {} ago",
                change,
                format_delay((now - target).to_std().unwrap_or(Duration::ZERO))
            );
        } else if self.debug_enabled {
            log_debug!(
                "Waiting {} until {} begins at {}",
                format_delay(delay),
                change.new_level,
                change.time.format("%H:%M %Z")
            );
        }

        if wait_for(self.clock.as_ref(), delay, self.max_timer_duration, cancel)
            == WaitOutcome::Cancelled
        {
            return Some(RunOutcome::Cancelled);
        }

        if self.clock.is_ended() && self.clock.now() < target {
            return Some(RunOutcome::ClockEnded);
        }

        self.set_state(SchedulerState::Emitting);
        if events.send(EmitterEvent::Changed(change)).is_err() {
            return Some(RunOutcome::ReceiverDropped);
        }
        None
    }

    /// True when a simulated clock ends before `date` starts.
    fn is_past_clock_end(&self, date: NaiveDate) -> bool {
        self.clock
            .end_time()
            .is_some_and(|end| start_of_day(date, &self.zone).with_timezone(&Utc) > end)
    }

    fn set_state(&self, state: SchedulerState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Control over a scheduler running on its own thread.
///
/// Dropping the handle cancels the scheduler and waits for the thread to finish.
pub struct EmitterHandle {
    cancel: CancellationToken,
    state: Arc<Mutex<SchedulerState>>,
    thread: Option<JoinHandle<Result<RunOutcome>>>,
}

impl EmitterHandle {
    /// Ask the scheduler to stop. Any wait in progress returns immediately.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this scheduler, for signal handlers.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for the scheduler thread and return how it stopped.
    pub fn join(mut self) -> Result<RunOutcome> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| anyhow::anyhow!("scheduler thread panicked"))?,
            None => Ok(RunOutcome::Cancelled),
        }
    }
}

impl Drop for EmitterHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.cancel.cancel();
            if let Ok(Err(e)) = thread.join() {
                log_error!("Scheduler stopped with an error: {e:#}");
            }
        }
    }
}

fn next_date(date: NaiveDate) -> Result<NaiveDate> {
    date.succ_opt()
        .with_context(|| format!("no calendar day after {date}"))
}

/// `1h 05m`, `12m 30s` or `45s`.
pub(crate) fn format_delay(delay: Duration) -> String {
    let total = delay.as_secs();
    let (days, hours, minutes, seconds) = (
        total / 86_400,
        total / 3600 % 24,
        total / 60 % 60,
        total % 60,
    );
    if days > 0 {
        format!("{days}d {hours}h {minutes:02}m")
    } else if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

