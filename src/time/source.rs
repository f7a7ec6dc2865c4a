//! Clock abstraction injected into everything that needs "now".
//!
//! [`RealTimeSource`] reads the system clock and sleeps on the cancellation token.
//! [`SimulatedTimeSource`] jumps through every sleep instantly and records what it was asked
//! to sleep, which keeps scheduler tests deterministic and powers the `simulate` command.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use super::CancellationToken;

/// How a sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Elapsed,
    Cancelled,
}

/// Source of the current time and of (cancellable) sleeps.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Sleep for `duration`, returning early if `cancel` fires.
    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> WaitOutcome;

    fn is_simulated(&self) -> bool;

    /// Instant past which a simulated clock never advances. `None` for real time.
    fn end_time(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Whether the clock has reached its end.
    fn is_ended(&self) -> bool {
        self.end_time().is_some_and(|end| self.now() >= end)
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.wait_timeout(duration) {
            WaitOutcome::Cancelled
        } else {
            WaitOutcome::Elapsed
        }
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Fast-forward clock: every sleep advances simulated time immediately.
#[derive(Debug)]
pub struct SimulatedTimeSource {
    current: Mutex<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl SimulatedTimeSource {
    /// Clock starting at `start` that never ends.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
            end: None,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Clock running from `start` to `end`. Time never advances past `end`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            end: Some(end),
            ..Self::starting_at(start)
        }
    }

    /// Every sleep requested so far, in order.
    pub fn recorded_sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let step = TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX);
        let next = current.checked_add_signed(step).unwrap_or(DateTime::<Utc>::MAX_UTC);
        *current = match self.end {
            Some(end) if next > end => end,
            _ => next,
        };
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sleep(&self, duration: Duration, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        self.sleeps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
        self.advance(duration);
        WaitOutcome::Elapsed
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end
    }
}
