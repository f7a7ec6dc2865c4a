//! Long waits composed from bounded timer links.
//!
//! Platform timers cap a single wait (commonly at `u32::MAX - 1` milliseconds, about 49.7
//! days). A longer wait becomes a chain of maximum-length links followed by the remainder, with
//! cancellation checked before every link.

use std::time::Duration;

use super::{CancellationToken, TimeSource, WaitOutcome};

/// Longest single wait handed to the clock.
pub const MAX_TIMER_DURATION: Duration = Duration::from_millis(u32::MAX as u64 - 1);

const MIN_TIMER_LINK: Duration = Duration::from_millis(1);

/// Iterator over the link durations that make up one long wait.
#[derive(Debug, Clone)]
pub struct TimerLinks {
    remaining: Duration,
    max_link: Duration,
}

impl Iterator for TimerLinks {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining.is_zero() {
            return None;
        }
        let link = self.remaining.min(self.max_link);
        self.remaining -= link;
        Some(link)
    }
}

/// Split `total` into links of at most `max_link` (never shorter than one millisecond).
pub fn timer_links(total: Duration, max_link: Duration) -> TimerLinks {
    TimerLinks {
        remaining: total,
        max_link: max_link.max(MIN_TIMER_LINK),
    }
}

/// Wait `total` on `clock`, one link at a time.
///
/// Returns [`WaitOutcome::Cancelled`] as soon as `cancel` is observed, whether before a link
/// starts, during a link, or after the last one.
pub fn wait_for(
    clock: &dyn TimeSource,
    total: Duration,
    max_link: Duration,
    cancel: &CancellationToken,
) -> WaitOutcome {
    for link in timer_links(total, max_link) {
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }
        if clock.sleep(link, cancel) == WaitOutcome::Cancelled {
            return WaitOutcome::Cancelled;
        }
    }

    if cancel.is_cancelled() {
        WaitOutcome::Cancelled
    } else {
        WaitOutcome::Elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SimulatedTimeSource;
    use chrono::{TimeZone, Utc};

    const DAY: Duration = Duration::from_secs(86_400);

    #[test]
    fn test_max_timer_duration_is_about_49_7_days() {
        assert_eq!(MAX_TIMER_DURATION.as_millis(), 4_294_967_294);
        let days = MAX_TIMER_DURATION.as_secs_f64() / DAY.as_secs_f64();
        assert!((days - 49.71).abs() < 0.01);
    }

    #[test]
    fn test_short_wait_is_a_single_link() {
        let links: Vec<_> = timer_links(Duration::from_secs(60), MAX_TIMER_DURATION).collect();
        assert_eq!(links, vec![Duration::from_secs(60)]);
    }

    #[test]
    fn test_zero_wait_has_no_links() {
        assert_eq!(timer_links(Duration::ZERO, MAX_TIMER_DURATION).count(), 0);
    }

    #[test]
    fn test_hundred_days_split_into_maximum_links() {
        let total = DAY * 100;
        let links: Vec<_> = timer_links(total, MAX_TIMER_DURATION).collect();

        assert_eq!(
            links,
            vec![
                MAX_TIMER_DURATION,
                MAX_TIMER_DURATION,
                total - MAX_TIMER_DURATION * 2
            ]
        );
        assert_eq!(links.iter().sum::<Duration>(), total);
    }

    #[test]
    fn test_exact_multiple_has_no_empty_tail() {
        let links: Vec<_> = timer_links(Duration::from_secs(30), Duration::from_secs(10)).collect();
        assert_eq!(links, vec![Duration::from_secs(10); 3]);
    }

    #[test]
    fn test_zero_max_link_is_clamped() {
        let links: Vec<_> = timer_links(Duration::from_millis(3), Duration::ZERO).collect();
        assert_eq!(links, vec![Duration::from_millis(1); 3]);
    }

    #[test]
    fn test_wait_for_chains_links_on_the_clock() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = SimulatedTimeSource::starting_at(start);
        let token = CancellationToken::new();

        let outcome = wait_for(&clock, DAY * 100, MAX_TIMER_DURATION, &token);

        assert_eq!(outcome, WaitOutcome::Elapsed);
        assert_eq!(clock.recorded_sleeps().len(), 3);
        assert_eq!(clock.now(), start + chrono::TimeDelta::days(100));
    }

    #[test]
    fn test_wait_for_stops_when_cancelled() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = SimulatedTimeSource::starting_at(start);
        let token = CancellationToken::new();
        token.cancel();

        let outcome = wait_for(&clock, DAY, MAX_TIMER_DURATION, &token);

        assert_eq!(outcome, WaitOutcome::Cancelled);
        assert!(clock.recorded_sleeps().is_empty());
        assert_eq!(
            wait_for(&clock, Duration::ZERO, MAX_TIMER_DURATION, &token),
            WaitOutcome::Cancelled
        );
    }
}
