//! Clocks, cancellation, long waits and time zone lookup.

pub mod cancel;
pub mod source;
pub mod wait;
pub mod zone;

pub use cancel::CancellationToken;
pub use source::{RealTimeSource, SimulatedTimeSource, TimeSource, WaitOutcome};
pub use wait::{MAX_TIMER_DURATION, timer_links, wait_for};
pub use zone::{parse_timezone, resolve_timezone, system_timezone};
