//! # Daybreak Library
//!
//! Solar elevation engine and twilight transition scheduler in exact decimal arithmetic.
//!
//! ## Architecture
//!
//! The library is organized in layers, each depending only on the ones above it:
//!
//! - **Math**: `math` implements exp, log, power, sqrt and the trigonometric functions over
//!   `rust_decimal::Decimal` with bounded Taylor and Newton iterations
//! - **Solar**: `solar` computes solar elevation and azimuth with the NOAA algorithm
//! - **Sunlight**: `sunlight` classifies elevations into twilight levels and scans a day for
//!   level changes
//! - **Scheduling**: `scheduler` walks forward day by day and publishes each change that
//!   crosses the minimum level at the moment it happens; `time` provides the injectable clock,
//!   cancellation and chained long waits
//! - **Application**: `Daybreak` coordinates config loading, signal handling and the
//!   scheduler for the binary; `args` and `commands` implement the CLI
//! - **Infrastructure**: `common::logger` for output, `config` for TOML settings and
//!   `io::signals` for shutdown signals

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod args;
pub mod commands;
pub mod config;
pub mod io;
pub mod math;
pub mod scheduler;
pub mod solar;
pub mod sunlight;
pub mod time;

mod daybreak;

pub use daybreak::Daybreak;
pub use math::{DecimalMath, MathError};
pub use scheduler::{EmitterEvent, EmitterHandle, RunOutcome, SchedulerState, SolarEventEmitter};
pub use solar::{Location, SolarCalculator, SolarPosition};
pub use sunlight::{
    DailyTransitions, ElevationSample, SolarTimeOfDay, SunlightChange, SunlightLevel,
    current_sunlight, daily_transitions,
};
pub use time::{
    CancellationToken, RealTimeSource, SimulatedTimeSource, TimeSource, WaitOutcome,
};
