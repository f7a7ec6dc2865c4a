//! Implementation of the `simulate` command.
//!
//! Runs the scheduler on a simulated clock that jumps through every wait, so the changes
//! between two local times are printed immediately.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::Arc;

use crate::Daybreak;
use crate::config::Config;
use crate::time::SimulatedTimeSource;

/// Format accepted for the start and end times.
pub const SIMULATION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `YYYY-MM-DD HH:MM:SS` as a local time in `zone`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times inside a DST gap are
/// rejected.
pub fn parse_datetime_in_tz(text: &str, zone: Tz) -> Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), SIMULATION_TIME_FORMAT)
        .with_context(|| format!("'{text}' is not in YYYY-MM-DD HH:MM:SS format"))?;
    zone.from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{text}' does not exist in {}", zone.name()))
}

/// Resolve the simulation window in the configured zone.
pub fn simulation_window(
    start_time: &str,
    end_time: &str,
    zone: Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = parse_datetime_in_tz(start_time, zone).context("Invalid start time")?;
    let end = parse_datetime_in_tz(end_time, zone).context("Invalid end time")?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

/// Handle the `simulate` command.
pub fn handle_simulate_command(
    start_time: String,
    end_time: String,
    log_file: Option<String>,
    debug_enabled: bool,
) -> Result<()> {
    let config = Config::load()?;
    let zone = config.timezone()?;
    let (start, end) = simulation_window(&start_time, &end_time, zone)?;

    let clock = Arc::new(SimulatedTimeSource::between(start, end));

    Daybreak::new(debug_enabled)
        .with_log_file(log_file)
        .with_config(config)
        .with_time_source(clock)
        .run()
}
