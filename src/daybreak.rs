//! Application coordinator that manages the complete lifecycle of daybreak.
//!
//! Loads the configuration, installs signal handlers, starts the scheduler on its worker
//! thread and logs every event it publishes until the scheduler stops.
//!
//! The `Daybreak` struct uses a builder pattern to support different startup contexts:
//! - Normal startup: `Daybreak::new(debug_enabled).run()`
//! - File output: `Daybreak::new(debug_enabled).with_log_file(Some(path)).run()`
//! - Simulation mode: `Daybreak::new(debug_enabled).with_time_source(clock).with_config(config).run()`

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    common::logger::Log,
    config::Config,
    io::signals::{setup_signal_handler, signal_name},
    scheduler::{EmitterEvent, RunOutcome, SolarEventEmitter, format_delay},
    time::{RealTimeSource, TimeSource},
};

/// Builder for configuring and running the daybreak application.
///
/// # Examples
///
/// ```no_run
/// use daybreak::Daybreak;
///
/// # fn main() -> anyhow::Result<()> {
/// let debug_enabled = false;
/// Daybreak::new(debug_enabled).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Daybreak {
    debug_enabled: bool,
    log_file: Option<String>,
    config: Option<Config>,
    time_source: Option<Arc<dyn TimeSource>>,
}

impl Daybreak {
    /// Create a new runner with defaults matching normal run
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            log_file: None,
            config: None,
            time_source: None,
        }
    }

    /// Write all output to `path` instead of stdout
    pub fn with_log_file(mut self, path: Option<String>) -> Self {
        self.log_file = path;
        self
    }

    /// Use an already loaded configuration instead of reading the config file
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Read time from `clock` instead of the system clock
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.time_source = Some(clock);
        self
    }

    /// Execute the application with the configured settings.
    ///
    /// Returns once the scheduler has stopped, after a shutdown signal or, with a simulated
    /// clock, once the clock reaches its end.
    pub fn run(self) -> Result<()> {
        let _log_guard = match self.log_file.as_deref() {
            Some(path) => Some(Log::start_file_logging(path)?),
            None => None,
        };

        log_version!();
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled - showing scheduler scans and waits");
        }

        let config = match self.config {
            Some(config) => config,
            None => Config::load()?,
        };
        config.log_config();

        let location = config.location()?;
        let zone = config.timezone()?;
        let clock = self
            .time_source
            .unwrap_or_else(|| Arc::new(RealTimeSource));

        if let Some(end) = clock.end_time() {
            let start = clock.now();
            let duration = end - start;
            log_block_start!("Simulation Mode");
            log_decorated!(
                "Simulating from {} to {}",
                start.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S %Z"),
                end.with_timezone(&zone).format("%Y-%m-%d %H:%M:%S %Z")
            );
            log_indented!(
                "Total simulated time: {} hours {} minutes",
                duration.num_hours(),
                duration.num_minutes() % 60
            );
            log_indented!("Time acceleration: fast-forward (instant execution)");
        }

        let emitter = SolarEventEmitter::new(location, zone, clock.clone())
            .with_minimum_sunlight(config.minimum_sunlight())
            .with_calculator(config.calculator())
            .with_debug(self.debug_enabled);

        let current = emitter
            .current_sunlight()
            .context("failed to compute the current sunlight level")?;
        log_block_start!("Current sunlight: {}", current);
        if current >= emitter.minimum_sunlight() {
            log_indented!("At or above {}", emitter.minimum_sunlight());
        } else {
            log_indented!("Below {}", emitter.minimum_sunlight());
        }

        let (handle, events) = emitter.spawn()?;
        let signal_state = setup_signal_handler(handle.cancellation_token(), self.debug_enabled)?;

        for event in events.iter() {
            match event {
                EmitterEvent::Waiting(change) => {
                    let delay = (change.time.with_timezone(&chrono::Utc) - clock.now())
                        .to_std()
                        .unwrap_or_default();
                    log_block_start!(
                        "Next: {} at {} (in {})",
                        change
                            .name()
                            .map(|name| name.display_name())
                            .unwrap_or("sunlight change"),
                        change.time.format("%Y-%m-%d %H:%M %Z"),
                        format_delay(delay)
                    );
                }
                EmitterEvent::Changed(change) => {
                    log_info!("{}", change);
                }
            }
        }

        match handle.join()? {
            RunOutcome::Cancelled => {
                if let Some(signal) = signal_state.received_signal() {
                    log_block_start!("Received {}, shutting down", signal_name(signal));
                } else {
                    log_block_start!("Scheduler stopped");
                }
            }
            RunOutcome::ClockEnded => log_block_start!("Simulation complete"),
            RunOutcome::ReceiverDropped => log_block_start!("Scheduler stopped"),
        }
        log_end!();

        Ok(())
    }
}
