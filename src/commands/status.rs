//! Implementation of the `status` command.
//!
//! Prints the current sunlight level and every change of the current local day, marking the
//! ones the scheduler would report. With `--json` the same report is printed as JSON.

use anyhow::{Context, Result};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::common::logger::Log;
use crate::config::Config;
use crate::solar::Location;
use crate::sunlight::{SunlightChange, SunlightLevel, current_sunlight, daily_transitions};
use crate::time::{RealTimeSource, TimeSource};

/// Everything the status command reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub location: Location,
    pub timezone: String,
    pub time: DateTime<Tz>,
    pub current_level: SunlightLevel,
    pub minimum_sunlight: SunlightLevel,
    pub active: bool,
    pub changes: Vec<StatusChange>,
}

/// One of today's changes and whether it crosses the minimum level.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    #[serde(flatten)]
    pub change: SunlightChange,
    pub reported: bool,
}

impl StatusReport {
    /// Build the report for the clock's current instant.
    pub fn build(config: &Config, clock: &dyn TimeSource) -> Result<Self> {
        let location = config.location()?;
        let zone = config.timezone()?;
        let calculator = config.calculator();
        let minimum = config.minimum_sunlight();

        let now = clock.now().with_timezone(&zone);
        let current_level = current_sunlight(&calculator, &now, &location)
            .context("failed to compute the current sunlight level")?;
        let day = daily_transitions(&calculator, now.date_naive(), zone, &location, None)
            .with_context(|| format!("failed to scan sunlight changes on {}", now.date_naive()))?;

        let changes = day
            .changes
            .into_iter()
            .map(|change| StatusChange {
                reported: change.crosses(minimum),
                change,
            })
            .collect();

        Ok(Self {
            location,
            timezone: zone.name().to_string(),
            time: now,
            current_level,
            minimum_sunlight: minimum,
            active: current_level >= minimum,
            changes,
        })
    }

    fn log(&self) {
        log_block_start!("Location: {} ({})", self.location, self.timezone);
        log_indented!("Time: {}", self.time.format("%Y-%m-%d %H:%M:%S %Z"));
        log_indented!("Current sunlight: {}", self.current_level);
        log_indented!(
            "Minimum sunlight: {} ({})",
            self.minimum_sunlight,
            if self.active { "active" } else { "inactive" }
        );

        if self.changes.is_empty() {
            log_block_start!("No sunlight changes today");
            return;
        }

        log_block_start!("Today's changes:");
        for entry in &self.changes {
            let change = &entry.change;
            let marker = if entry.reported { "•" } else { " " };
            log_indented!(
                "{} {}  {:<20} {} → {}",
                marker,
                change.time.format("%H:%M"),
                change
                    .name()
                    .map(|name| name.display_name())
                    .unwrap_or("sunlight change"),
                change.previous_level,
                change.new_level
            );
        }
        log_indented!("• reported by the scheduler");
    }
}

/// Handle the `status` command.
pub fn handle_status_command(json: bool, debug_enabled: bool) -> Result<()> {
    if json {
        let report = Log::quiet(|| {
            Config::load().and_then(|config| StatusReport::build(&config, &RealTimeSource))
        })?;
        let output =
            serde_json::to_string_pretty(&report).context("failed to serialize status report")?;
        println!("{output}");
        return Ok(());
    }

    let config = Config::load()?;
    let report = StatusReport::build(&config, &RealTimeSource)?;

    log_version!();
    if debug_enabled {
        config.log_config();
    }
    report.log();
    log_end!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::SimulatedTimeSource;
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Los_Angeles;

    fn san_jose_config() -> Config {
        Config {
            latitude: Some(37.35),
            longitude: Some(-121.95),
            timezone: Some("America/Los_Angeles".to_string()),
            ..Config::default()
        }
    }

    fn clock_at_la_noon() -> SimulatedTimeSource {
        SimulatedTimeSource::starting_at(
            Los_Angeles
                .with_ymd_and_hms(2024, 1, 23, 12, 0, 0)
                .unwrap()
                .with_timezone(&Utc),
        )
    }

    #[test]
    fn test_status_report_for_regular_day() {
        let report = StatusReport::build(&san_jose_config(), &clock_at_la_noon()).unwrap();

        assert_eq!(report.timezone, "America/Los_Angeles");
        assert_eq!(report.current_level, SunlightLevel::Daylight);
        assert!(report.active);
        assert_eq!(report.changes.len(), 8);

        let reported: Vec<_> = report
            .changes
            .iter()
            .filter(|entry| entry.reported)
            .map(|entry| (entry.change.previous_level, entry.change.new_level))
            .collect();
        assert_eq!(
            reported,
            vec![
                (SunlightLevel::NauticalTwilight, SunlightLevel::CivilTwilight),
                (SunlightLevel::CivilTwilight, SunlightLevel::NauticalTwilight),
            ]
        );
    }

    #[test]
    fn test_status_report_json() {
        let report = StatusReport::build(&san_jose_config(), &clock_at_la_noon()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["current_level"], "daylight");
        assert_eq!(json["minimum_sunlight"], "civil-twilight");
        assert_eq!(json["active"], true);
        assert_eq!(json["changes"].as_array().unwrap().len(), 8);
        assert_eq!(json["changes"][0]["new_level"], "astronomical-twilight");
        assert_eq!(json["changes"][0]["reported"], false);
        assert!(json["location"]["latitude"].is_string());
    }

    #[test]
    fn test_status_report_requires_coordinates() {
        assert!(StatusReport::build(&Config::default(), &clock_at_la_noon()).is_err());
    }
}
