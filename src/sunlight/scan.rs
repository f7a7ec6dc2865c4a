//! Minute-by-minute scan of one calendar day.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{SunlightChange, SunlightLevel};
use crate::math::MathError;
use crate::solar::{Location, SolarCalculator};

/// Sampling interval of the daily scan.
pub const SCAN_STEP: TimeDelta = TimeDelta::minutes(1);

/// Solar elevation observed at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevationSample {
    pub time: DateTime<Tz>,
    pub elevation: Decimal,
}

impl ElevationSample {
    pub fn level(&self) -> SunlightLevel {
        SunlightLevel::classify(self.elevation)
    }
}

/// Result of scanning one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTransitions {
    /// Changes in chronological order. Empty for a day without any.
    pub changes: Vec<SunlightChange>,
    /// Last sample taken, used to seed the following day.
    pub last_sample: ElevationSample,
}

/// Current sunlight level at `time`.
pub fn current_sunlight(
    calculator: &SolarCalculator,
    time: &DateTime<Tz>,
    location: &Location,
) -> Result<SunlightLevel, MathError> {
    Ok(SunlightLevel::classify(
        calculator.elevation(time, location)?,
    ))
}

/// First existing local instant of `date` in `zone`.
///
/// Usually local midnight; on days where midnight falls into a DST gap, the first minute after
/// the gap.
pub fn start_of_day(date: NaiveDate, zone: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    let mut local = midnight;
    while local.date() == date {
        if let Some(start) = zone.from_local_datetime(&local).earliest() {
            return start;
        }
        local += SCAN_STEP;
    }
    zone.from_utc_datetime(&midnight)
}

/// Every sunlight level change during `date` in `zone`, sampled once per minute.
///
/// Without a seed, the first sample at the start of the day fixes the initial level and scanning
/// begins one minute later. With a seed, scanning begins one minute after the seed (but never
/// before the start of the day) and the seed's level is the initial level, so no change is ever
/// reported earlier than the seed.
pub fn daily_transitions(
    calculator: &SolarCalculator,
    date: NaiveDate,
    zone: Tz,
    location: &Location,
    seed: Option<ElevationSample>,
) -> Result<DailyTransitions, MathError> {
    let day_start = start_of_day(date, &zone);

    let (mut previous, mut time) = match seed {
        Some(seed) => {
            let seed = ElevationSample {
                time: seed.time.with_timezone(&zone),
                elevation: seed.elevation,
            };
            let next = (seed.time + SCAN_STEP).max(day_start);
            (seed, next)
        }
        None => {
            let elevation = calculator.elevation(&day_start, location)?;
            let next = day_start + SCAN_STEP;
            (
                ElevationSample {
                    time: day_start,
                    elevation,
                },
                next,
            )
        }
    };

    let mut level = previous.level();
    let mut changes = Vec::new();

    while time.date_naive() == date {
        let elevation = calculator.elevation(&time, location)?;
        let current = SunlightLevel::classify(elevation);

        if current != level {
            debug_assert!(
                level.is_adjacent_to(current),
                "skipped a level between {level} and {current} at {time}"
            );
            changes.push(SunlightChange {
                time,
                previous_level: level,
                new_level: current,
                is_rising: previous.elevation < elevation,
                solar_elevation: elevation,
            });
            level = current;
        }

        previous = ElevationSample { time, elevation };
        time += SCAN_STEP;
    }

    Ok(DailyTransitions {
        changes,
        last_sample: previous,
    })
}
