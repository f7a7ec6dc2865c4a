//! Discrete sunlight levels and the transitions between them.
//!
//! A solar elevation maps onto one of five ordered [`SunlightLevel`]s using the standard
//! twilight thresholds (0°, -6°, -12°, -18°, each an inclusive lower bound). The
//! [`scan`] submodule walks a calendar day minute by minute to find every level change.

pub mod scan;


pub use scan::{DailyTransitions, ElevationSample, current_sunlight, daily_transitions, start_of_day};

use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How bright it is outside, from darkest to brightest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum SunlightLevel {
    /// Sun more than 18° below the horizon.
    Night,
    AstronomicalTwilight,
    NauticalTwilight,
    #[default]
    CivilTwilight,
    /// Sun at or above the horizon.
    Daylight,
}

impl SunlightLevel {
    /// Every level, darkest first.
    pub const ALL: [SunlightLevel; 5] = [
        Self::Night,
        Self::AstronomicalTwilight,
        Self::NauticalTwilight,
        Self::CivilTwilight,
        Self::Daylight,
    ];

    /// Level for a solar elevation in degrees.
    pub fn classify(elevation: Decimal) -> Self {
        if elevation >= Decimal::ZERO {
            Self::Daylight
        } else if elevation >= dec!(-6) {
            Self::CivilTwilight
        } else if elevation >= dec!(-12) {
            Self::NauticalTwilight
        } else if elevation >= dec!(-18) {
            Self::AstronomicalTwilight
        } else {
            Self::Night
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::AstronomicalTwilight => "astronomical twilight",
            Self::NauticalTwilight => "nautical twilight",
            Self::CivilTwilight => "civil twilight",
            Self::Daylight => "daylight",
        }
    }

    /// Name used in the configuration file.
    pub fn config_name(&self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::AstronomicalTwilight => "astronomical-twilight",
            Self::NauticalTwilight => "nautical-twilight",
            Self::CivilTwilight => "civil-twilight",
            Self::Daylight => "daylight",
        }
    }

    /// Time of day at which this level begins, while the sun is rising or setting.
    ///
    /// Night never begins while rising and daylight never begins while setting.
    pub fn start(&self, rising: bool) -> Option<SolarTimeOfDay> {
        use SolarTimeOfDay::*;
        match (self, rising) {
            (Self::AstronomicalTwilight, true) => Some(AstronomicalDawn),
            (Self::NauticalTwilight, true) => Some(NauticalDawn),
            (Self::CivilTwilight, true) => Some(CivilDawn),
            (Self::Daylight, true) => Some(Sunrise),
            (Self::CivilTwilight, false) => Some(Sunset),
            (Self::NauticalTwilight, false) => Some(CivilDusk),
            (Self::AstronomicalTwilight, false) => Some(NauticalDusk),
            (Self::Night, false) => Some(AstronomicalDusk),
            (Self::Night, true) | (Self::Daylight, false) => None,
        }
    }

    /// Time of day at which this level ends, while the sun is rising or setting.
    pub fn end(&self, rising: bool) -> Option<SolarTimeOfDay> {
        use SolarTimeOfDay::*;
        match (self, rising) {
            (Self::Night, true) => Some(AstronomicalDawn),
            (Self::AstronomicalTwilight, true) => Some(NauticalDawn),
            (Self::NauticalTwilight, true) => Some(CivilDawn),
            (Self::CivilTwilight, true) => Some(Sunrise),
            (Self::Daylight, false) => Some(Sunset),
            (Self::CivilTwilight, false) => Some(CivilDusk),
            (Self::NauticalTwilight, false) => Some(NauticalDusk),
            (Self::AstronomicalTwilight, false) => Some(AstronomicalDusk),
            (Self::Daylight, true) | (Self::Night, false) => None,
        }
    }

    /// True when `other` is the next brighter or next darker level.
    pub fn is_adjacent_to(&self, other: SunlightLevel) -> bool {
        (*self as i8 - other as i8).abs() == 1
    }
}

impl fmt::Display for SunlightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SunlightLevel {
    type Err = anyhow::Error;

    /// Accepts the configuration name or the display name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| wanted == level.config_name() || wanted == level.display_name())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown sunlight level '{s}'. Expected one of: {}",
                    Self::ALL.map(|level| level.config_name()).join(", ")
                )
            })
    }
}

/// Named instants at which the sunlight level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolarTimeOfDay {
    AstronomicalDawn,
    NauticalDawn,
    CivilDawn,
    Sunrise,
    Sunset,
    CivilDusk,
    NauticalDusk,
    AstronomicalDusk,
}

impl SolarTimeOfDay {
    /// Name of the change from `previous` to `new`, or `None` unless the levels are adjacent.
    pub fn between(previous: SunlightLevel, new: SunlightLevel) -> Option<Self> {
        if !previous.is_adjacent_to(new) {
            return None;
        }
        if new > previous {
            new.start(true)
        } else {
            previous.end(false)
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AstronomicalDawn => "astronomical dawn",
            Self::NauticalDawn => "nautical dawn",
            Self::CivilDawn => "civil dawn",
            Self::Sunrise => "sunrise",
            Self::Sunset => "sunset",
            Self::CivilDusk => "civil dusk",
            Self::NauticalDusk => "nautical dusk",
            Self::AstronomicalDusk => "astronomical dusk",
        }
    }
}

impl fmt::Display for SolarTimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One level change found by the daily scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SunlightChange {
    /// First sampled instant at the new level.
    pub time: DateTime<Tz>,
    pub previous_level: SunlightLevel,
    pub new_level: SunlightLevel,
    pub is_rising: bool,
    /// Elevation in degrees at `time`.
    pub solar_elevation: Decimal,
}

impl SunlightChange {
    pub fn name(&self) -> Option<SolarTimeOfDay> {
        SolarTimeOfDay::between(self.previous_level, self.new_level)
    }

    /// Whether this change crosses the boundary of `minimum`: rising into it, or setting out of it.
    pub fn crosses(&self, minimum: SunlightLevel) -> bool {
        if self.is_rising {
            self.new_level == minimum
        } else {
            self.previous_level == minimum
        }
    }
}

impl fmt::Display for SunlightChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .name()
            .map(|name| name.display_name())
            .unwrap_or("sunlight change");
        write!(
            f,
            "{name} at {} ({} → {}, {:.2}°)",
            self.time.format("%Y-%m-%d %H:%M:%S %Z"),
            self.previous_level,
            self.new_level,
            self.solar_elevation
        )
    }
}
