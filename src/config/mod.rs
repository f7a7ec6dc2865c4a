//! Configuration management for daybreak.
//!
//! Settings are read from `daybreak.toml` in the XDG config directory
//! (`~/.config/daybreak/daybreak.toml`), or from the directory given with `--config`.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Location]
//! latitude = 37.35                     # Geographic latitude (-90 to 90)
//! longitude = -121.95                  # Geographic longitude (-180 to 180)
//! timezone = "America/Los_Angeles"     # IANA zone, defaults to the system zone
//!
//! #[Events]
//! minimum_sunlight = "civil-twilight"  # Level whose crossings are reported
//!
//! #[Precision]
//! max_iterations = 100                 # Series iteration ceiling (10-10000)
//! ```
//!
//! ## Defaults
//!
//! A missing file is created with the coordinates commented out, and loading fails until the
//! user fills them in. Every other field is optional.

pub mod builder;
pub mod loading;
pub mod validation;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;

use crate::math::DecimalMath;
use crate::solar::{Location, SolarCalculator};
use crate::sunlight::SunlightLevel;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Default series iteration ceiling.
pub const DEFAULT_MAX_ITERATIONS: usize = crate::math::DEFAULT_MAX_ITERATIONS;
pub const MINIMUM_MAX_ITERATIONS: usize = 10;
pub const MAXIMUM_MAX_ITERATIONS: usize = 10_000;

/// Settings loaded from `daybreak.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Geographic latitude in degrees (-90 to +90). Required.
    pub latitude: Option<f64>,
    /// Geographic longitude in degrees (-180 to +180). Required.
    pub longitude: Option<f64>,
    /// IANA time zone name. Falls back to the system zone.
    pub timezone: Option<String>,
    /// Level whose crossings the scheduler reports (default civil twilight).
    pub minimum_sunlight: Option<SunlightLevel>,
    /// Iteration ceiling for the decimal series expansions.
    pub max_iterations: Option<usize>,
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    /// Get configuration path using the module's get_config_path function
    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    /// Observer location. Fails when a coordinate is missing or out of range.
    pub fn location(&self) -> Result<Location> {
        let latitude = self
            .latitude
            .context("latitude is not configured")?;
        let longitude = self
            .longitude
            .context("longitude is not configured")?;
        Location::from_degrees(latitude, longitude)
    }

    /// Configured zone, or the system zone when none is set.
    pub fn timezone(&self) -> Result<Tz> {
        crate::time::resolve_timezone(self.timezone.as_deref())
    }

    pub fn minimum_sunlight(&self) -> SunlightLevel {
        self.minimum_sunlight.unwrap_or_default()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }

    /// Solar calculator using the configured iteration ceiling.
    pub fn calculator(&self) -> SolarCalculator {
        SolarCalculator::new(DecimalMath::with_max_iterations(self.max_iterations()))
    }

    pub fn log_config(&self) {
        let source = match get_custom_config_dir() {
            Some(_) => "custom configuration",
            None => "default configuration",
        };
        log_block_start!("Loaded {}", source);

        if let (Some(lat), Some(lon)) = (self.latitude, self.longitude) {
            let lat_dir = if lat >= 0.0 { "N" } else { "S" };
            let lon_dir = if lon >= 0.0 { "E" } else { "W" };
            log_indented!(
                "Location: {:.3}°{}, {:.3}°{}",
                lat.abs(),
                lat_dir,
                lon.abs(),
                lon_dir
            );
        }

        match &self.timezone {
            Some(zone) => log_indented!("Time zone: {}", zone),
            None => log_indented!("Time zone: system default"),
        }
        log_indented!("Minimum sunlight: {}", self.minimum_sunlight());

        if self.max_iterations.is_some() {
            log_indented!("Series iterations: {}", self.max_iterations());
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timezone: None,
            minimum_sunlight: Some(SunlightLevel::default()),
            max_iterations: None,
        }
    }
}
