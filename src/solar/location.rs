//! Geographic coordinates in exact decimal degrees.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::fmt;

/// A validated latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    latitude: Decimal,
    longitude: Decimal,
}

impl Location {
    /// Create a location from decimal degrees.
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self> {
        if !(dec!(-90)..=dec!(90)).contains(&latitude) {
            anyhow::bail!("Latitude must be between -90 and 90 degrees (got {latitude})");
        }
        if !(dec!(-180)..=dec!(180)).contains(&longitude) {
            anyhow::bail!("Longitude must be between -180 and 180 degrees (got {longitude})");
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a location from floating-point degrees, as read from configuration.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self> {
        let latitude = Decimal::try_from(latitude)
            .with_context(|| format!("Latitude {latitude} is not a finite number"))?;
        let longitude = Decimal::try_from(longitude)
            .with_context(|| format!("Longitude {longitude} is not a finite number"))?;
        Self::new(latitude, longitude)
    }

    pub fn latitude(&self) -> Decimal {
        self.latitude
    }

    pub fn longitude(&self) -> Decimal {
        self.longitude
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= Decimal::ZERO { 'N' } else { 'S' };
        let ew = if self.longitude >= Decimal::ZERO { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{ns}, {:.4}°{ew}",
            self.latitude.abs(),
            self.longitude.abs()
        )
    }
}
