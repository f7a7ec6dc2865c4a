//! Configuration validation functionality.

use anyhow::Result;

use super::{Config, MAXIMUM_MAX_ITERATIONS, MINIMUM_MAX_ITERATIONS};

/// Check every field for a usable value.
pub fn validate_config(config: &Config) -> Result<()> {
    match config.latitude {
        None => anyhow::bail!("latitude is required (between -90 and 90 degrees)"),
        Some(lat) if !(-90.0..=90.0).contains(&lat) => {
            anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat)
        }
        Some(_) => {}
    }

    match config.longitude {
        None => anyhow::bail!("longitude is required (between -180 and 180 degrees)"),
        Some(lon) if !(-180.0..=180.0).contains(&lon) => {
            anyhow::bail!(
                "longitude must be between -180 and 180 degrees (got {})",
                lon
            )
        }
        Some(_) => {}
    }

    if let Some(zone) = config.timezone.as_deref() {
        crate::time::parse_timezone(zone)?;
    }

    if let Some(iterations) = config.max_iterations
        && !(MINIMUM_MAX_ITERATIONS..=MAXIMUM_MAX_ITERATIONS).contains(&iterations)
    {
        anyhow::bail!(
            "max_iterations ({}) must be between {} and {}",
            iterations,
            MINIMUM_MAX_ITERATIONS,
            MAXIMUM_MAX_ITERATIONS
        );
    }

    Ok(())
}
