//! Solar position from a zoned timestamp and a geographic coordinate.
//!
//! This is the NOAA solar position algorithm evaluated entirely in decimal arithmetic through
//! [`DecimalMath`]. All angles exchanged with callers are in degrees: elevation in [-90, 90]
//! (corrected for atmospheric refraction) and azimuth in [0, 360), measured clockwise from north.

mod location;


pub use location::Location;

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::math::{DecimalMath, MathError, deg_to_rad, rad_to_deg};

/// Elevation and azimuth of the sun, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolarPosition {
    pub elevation: Decimal,
    pub azimuth: Decimal,
}

/// Time and place of one query, reduced to the quantities the algorithm needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAndPlace {
    /// Julian centuries since J2000.0.
    pub julian_century: Decimal,
    /// Local wall-clock minutes since midnight.
    pub local_minutes: Decimal,
    /// UTC offset in hours.
    pub offset_hours: Decimal,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl TimeAndPlace {
    pub fn new<Z: TimeZone>(time: &DateTime<Z>, location: &Location) -> Self {
        let seconds = Decimal::from(time.second())
            + Decimal::from(time.nanosecond()) / dec!(1000000000);
        let local_minutes =
            Decimal::from(time.hour() * 60 + time.minute()) + seconds / dec!(60);
        let offset_hours =
            Decimal::from(time.offset().fix().local_minus_utc()) / dec!(3600);

        let julian_day = julian_day(time.year(), time.month(), time.day());
        let julian_century =
            julian_century(julian_day + local_minutes / dec!(1440) - offset_hours / dec!(24));

        Self {
            julian_century,
            local_minutes,
            offset_hours,
            latitude: location.latitude(),
            longitude: location.longitude(),
        }
    }
}

/// Julian day number at midnight of a Gregorian calendar date.
pub fn julian_day(year: i32, month: u32, day: u32) -> Decimal {
    let (year, month) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let year = Decimal::from(year);
    let month = Decimal::from(month);

    let century = (year / dec!(100)).floor();
    (dec!(365.25) * (year + dec!(4716))).floor()
        + (dec!(30.6001) * (month + Decimal::ONE)).floor()
        + Decimal::from(day)
        + (Decimal::TWO - century)
        + (century / dec!(4)).floor()
        - dec!(1524.5)
}

fn julian_century(julian_day: Decimal) -> Decimal {
    (julian_day - dec!(2451545)) / dec!(36525)
}

/// Zenith angle together with the intermediate values the azimuth needs.
struct Zenith {
    zenith: Decimal,
    latitude_rad: Decimal,
    declination_rad: Decimal,
    hour_angle: Decimal,
}

/// NOAA solar position calculator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolarCalculator {
    math: DecimalMath,
}

impl SolarCalculator {
    pub fn new(math: DecimalMath) -> Self {
        Self { math }
    }

    pub fn math(&self) -> &DecimalMath {
        &self.math
    }

    /// Solar elevation in degrees, corrected for refraction.
    pub fn elevation<Z: TimeZone>(
        &self,
        time: &DateTime<Z>,
        location: &Location,
    ) -> Result<Decimal, MathError> {
        let zenith = self.zenith(&TimeAndPlace::new(time, location))?;
        self.elevation_from_zenith(zenith.zenith)
    }

    /// Solar azimuth in degrees clockwise from north.
    pub fn azimuth<Z: TimeZone>(
        &self,
        time: &DateTime<Z>,
        location: &Location,
    ) -> Result<Decimal, MathError> {
        let zenith = self.zenith(&TimeAndPlace::new(time, location))?;
        self.azimuth_from_zenith(&zenith)
    }

    /// Both angles from a single evaluation of the common terms.
    pub fn elevation_and_azimuth<Z: TimeZone>(
        &self,
        time: &DateTime<Z>,
        location: &Location,
    ) -> Result<SolarPosition, MathError> {
        let zenith = self.zenith(&TimeAndPlace::new(time, location))?;
        Ok(SolarPosition {
            elevation: self.elevation_from_zenith(zenith.zenith)?,
            azimuth: self.azimuth_from_zenith(&zenith)?,
        })
    }

    fn zenith(&self, at: &TimeAndPlace) -> Result<Zenith, MathError> {
        let m = &self.math;
        let t = at.julian_century;

        let latitude_rad = deg_to_rad(at.latitude);
        let declination_rad = deg_to_rad(self.declination(t)?);

        let mut true_solar_time = at.local_minutes
            + (self.equation_of_time(t)? + dec!(4) * at.longitude - dec!(60) * at.offset_hours);
        while true_solar_time > dec!(1440) {
            true_solar_time -= dec!(1440);
        }

        let mut hour_angle = true_solar_time / dec!(4) - dec!(180);
        if hour_angle < dec!(-180) {
            hour_angle += dec!(360);
        }

        let cos_zenith = m.sin(latitude_rad) * m.sin(declination_rad)
            + m.cos(latitude_rad) * m.cos(declination_rad) * m.cos(deg_to_rad(hour_angle));
        let cos_zenith = cos_zenith.clamp(Decimal::NEGATIVE_ONE, Decimal::ONE);

        Ok(Zenith {
            zenith: rad_to_deg(m.acos(cos_zenith)?),
            latitude_rad,
            declination_rad,
            hour_angle,
        })
    }

    fn elevation_from_zenith(&self, zenith: Decimal) -> Result<Decimal, MathError> {
        Ok(dec!(90) - (zenith - self.refraction(dec!(90) - zenith)?))
    }

    fn azimuth_from_zenith(&self, z: &Zenith) -> Result<Decimal, MathError> {
        let m = &self.math;
        let zenith_rad = deg_to_rad(z.zenith);
        let denominator = m.cos(z.latitude_rad) * m.sin(zenith_rad);

        let mut azimuth = if denominator.abs() > dec!(0.001) {
            let ratio = (m.sin(z.latitude_rad) * m.cos(zenith_rad) - m.sin(z.declination_rad))
                / denominator;
            let ratio = ratio.clamp(Decimal::NEGATIVE_ONE, Decimal::ONE);
            let azimuth = dec!(180) - rad_to_deg(m.acos(ratio)?);
            if z.hour_angle > Decimal::ZERO {
                -azimuth
            } else {
                azimuth
            }
        } else if rad_to_deg(z.latitude_rad) > Decimal::ZERO {
            dec!(180)
        } else {
            Decimal::ZERO
        };

        if azimuth < Decimal::ZERO {
            azimuth += dec!(360);
        }
        Ok(azimuth)
    }

    /// Atmospheric refraction correction in degrees for an uncorrected elevation.
    fn refraction(&self, elevation: Decimal) -> Result<Decimal, MathError> {
        if elevation > dec!(85) {
            return Ok(Decimal::ZERO);
        }

        let te = self.math.tan(deg_to_rad(elevation))?;
        let arcseconds = if elevation > dec!(5) {
            dec!(58.1) / te - dec!(0.07) / (te * te * te) + dec!(0.000086) / (te * te * te * te * te)
        } else if elevation > dec!(-0.575) {
            dec!(1735)
                + elevation
                    * (dec!(-518.2)
                        + elevation
                            * (dec!(103.4) + elevation * (dec!(-12.79) + elevation * dec!(0.711))))
        } else {
            dec!(-20.774) / te
        };

        Ok(arcseconds / dec!(3600))
    }

    fn declination(&self, t: Decimal) -> Result<Decimal, MathError> {
        let m = &self.math;
        let omega = omega_rad(t);
        let sine = m.sin(deg_to_rad(self.obliquity_correction(t, omega)))
            * m.sin(deg_to_rad(self.apparent_longitude(t, omega)));
        Ok(rad_to_deg(m.asin(sine)?))
    }

    /// Equation of time in minutes.
    fn equation_of_time(&self, t: Decimal) -> Result<Decimal, MathError> {
        let m = &self.math;
        let l0 = deg_to_rad(geometric_mean_longitude(t));
        let e = eccentricity(t);
        let anomaly = deg_to_rad(geometric_mean_anomaly(t));
        let sin_anomaly = m.sin(anomaly);

        let mut y = m.tan(deg_to_rad(self.obliquity_correction(t, omega_rad(t))) / Decimal::TWO)?;
        y *= y;

        let radians = y * m.sin(Decimal::TWO * l0) - Decimal::TWO * e * sin_anomaly
            + dec!(4) * e * y * sin_anomaly * m.cos(Decimal::TWO * l0)
            - dec!(0.5) * y * y * m.sin(dec!(4) * l0)
            - dec!(1.25) * e * e * m.sin(Decimal::TWO * anomaly);

        Ok(rad_to_deg(radians) * dec!(4))
    }

    fn equation_of_center(&self, t: Decimal) -> Decimal {
        let m = &self.math;
        let anomaly = deg_to_rad(geometric_mean_anomaly(t));
        m.sin(anomaly) * (dec!(1.914602) - t * (dec!(0.004817) + dec!(0.000014) * t))
            + m.sin(anomaly + anomaly) * (dec!(0.019993) - dec!(0.000101) * t)
            + m.sin(anomaly + anomaly + anomaly) * dec!(0.000289)
    }

    fn apparent_longitude(&self, t: Decimal, omega: Decimal) -> Decimal {
        let true_longitude = geometric_mean_longitude(t) + self.equation_of_center(t);
        true_longitude - dec!(0.00569) - dec!(0.00478) * self.math.sin(omega)
    }

    fn obliquity_correction(&self, t: Decimal, omega: Decimal) -> Decimal {
        mean_obliquity(t) + dec!(0.00256) * self.math.cos(omega)
    }
}

/// Longitude of the moon's ascending node, in radians.
fn omega_rad(t: Decimal) -> Decimal {
    deg_to_rad(dec!(125.04) - dec!(1934.136) * t)
}

fn geometric_mean_longitude(t: Decimal) -> Decimal {
    let mut l0 = dec!(280.46646) + t * (dec!(36000.76983) + t * dec!(0.0003032));
    while l0 > dec!(360) {
        l0 -= dec!(360);
    }
    while l0 < Decimal::ZERO {
        l0 += dec!(360);
    }
    l0
}

fn geometric_mean_anomaly(t: Decimal) -> Decimal {
    dec!(357.52911) + t * (dec!(35999.05029) - dec!(0.0001537) * t)
}

fn eccentricity(t: Decimal) -> Decimal {
    dec!(0.016708634) - t * (dec!(0.000042037) + dec!(0.0000001267) * t)
}

fn mean_obliquity(t: Decimal) -> Decimal {
    dec!(23)
        + (dec!(26)
            + (dec!(21.448) - t * (dec!(46.8150) + t * (dec!(0.00059) - t * dec!(0.001813))))
                / dec!(60))
            / dec!(60)
}
