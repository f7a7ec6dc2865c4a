//! Trigonometric functions.

use rust_decimal::Decimal;

use super::{DecimalMath, HALF, HALF_PI, MathError, PI, QUARTER_PI, Result, TWO_PI};

/// Subtracts whole multiples of 2π until `x` lies strictly inside (-2π, 2π).
fn reduce_to_period(x: Decimal) -> Decimal {
    let mut x = x;
    while x >= TWO_PI {
        x -= whole_turns(x) * TWO_PI;
    }
    while x <= -TWO_PI {
        x += whole_turns(x) * TWO_PI;
    }
    x
}

fn whole_turns(x: Decimal) -> Decimal {
    (x / TWO_PI).trunc().abs().max(Decimal::ONE)
}

/// Sign of `sin(x)`, read from the quadrant of the reduced angle.
fn sine_is_positive(x: Decimal) -> bool {
    let x = reduce_to_period(x);
    if x <= -PI {
        true
    } else if x <= Decimal::ZERO {
        false
    } else {
        x <= PI
    }
}

impl DecimalMath {
    pub fn cos(&self, x: Decimal) -> Decimal {
        let x = reduce_to_period(x);

        if x >= PI {
            return -self.cos(x - PI);
        }
        if x <= -PI {
            return -self.cos(x + PI);
        }

        // 1 - x²/2! + x⁴/4! - ...
        let squared = x * x;
        let mut term = -squared * HALF;
        let mut result = Decimal::ONE + term;
        for i in 1..self.max_iterations {
            let previous = result;
            let i = Decimal::from(i);
            let factor = -HALF / (i * (Decimal::TWO * i + Decimal::from(3)) + Decimal::ONE);
            term *= squared * factor;
            result += term;
            if previous == result {
                break;
            }
        }

        result
    }

    /// `sin(x)` as `±sqrt(1 - cos²(x))`, signed by quadrant.
    pub fn sin(&self, x: Decimal) -> Decimal {
        let cos = self.cos(x);
        self.sin_from_cos(x, cos)
    }

    /// Fails when `cos(x)` is exactly zero.
    pub fn tan(&self, x: Decimal) -> Result<Decimal> {
        let cos = self.cos(x);
        if cos.is_zero() {
            return Err(MathError::TanUndefined { value: x });
        }
        Ok(self.sin_from_cos(x, cos) / cos)
    }

    fn sin_from_cos(&self, x: Decimal, cos: Decimal) -> Decimal {
        // cos can round a hair past ±1.
        let remainder = (Decimal::ONE - cos * cos).max(Decimal::ZERO);
        let magnitude = self.sqrt(remainder).unwrap_or(Decimal::ZERO);
        if sine_is_positive(x) {
            magnitude
        } else {
            -magnitude
        }
    }

    /// Arcsine in radians. Fails for `|x| > 1`.
    pub fn asin(&self, x: Decimal) -> Result<Decimal> {
        if x > Decimal::ONE || x < Decimal::NEGATIVE_ONE {
            return Err(MathError::AsinOutOfRange { value: x });
        }
        if x.is_zero() {
            return Ok(Decimal::ZERO);
        }
        if x == Decimal::ONE {
            return Ok(HALF_PI);
        }
        if x < Decimal::ZERO {
            return Ok(-self.asin(-x)?);
        }

        // asin(x) = (π/2 - asin(1 - 2x²)) / 2 moves the argument closer to zero.
        let folded = Decimal::ONE - Decimal::TWO * x * x;
        if x > folded.abs() {
            return Ok(HALF * (HALF_PI - self.asin(folded)?));
        }

        let squared = x * x;
        let mut term = x;
        let mut result = x;
        for i in 1..=self.max_iterations {
            let previous = term;
            let i = Decimal::from(i);
            term *= squared * (Decimal::ONE - HALF / i);
            result += term / (Decimal::TWO * i + Decimal::ONE);
            if previous == term {
                break;
            }
        }

        Ok(result)
    }

    /// Arccosine in radians. Out-of-range input fails through [`asin`](Self::asin).
    pub fn acos(&self, x: Decimal) -> Result<Decimal> {
        if x.is_zero() {
            return Ok(HALF_PI);
        }
        if x == Decimal::ONE {
            return Ok(Decimal::ZERO);
        }
        if x < Decimal::ZERO {
            return Ok(PI - self.acos(-x)?);
        }
        Ok(HALF_PI - self.asin(x)?)
    }

    pub fn atan(&self, x: Decimal) -> Result<Decimal> {
        if x.is_zero() {
            return Ok(Decimal::ZERO);
        }
        if x == Decimal::ONE {
            return Ok(QUARTER_PI);
        }

        let Some(squared) = x.checked_mul(x) else {
            // atan(x) = ±π/2 - atan(1/x) once x² no longer fits.
            let sign = if x > Decimal::ZERO { HALF_PI } else { -HALF_PI };
            return Ok(sign - self.atan(Decimal::ONE / x)?);
        };

        let ratio = x / self.sqrt(Decimal::ONE + squared)?;
        self.asin(ratio.clamp(Decimal::NEGATIVE_ONE, Decimal::ONE))
    }

    /// Four-quadrant arctangent of `y / x`. `(0, 0)` is undefined.
    pub fn atan2(&self, y: Decimal, x: Decimal) -> Result<Decimal> {
        if x.is_zero() {
            return match y.cmp(&Decimal::ZERO) {
                std::cmp::Ordering::Greater => Ok(HALF_PI),
                std::cmp::Ordering::Less => Ok(-HALF_PI),
                std::cmp::Ordering::Equal => Err(MathError::Atan2Undefined),
            };
        }

        let ratio = y.checked_div(x).ok_or(MathError::Overflow {
            operation: "atan2",
        })?;
        let angle = self.atan(ratio)?;

        if x > Decimal::ZERO {
            Ok(angle)
        } else if y >= Decimal::ZERO {
            Ok(angle + PI)
        } else {
            Ok(angle - PI)
        }
    }
}
