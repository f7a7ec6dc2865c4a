//! Exponential, logarithmic, power and root functions.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use super::{DecimalMath, E, E_INVERSE, EPSILON, HALF, LOG10_E, MathError, Result};

fn overflow(operation: &'static str) -> MathError {
    MathError::Overflow { operation }
}

fn is_integer(value: Decimal) -> bool {
    (value - value.round()).abs() <= EPSILON
}

impl DecimalMath {
    /// `e^x`.
    ///
    /// The integer part is applied through [`power_n`](Self::power_n) and only the
    /// fractional part in `[0, 1]` goes through the Taylor series.
    pub fn exp(&self, x: Decimal) -> Result<Decimal> {
        let mut x = x;
        let mut count: i64 = 0;

        if x > Decimal::ONE {
            let whole = x.trunc();
            count = whole.to_i64().ok_or_else(|| overflow("exp"))?;
            x -= whole;
        }

        if x < Decimal::ZERO {
            let whole = x.trunc();
            count = (whole - Decimal::ONE)
                .to_i64()
                .ok_or_else(|| overflow("exp"))?;
            x = Decimal::ONE + (x - whole);
        }

        let mut result = Decimal::ONE;
        let mut term = Decimal::ONE;
        for iteration in 1..=self.max_iterations {
            let previous = result;
            term *= x / Decimal::from(iteration);
            result += term;
            if previous == result {
                break;
            }
        }

        if count == 0 {
            return Ok(result);
        }

        result
            .checked_mul(self.power_n(E, count)?)
            .ok_or_else(|| overflow("exp"))
    }

    /// Natural logarithm. Fails for `x <= 0`.
    pub fn log(&self, x: Decimal) -> Result<Decimal> {
        if x <= Decimal::ZERO {
            return Err(MathError::LogOfNonPositive { value: x });
        }
        if x == Decimal::ONE {
            return Ok(Decimal::ZERO);
        }

        let mut x = x;
        let mut count: i64 = 0;
        while x >= Decimal::ONE {
            x *= E_INVERSE;
            count += 1;
        }
        while x <= E_INVERSE {
            x *= E;
            count -= 1;
        }

        x -= Decimal::ONE;
        if x.is_zero() {
            return Ok(Decimal::from(count));
        }

        // ln(1 + u) = u - u²/2 + u³/3 - ...
        let mut result = Decimal::ZERO;
        let mut power = Decimal::ONE;
        for iteration in 1..=self.max_iterations {
            let previous = result;
            power *= -x;
            result += power / Decimal::from(iteration);
            if previous == result {
                break;
            }
        }

        Ok(Decimal::from(count) - result)
    }

    /// Base-10 logarithm.
    pub fn log10(&self, x: Decimal) -> Result<Decimal> {
        Ok(self.log(x)? * LOG10_E)
    }

    /// `base^exponent` for an arbitrary decimal exponent.
    pub fn power(&self, base: Decimal, exponent: Decimal) -> Result<Decimal> {
        if exponent.is_zero() {
            return Ok(Decimal::ONE);
        }
        if exponent == Decimal::ONE {
            return Ok(base);
        }
        if base == Decimal::ONE {
            return Ok(Decimal::ONE);
        }

        if base.is_zero() {
            if exponent > Decimal::ZERO {
                return Ok(Decimal::ZERO);
            }
            return Err(MathError::ZeroBaseNonPositivePower { exponent });
        }

        if exponent == Decimal::NEGATIVE_ONE {
            return Decimal::ONE
                .checked_div(base)
                .ok_or_else(|| overflow("power"));
        }

        let integral = is_integer(exponent);
        if base < Decimal::ZERO && !integral {
            return Err(MathError::NegativeBaseFractionalPower { base, exponent });
        }

        if integral {
            let n = exponent
                .round()
                .to_i64()
                .ok_or_else(|| overflow("power"))?;

            if base > Decimal::ZERO {
                return self.power_n(base, n);
            }

            let scaled = exponent
                .checked_mul(self.log(-base)?)
                .ok_or_else(|| overflow("power"))?;
            let magnitude = self.exp(scaled)?;
            return Ok(if n % 2 == 0 { magnitude } else { -magnitude });
        }

        let scaled = exponent
            .checked_mul(self.log(base)?)
            .ok_or_else(|| overflow("power"))?;
        self.exp(scaled)
    }

    /// `value^n` by repeated squaring. A negative `n` inverts the base first.
    pub fn power_n(&self, value: Decimal, n: i64) -> Result<Decimal> {
        if n == 0 {
            return Ok(Decimal::ONE);
        }

        let mut current = value;
        if n < 0 {
            if value.is_zero() {
                return Err(MathError::ZeroBaseNonPositivePower {
                    exponent: Decimal::from(n),
                });
            }
            current = Decimal::ONE
                .checked_div(value)
                .ok_or_else(|| overflow("power_n"))?;
        }

        let mut remaining = n.unsigned_abs();
        let mut product = Decimal::ONE;
        while remaining > 0 {
            if remaining & 1 == 1 {
                product = product
                    .checked_mul(current)
                    .ok_or_else(|| overflow("power_n"))?;
            }
            remaining >>= 1;
            if remaining > 0 {
                current = current
                    .checked_mul(current)
                    .ok_or_else(|| overflow("power_n"))?;
            }
        }

        Ok(product)
    }

    /// Square root iterated to an exact fixed point.
    pub fn sqrt(&self, x: Decimal) -> Result<Decimal> {
        self.sqrt_with_epsilon(x, Decimal::ZERO)
    }

    /// Newton square root, stopping once successive estimates differ by at most `epsilon`.
    ///
    /// The first estimate comes from `f64::sqrt`; everything after it is decimal.
    pub fn sqrt_with_epsilon(&self, x: Decimal, epsilon: Decimal) -> Result<Decimal> {
        if x < Decimal::ZERO {
            return Err(MathError::SqrtOfNegative { value: x });
        }
        if x.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let mut current = x
            .to_f64()
            .map(f64::sqrt)
            .and_then(Decimal::from_f64)
            .filter(|seed| !seed.is_zero())
            .unwrap_or(x);

        // Rounding can leave Newton bouncing between two neighbours in the last digit.
        let mut before_previous = None;
        for _ in 0..self.max_iterations {
            let previous = current;
            current = (previous + x / previous) * HALF;
            if (previous - current).abs() <= epsilon || before_previous == Some(current) {
                break;
            }
            before_previous = Some(previous);
        }

        Ok(current)
    }

    pub fn sinh(&self, x: Decimal) -> Result<Decimal> {
        let (y, inverse) = self.exp_pair(x)?;
        Ok((y - inverse) * HALF)
    }

    pub fn cosh(&self, x: Decimal) -> Result<Decimal> {
        let (y, inverse) = self.exp_pair(x)?;
        Ok((y + inverse) * HALF)
    }

    pub fn tanh(&self, x: Decimal) -> Result<Decimal> {
        let (y, inverse) = self.exp_pair(x)?;
        Ok((y - inverse) / (y + inverse))
    }

    fn exp_pair(&self, x: Decimal) -> Result<(Decimal, Decimal)> {
        let y = self.exp(x)?;
        let inverse = Decimal::ONE
            .checked_div(y)
            .ok_or_else(|| overflow("exp"))?;
        Ok((y, inverse))
    }
}
