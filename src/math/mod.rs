//! Fixed-precision decimal math kernel.
//!
//! Every function in this module works on [`Decimal`] values using only decimal
//! arithmetic (add, subtract, multiply, divide, truncate). The single exception is the
//! initial estimate of the square-root iteration, which is seeded from `f64::sqrt`.
//!
//! Series expansions stop when two successive partial sums are identical or when the
//! iteration ceiling is reached. Hitting the ceiling is not an error: the current partial
//! sum is returned as the best available approximation. The ceiling defaults to
//! [`DEFAULT_MAX_ITERATIONS`] and can be changed with [`DecimalMath::with_max_iterations`].
//!
//! Inputs outside a function's mathematical domain fail with a [`MathError`]. They are
//! never clamped.

mod series;
mod trig;


use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::fmt;

/// π
pub const PI: Decimal = dec!(3.1415926535897932384626433833);

/// 2π
pub const TWO_PI: Decimal = dec!(6.2831853071795864769252867666);

/// π/2
pub const HALF_PI: Decimal = dec!(1.5707963267948966192313216916);

/// π/4
pub const QUARTER_PI: Decimal = dec!(0.7853981633974483096156608458);

/// Euler's number.
pub const E: Decimal = dec!(2.7182818284590452353602874714);

/// 1/e
pub const E_INVERSE: Decimal = dec!(0.3678794411714423215955237702);

/// log10(e), used to derive base-10 logarithms from natural ones.
pub const LOG10_E: Decimal = dec!(0.4342944819032518276511289189);

/// Tolerance used to decide whether an exponent is an integer.
pub const EPSILON: Decimal = dec!(0.0000000000000000001);

/// Default iteration ceiling for every series and Newton loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

const HALF: Decimal = dec!(0.5);

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, MathError>;

/// Domain and range errors raised by the kernel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// `log(x)` with `x <= 0`.
    LogOfNonPositive { value: Decimal },
    /// `asin(x)` or `acos(x)` with `|x| > 1`.
    AsinOutOfRange { value: Decimal },
    /// `sqrt(x)` with `x < 0`.
    SqrtOfNegative { value: Decimal },
    /// `0^p` with `p <= 0`.
    ZeroBaseNonPositivePower { exponent: Decimal },
    /// `b^p` with `b < 0` and a fractional `p`.
    NegativeBaseFractionalPower { base: Decimal, exponent: Decimal },
    /// `tan(x)` where `cos(x)` is exactly zero.
    TanUndefined { value: Decimal },
    /// `atan2(0, 0)`.
    Atan2Undefined,
    /// An intermediate result does not fit in a 96-bit decimal.
    Overflow { operation: &'static str },
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LogOfNonPositive { value } => {
                write!(f, "logarithm of non-positive value {value}")
            }
            Self::AsinOutOfRange { value } => {
                write!(f, "arcsine argument {value} is outside [-1, 1]")
            }
            Self::SqrtOfNegative { value } => {
                write!(f, "square root of negative value {value}")
            }
            Self::ZeroBaseNonPositivePower { exponent } => {
                write!(f, "zero raised to non-positive power {exponent}")
            }
            Self::NegativeBaseFractionalPower { base, exponent } => {
                write!(f, "negative base {base} raised to non-integer power {exponent}")
            }
            Self::TanUndefined { value } => write!(f, "tangent is undefined at {value}"),
            Self::Atan2Undefined => write!(f, "atan2(0, 0) is undefined"),
            Self::Overflow { operation } => write!(f, "decimal overflow in {operation}"),
        }
    }
}

impl std::error::Error for MathError {}

/// Decimal math functions sharing one iteration ceiling.
///
/// The struct is `Copy` and holds no state besides the ceiling, so it can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalMath {
    max_iterations: usize,
}

impl Default for DecimalMath {
    fn default() -> Self {
        Self::new()
    }
}

impl DecimalMath {
    /// Kernel with the default iteration ceiling.
    pub const fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Kernel with a custom iteration ceiling (at least 1).
    pub const fn with_max_iterations(max_iterations: usize) -> Self {
        Self {
            max_iterations: if max_iterations == 0 { 1 } else { max_iterations },
        }
    }

    pub const fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

/// Degrees to radians.
pub fn deg_to_rad(degrees: Decimal) -> Decimal {
    PI * degrees / dec!(180)
}

/// Radians to degrees.
pub fn rad_to_deg(radians: Decimal) -> Decimal {
    dec!(180) * radians / PI
}
