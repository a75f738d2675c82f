//! Numeric weight representations.
//!
//! A pool is generic over exactly four weight types: `i32`, `i64`, `f32` and
//! `f64`. The [`Weight`] trait is sealed, so asking for any other type is a
//! compile error. Hosts that choose the representation at runtime (config
//! files, command lines) go through [`WeightKind`], whose parser is where an
//! unsupported representation is rejected.

use std::fmt;
use std::str::FromStr;

use crate::error::PoolError;

mod sealed {
    pub trait Sealed {}
}

/// Arithmetic a pool needs from its weight type.
///
/// Sampling always happens in `f64` space; `from_f64` brings the scaled draw
/// back into the weight's own representation for the cumulative search.
pub trait Weight:
    sealed::Sealed + Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const ZERO: Self;

    /// True for integer representations. Discrete weights get the ceiling
    /// correction when a draw is mapped onto the cumulative index.
    const DISCRETE: bool;

    const KIND: WeightKind;

    /// `None` when the sum does not fit (integer overflow, float infinity).
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// Plain addition, for sums already bounded by a checked total.
    fn add(self, rhs: Self) -> Self;

    fn sub(self, rhs: Self) -> Self;

    fn to_f64(self) -> f64;

    /// Saturating conversion from `f64`.
    fn from_f64(value: f64) -> Self;

    /// `None` when `value` is out of range for the representation or, for
    /// floats, would be rounded.
    fn from_i64(value: i64) -> Option<Self>;

    /// Non-negative and, for floats, finite.
    fn is_valid(self) -> bool;
}

macro_rules! integer_weight {
    ($t:ty, $kind:expr) => {
        impl sealed::Sealed for $t {}

        impl Weight for $t {
            const ZERO: Self = 0;
            const DISCRETE: bool = true;
            const KIND: WeightKind = $kind;

            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$t>::checked_add(self, rhs)
            }

            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn from_i64(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn is_valid(self) -> bool {
                self >= 0
            }
        }
    };
}

macro_rules! float_weight {
    ($t:ty, $kind:expr) => {
        impl sealed::Sealed for $t {}

        impl Weight for $t {
            const ZERO: Self = 0.0;
            const DISCRETE: bool = false;
            const KIND: WeightKind = $kind;

            fn checked_add(self, rhs: Self) -> Option<Self> {
                let sum = self + rhs;
                sum.is_finite().then_some(sum)
            }

            fn add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn sub(self, rhs: Self) -> Self {
                self - rhs
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $t
            }

            fn from_i64(value: i64) -> Option<Self> {
                let converted = value as $t;
                (converted as i128 == i128::from(value)).then_some(converted)
            }

            fn is_valid(self) -> bool {
                self >= 0.0 && self.is_finite()
            }
        }
    };
}

integer_weight!(i32, WeightKind::I32);
integer_weight!(i64, WeightKind::I64);
float_weight!(f32, WeightKind::F32);
float_weight!(f64, WeightKind::F64);

/// Runtime name of a supported weight representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightKind {
    I32,
    I64,
    F32,
    F64,
}

impl WeightKind {
    pub fn is_discrete(self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for WeightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightKind {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "i32" | "int" | "int32" => Ok(Self::I32),
            "i64" | "long" | "int64" => Ok(Self::I64),
            "f32" | "float" | "single" => Ok(Self::F32),
            "f64" | "double" => Ok(Self::F64),
            other => Err(PoolError::InvalidConfiguration(format!(
                "unsupported weight type '{other}' (expected i32, i64, f32 or f64)"
            ))),
        }
    }
}
