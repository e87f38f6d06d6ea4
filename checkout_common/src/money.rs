use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul},
};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "INR";

//--------------------------------------        Paise          ---------------------------------------------------------
/// An amount of money in the smallest unit of the currency (paise for INR). The gateway only deals in integers, and
/// so do we.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Paise(i64);

op!(binary Paise, Add, add);
op!(binary Paise, Sub, sub);
op!(inplace Paise, AddAssign, add_assign);
op!(inplace Paise, SubAssign, sub_assign);
op!(unary Paise, Neg, neg);

impl Mul<i64> for Paise {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Paise {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct PaiseConversionError(String);

impl From<i64> for Paise {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Paise {
    type Error = PaiseConversionError;

    /// Storefront clients send amounts as JSON numbers. These are rounded to the nearest paisa, which is what the
    /// gateway does with `Math.round(totalAmount)`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value.abs() > i64::MAX as f64 {
            return Err(PaiseConversionError(format!("{value} is not a finite amount")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(value.round() as i64))
    }
}

impl Display for Paise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}₹{}.{:02}", abs / 100, abs % 100)
    }
}

impl Paise {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

//--------------------------------------    rounded_paise      ---------------------------------------------------------
/// Deserializers for amounts that clients send as JSON numbers, which may carry a fraction. Use with
/// `#[serde(deserialize_with = "...")]`. Values are rounded the same way as [`Paise::try_from`].
pub mod rounded_paise {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Paise, D::Error> {
        let value = f64::deserialize(d)?;
        Paise::try_from(value).map_err(D::Error::custom)
    }

    /// For optional amounts. Pair it with `#[serde(default)]` so that a missing key is `None`.
    pub fn deserialize_option<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Paise>, D::Error> {
        Option::<f64>::deserialize(d)?.map(Paise::try_from).transpose().map_err(D::Error::custom)
    }
}
