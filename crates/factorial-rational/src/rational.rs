//! Exact arbitrary-precision fractions.
//!
//! [`Rational`] is an immutable value type that is always stored in lowest
//! terms with a strictly positive denominator, so structural equality and
//! hashing agree with numeric equality.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Largest decimal exponent magnitude accepted when parsing.
pub const MAX_DECIMAL_EXPONENT: u64 = 4096;

/// Errors produced by fallible rational operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RationalError {
    /// A zero denominator was supplied, or a division by zero was attempted.
    #[error("division by zero")]
    DivideByZero,
    /// Text that is neither an integer, a fraction nor a decimal.
    #[error("invalid rational literal '{0}'")]
    Parse(String),
}

/// An exact fraction `numer / denom` in lowest terms, `denom > 0`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: BigInt,
    denom: BigInt,
}

impl Rational {
    /// Build `numer / denom`, reducing to lowest terms.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Self, RationalError> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(RationalError::DivideByZero);
        }
        Ok(Self::reduced(numer.into(), denom))
    }

    /// An integer value.
    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numer: value.into(),
            denom: BigInt::one(),
        }
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    /// Caller guarantees `denom != 0`.
    fn reduced(numer: BigInt, denom: BigInt) -> Self {
        let divider = numer.gcd(&denom);
        let (mut numer, mut denom) = (numer / &divider, denom / divider);
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        Self { numer, denom }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i32 {
        if self.numer.is_zero() {
            0
        } else if self.numer.is_negative() {
            -1
        } else {
            1
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.numer.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.numer.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    pub fn abs(&self) -> Self {
        Self {
            numer: self.numer.abs(),
            denom: self.denom.clone(),
        }
    }

    /// `1 / self`.
    pub fn recip(&self) -> Result<Self, RationalError> {
        Self::new(self.denom.clone(), self.numer.clone())
    }

    /// `self + 1`.
    pub fn inc(&self) -> Self {
        Self {
            numer: &self.numer + &self.denom,
            denom: self.denom.clone(),
        }
    }

    /// `self - 1`.
    pub fn dec(&self) -> Self {
        Self {
            numer: &self.numer - &self.denom,
            denom: self.denom.clone(),
        }
    }

    /// Division that reports a zero divisor instead of panicking.
    pub fn checked_div(&self, other: &Rational) -> Result<Self, RationalError> {
        if other.is_zero() {
            return Err(RationalError::DivideByZero);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        Ok(Self::reduced(
            &self.numer * &other.denom,
            &self.denom * &other.numer,
        ))
    }

    /// Approximate value. Use only for display or comparison with
    /// floating-point references, never to drive a computation.
    pub fn to_f64(&self) -> f64 {
        // Shift both sides down so huge operands don't overflow to inf/inf.
        let bits = self.numer.bits().max(self.denom.bits());
        let shift = bits.saturating_sub(1000) as usize;
        let numer = (&self.numer >> shift).to_f64().unwrap_or(f64::NAN);
        let denom = (&self.denom >> shift).to_f64().unwrap_or(f64::NAN);
        numer / denom
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

macro_rules! from_integer_impl {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Rational {
                fn from(value: $t) -> Self {
                    Self::from_integer(value)
                }
            }
        )*
    };
}

from_integer_impl!(i32, i64, u32, u64, usize, BigInt);

impl FromStr for Rational {
    type Err = RationalError;

    /// Accepts `"7"`, `"-3/4"`, `"0.15"`, `"-.5"` and `"1.5e3"`. Exponents
    /// beyond [`MAX_DECIMAL_EXPONENT`] are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || RationalError::Parse(s.to_string());

        if let Some((numer, denom)) = text.split_once('/') {
            let numer: BigInt = numer.trim().parse().map_err(|_| invalid())?;
            let denom: BigInt = denom.trim().parse().map_err(|_| invalid())?;
            return Rational::new(numer, denom);
        }

        let (mantissa, exponent) = match text.split_once(['e', 'E']) {
            Some((m, e)) => (m, e.parse::<i64>().map_err(|_| invalid())?),
            None => (text, 0),
        };
        if exponent.unsigned_abs() > MAX_DECIMAL_EXPONENT {
            return Err(invalid());
        }
        let (negative, digits) = match mantissa.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if (whole.is_empty() && fraction.is_empty())
            || !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let all_digits = format!("{whole}{fraction}");
        let mut numer: BigInt = all_digits.parse().map_err(|_| invalid())?;
        if negative {
            numer = -numer;
        }
        let scale = i64::try_from(fraction.len())
            .ok()
            .and_then(|places| exponent.checked_sub(places))
            .ok_or_else(invalid)?;
        let places = usize::try_from(scale.unsigned_abs()).map_err(|_| invalid())?;
        let power = num_traits::pow(BigInt::from(10), places);
        if scale >= 0 {
            Ok(Rational::from_integer(numer * power))
        } else {
            Rational::new(numer, power)
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering and formatting
// ---------------------------------------------------------------------------

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.denom == other.denom {
            return self.numer.cmp(&other.numer);
        }
        (&self.numer * &other.denom).cmp(&(&self.denom * &other.numer))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom.is_one() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

impl<'b> Add<&'b Rational> for &Rational {
    type Output = Rational;

    fn add(self, other: &'b Rational) -> Rational {
        if self.denom == other.denom {
            return Rational::reduced(&self.numer + &other.numer, self.denom.clone());
        }
        Rational::reduced(
            &self.numer * &other.denom + &self.denom * &other.numer,
            &self.denom * &other.denom,
        )
    }
}

impl<'b> Sub<&'b Rational> for &Rational {
    type Output = Rational;

    fn sub(self, other: &'b Rational) -> Rational {
        if self.denom == other.denom {
            return Rational::reduced(&self.numer - &other.numer, self.denom.clone());
        }
        Rational::reduced(
            &self.numer * &other.denom - &self.denom * &other.numer,
            &self.denom * &other.denom,
        )
    }
}

impl<'b> Mul<&'b Rational> for &Rational {
    type Output = Rational;

    fn mul(self, other: &'b Rational) -> Rational {
        if self.is_zero() || other.is_zero() {
            return Rational::zero();
        }
        Rational::reduced(&self.numer * &other.numer, &self.denom * &other.denom)
    }
}

impl<'b> Div<&'b Rational> for &Rational {
    type Output = Rational;

    /// # Panics
    ///
    /// Panics when `other` is zero, like integer division. Use
    /// [`Rational::checked_div`] for a fallible form.
    fn div(self, other: &'b Rational) -> Rational {
        match self.checked_div(other) {
            Ok(value) => value,
            Err(_) => panic!("attempt to divide a Rational by zero"),
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numer: -&self.numer,
            denom: self.denom.clone(),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numer: -self.numer,
            denom: self.denom,
        }
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident, $assign_imp:ident, $assign_method:ident) => {
        impl $imp<Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Rational {
                (&self).$method(&other)
            }
        }

        impl<'b> $imp<&'b Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: &'b Rational) -> Rational {
                (&self).$method(other)
            }
        }

        impl $imp<Rational> for &Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Rational {
                self.$method(&other)
            }
        }

        impl $assign_imp<Rational> for Rational {
            fn $assign_method(&mut self, other: Rational) {
                *self = (&*self).$method(&other);
            }
        }

        impl<'b> $assign_imp<&'b Rational> for Rational {
            fn $assign_method(&mut self, other: &'b Rational) {
                *self = (&*self).$method(other);
            }
        }
    };
}

forward_binop!(Add, add, AddAssign, add_assign);
forward_binop!(Sub, sub, SubAssign, sub_assign);
forward_binop!(Mul, mul, MulAssign, mul_assign);
forward_binop!(Div, div, DivAssign, div_assign);

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

// ---------------------------------------------------------------------------
// Serde: strings on the way out, strings or numbers on the way in
// ---------------------------------------------------------------------------

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct RationalVisitor;

impl Visitor<'_> for RationalVisitor {
    type Value = Rational;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a string such as \"3/4\" or \"0.25\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rational, E> {
        Ok(Rational::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rational, E> {
        Ok(Rational::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rational, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("non-finite number {v}")));
        }
        // Display for f64 prints the shortest round-trip decimal, never an
        // exponent, so 0.1 parses back to exactly 1/10.
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Rational, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RationalVisitor)
    }
}
