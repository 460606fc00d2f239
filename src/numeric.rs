//! Arbitrary-precision numeric leaves, real and complex.
//!
//! Expression trees never do arithmetic themselves; every numeric fold in the rewrite passes goes
//! through [`Numeric`]. Division by zero and similar faults produce NaN values, which propagate
//! structurally instead of aborting a rewrite.

use crate::primitive::{complex, float, int_from_float};
use rug::{ops::Pow, Complete, Complex, Float, Integer};
use std::cmp::Ordering;

/// A real or complex arbitrary-precision number.
#[derive(Debug, Clone)]
pub enum Numeric {
    Real(Float),
    Complex(Complex),
}

impl Numeric {
    /// Creates a real value.
    pub fn real<T>(n: T) -> Self
    where
        Float: rug::Assign<T>,
    {
        Self::Real(float(n))
    }

    /// Creates a complex value from real and imaginary parts.
    pub fn imaginary<T>(re: T, im: T) -> Self
    where
        Float: rug::Assign<T>,
    {
        Self::Complex(complex((float(re), float(im)))).demote()
    }

    /// Collapses a complex value with zero imaginary part into a real value.
    fn demote(self) -> Self {
        match self {
            Self::Complex(c) if c.imag().is_zero() => Self::Real(c.into_real_imag().0),
            other => other,
        }
    }

    fn promote(&self) -> Complex {
        match self {
            Self::Real(f) => complex(f),
            Self::Complex(c) => c.clone(),
        }
    }

    pub fn as_real(&self) -> Option<&Float> {
        match self {
            Self::Real(f) => Some(f),
            Self::Complex(_) => None,
        }
    }

    /// Returns the value as an [`Integer`] if it is a whole real number.
    pub fn to_integer(&self) -> Option<Integer> {
        match self {
            Self::Real(f) if f.is_integer() => int_from_float(f),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer().and_then(|i| i.to_i64())
    }

    pub fn add(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a.clone() + b),
            _ => Self::Complex(self.promote() + other.promote()).demote(),
        }
    }

    pub fn subtract(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a.clone() - b),
            _ => Self::Complex(self.promote() - other.promote()).demote(),
        }
    }

    pub fn multiply(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a.clone() * b),
            _ => Self::Complex(self.promote() * other.promote()).demote(),
        }
    }

    pub fn divide(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => Self::Real(a.clone() / b),
            _ => Self::Complex(self.promote() / other.promote()).demote(),
        }
    }

    /// Raises `self` to the power `other`. A negative real raised to a non-whole power produces a
    /// complex result.
    pub fn raise(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) if !a.is_sign_negative() || b.is_integer() => {
                Self::Real(a.clone().pow(b))
            }
            _ => Self::Complex(self.promote().pow(other.promote())).demote(),
        }
    }

    /// Compares two values. Complex values only compare equal-or-nothing.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a.partial_cmp(b),
            _ => {
                if self.eq(other) {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
        }
    }

    /// Greatest common divisor of two whole real values.
    pub fn gcd(&self, other: &Self) -> Option<Self> {
        let a = self.to_integer()?;
        let b = other.to_integer()?;
        Some(Self::Real(float(a.gcd(&b))))
    }

    pub fn floor(&self) -> Self {
        match self {
            Self::Real(f) => Self::Real(f.clone().floor()),
            Self::Complex(c) => {
                let (re, im) = c.clone().into_real_imag();
                Self::Complex(complex((re.floor(), im.floor())))
            }
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Self::Real(f) => Self::Real(f.clone().abs()),
            Self::Complex(c) => Self::Real(c.clone().abs().into_real_imag().0),
        }
    }

    pub fn negate(&self) -> Self {
        match self {
            Self::Real(f) => Self::Real(-f.clone()),
            Self::Complex(c) => Self::Complex(-c.clone()),
        }
    }

    /// Factorial of a whole non-negative value.
    pub fn factorial(&self) -> Option<Self> {
        let n = self.to_integer()?;
        let n = n.to_u32()?;
        Some(Self::Real(float(Integer::factorial(n).complete())))
    }

    pub fn shift_left(&self, bits: &Self) -> Option<Self> {
        let value = self.to_integer()?;
        let bits = bits.to_integer()?.to_u32()?;
        Some(Self::Real(float(value << bits)))
    }

    pub fn shift_right(&self, bits: &Self) -> Option<Self> {
        let value = self.to_integer()?;
        let bits = bits.to_integer()?.to_u32()?;
        Some(Self::Real(float(value >> bits)))
    }

    pub fn bit_and(&self, other: &Self) -> Option<Self> {
        Some(Self::Real(float(self.to_integer()? & other.to_integer()?)))
    }

    pub fn bit_or(&self, other: &Self) -> Option<Self> {
        Some(Self::Real(float(self.to_integer()? | other.to_integer()?)))
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, Self::Real(f) if f.is_integer())
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Real(f) if f.is_sign_negative() && !f.is_zero())
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Real(f) => f.is_zero(),
            Self::Complex(c) => c.real().is_zero() && c.imag().is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Self::Real(f) if *f == 1)
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Self::Real(f) => f.is_nan(),
            Self::Complex(c) => c.real().is_nan() || c.imag().is_nan(),
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Real(a), Self::Real(b)) => a == b,
            (Self::Complex(a), Self::Complex(b)) => a == b,
            (Self::Real(a), Self::Complex(b)) | (Self::Complex(b), Self::Real(a)) => {
                b.imag().is_zero() && b.real() == a
            }
        }
    }
}

/// Formats a [`Float`] the way the canonical display text expects: whole values render without a
/// trailing fractional part.
fn write_float(f: &mut std::fmt::Formatter<'_>, value: &Float) -> std::fmt::Result {
    if value.is_nan() {
        write!(f, "NaN")
    } else {
        write!(f, "{}", value.to_f64())
    }
}

impl std::fmt::Display for Numeric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(value) => write_float(f, value),
            Self::Complex(value) => {
                let (re, im) = (value.real(), value.imag());
                if !re.is_zero() {
                    write_float(f, re)?;
                    if im.is_sign_negative() {
                        write!(f, " - ")?;
                        write_imag_part(f, &-im.clone())?;
                    } else {
                        write!(f, " + ")?;
                        write_imag_part(f, im)?;
                    }
                    Ok(())
                } else if im.is_sign_negative() {
                    write!(f, "-")?;
                    write_imag_part(f, &-im.clone())
                } else {
                    write_imag_part(f, im)
                }
            }
        }
    }
}

fn write_imag_part(f: &mut std::fmt::Formatter<'_>, im: &Float) -> std::fmt::Result {
    if *im == 1 {
        write!(f, "i")
    } else {
        write_float(f, im)?;
        write!(f, "i")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn real_arithmetic() {
        let a = Numeric::real(6);
        let b = Numeric::real(4);
        assert_eq!(a.add(&b), Numeric::real(10));
        assert_eq!(a.multiply(&b), Numeric::real(24));
        assert_eq!(a.gcd(&b).unwrap(), Numeric::real(2));
        assert!(a.is_whole());
    }

    #[test]
    fn complex_demotion() {
        // (2 + 3i) * (2 - 3i) = 13, a real value
        let a = Numeric::imaginary(2, 3);
        let b = Numeric::imaginary(2, -3);
        assert_eq!(a.multiply(&b), Numeric::real(13));
    }

    #[test]
    fn negative_fractional_power_is_complex() {
        let base = Numeric::real(-1);
        let exp = Numeric::real(0.5);
        assert!(matches!(base.raise(&exp), Numeric::Complex(_)));
    }

    #[test]
    fn display() {
        assert_eq!(Numeric::real(2).to_string(), "2");
        assert_eq!(Numeric::real(0.5).to_string(), "0.5");
        assert_eq!(Numeric::imaginary(0, 1).to_string(), "i");
        assert_eq!(Numeric::imaginary(2, -3).to_string(), "2 - 3i");
    }

    #[test]
    fn nan_propagates() {
        let q = Numeric::real(1).divide(&Numeric::real(0));
        // rug yields +inf for 1/0; 0/0 is the NaN case
        let nan = Numeric::real(0).divide(&Numeric::real(0));
        assert!(q.as_real().unwrap().is_infinite());
        assert!(nan.is_nan());
    }
}
