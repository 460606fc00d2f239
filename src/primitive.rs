//! Functions to construct [`Integer`]s, [`Float`]s, and [`Complex`] numbers from various types.

use rug::{Assign, Complex, Float, Integer};

/// The number of digits of precision to use when computing values.
pub const PRECISION: u32 = 1 << 9;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates an [`Integer`] from a [`Float`] by truncating the fractional part.
pub fn int_from_float(f: &Float) -> Option<Integer> {
    f.clone().trunc().to_integer()
}

/// Creates a [`Float`] with the given value.
pub fn float<T>(n: T) -> Float
where
    Float: Assign<T>,
{
    Float::with_val(PRECISION, n)
}

/// Creates a [`Float`] from a string slice.
pub fn float_from_str(s: &str) -> Float {
    Float::with_val(PRECISION, Float::parse(s).unwrap())
}

/// Creates a [`Complex`] with the given value.
pub fn complex<T>(n: T) -> Complex
where
    Complex: Assign<T>,
{
    Complex::with_val(PRECISION, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_truncation() {
        assert_eq!(int_from_float(&float(2.75)).unwrap(), 2);
        assert_eq!(int_from_float(&float(-2.75)).unwrap(), -2);
    }
}
