//! Exact rational arithmetic over arbitrary-precision integers
//!
//! Every share the engine produces is a [`Rational`], a thin wrapper over
//! [`BigRational`] that keeps canonical form (coprime parts, positive
//! denominator) and turns zero denominators into [`FaraidError`] values instead
//! of panics. It serializes as `"n/d"` text and reads strings or JSON numbers.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FaraidError, Result};

/// Signed fraction in lowest terms
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rational(BigRational);

impl Rational {
    /// Build `numer / denom`, reduced to lowest terms.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Result<Self> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(FaraidError::DivisionByZero { operation: "new" });
        }
        Ok(Self(BigRational::new(numer.into(), denom)))
    }

    /// Fraction from small integer parts, such as a rule table literal.
    pub fn ratio(numer: i64, denom: i64) -> Result<Self> {
        Self::new(numer, denom)
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    pub fn one() -> Self {
        Self(BigRational::one())
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    /// Multiplicative inverse, failing on zero.
    pub fn reciprocal(&self) -> Result<Self> {
        if self.is_zero() {
            return Err(FaraidError::DivisionByZero { operation: "reciprocal" });
        }
        Ok(Self(self.0.recip()))
    }

    /// `self / other`, failing when `other` is zero.
    pub fn checked_div(&self, other: &Rational) -> Result<Self> {
        if other.is_zero() {
            return Err(FaraidError::DivisionByZero { operation: "divide" });
        }
        Ok(Self(&self.0 / &other.0))
    }

    /// Multiply by a whole number (e.g. a head count).
    pub fn scale(&self, factor: u32) -> Self {
        Self(&self.0 * &BigRational::from_integer(BigInt::from(factor)))
    }

    /// Divide by a whole number, failing on zero.
    pub fn split(&self, parts: u32) -> Result<Self> {
        if parts == 0 {
            return Err(FaraidError::DivisionByZero { operation: "split" });
        }
        Ok(Self(&self.0 / &BigRational::from_integer(BigInt::from(parts))))
    }

    /// Least common multiple of the denominators of `values` (1 when empty).
    pub fn common_denominator<'a, I>(values: I) -> BigInt
    where
        I: IntoIterator<Item = &'a Rational>,
    {
        values
            .into_iter()
            .fold(BigInt::one(), |acc, r| acc.lcm(r.denom()))
    }

    /// Numerator of `self` once expressed over `base`.
    ///
    /// Returns `None` when `base` is not a multiple of the denominator.
    pub fn numer_over(&self, base: &BigInt) -> Option<BigInt> {
        if base.is_zero() || !(base % self.denom()).is_zero() {
            return None;
        }
        Some(self.numer() * (base / self.denom()))
    }

    /// Approximate value for display only.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

macro_rules! forward_binop {
    ($imp:ident, $method:ident) => {
        impl<'a> $imp<&'a Rational> for &'a Rational {
            type Output = Rational;

            fn $method(self, rhs: &'a Rational) -> Rational {
                Rational((&self.0).$method(&rhs.0))
            }
        }

        impl $imp for Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                Rational(self.0.$method(rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

/// Summation over a common denominator: numerators are lifted to the LCM of
/// all denominators, added, and reduced once at the end.
impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Self {
        let values: Vec<&Rational> = iter.collect();
        let base = Rational::common_denominator(values.iter().copied());
        let numer = values
            .iter()
            .map(|r| r.numer() * (&base / r.denom()))
            .fold(BigInt::zero(), |acc, n| acc + n);
        // base is a product of positive denominators, never zero
        Rational(BigRational::new(numer, base))
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Self {
        let values: Vec<Rational> = iter.collect();
        values.iter().sum()
    }
}

/// `"n"` for whole numbers, `"n/d"` otherwise
impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Plain or decimal literal without an exponent: `"7"`, `"-1250.75"`, `".25"`
fn parse_decimal(text: &str) -> Option<Rational> {
    let Some((whole, frac)) = text.split_once('.') else {
        return BigInt::from_str(text).ok().map(Rational::from_integer);
    };
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (negative, whole_digits) = match whole.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, whole.strip_prefix('+').unwrap_or(whole)),
    };
    if !whole_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let whole_value = if whole_digits.is_empty() {
        BigInt::zero()
    } else {
        BigInt::from_str(whole_digits).ok()?
    };
    let frac_value = BigInt::from_str(frac).ok()?;
    let scale = num_traits::pow(BigInt::from(10u32), frac.len());
    let mut numer = whole_value * &scale + frac_value;
    if negative {
        numer = -numer;
    }
    Some(Rational(BigRational::new(numer, scale)))
}

/// Largest decimal exponent accepted in `"1.5e3"` style literals
const MAX_EXPONENT: u32 = 4096;

/// Accepts `"7"`, `"-3/4"`, decimals such as `"1250.75"` and exponent forms
/// such as `"2.5e5"`.
impl FromStr for Rational {
    type Err = FaraidError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let invalid = || FaraidError::InvalidRational(s.to_string());

        if let Some((numer, denom)) = text.split_once('/') {
            let numer = BigInt::from_str(numer.trim()).map_err(|_| invalid())?;
            let denom = BigInt::from_str(denom.trim()).map_err(|_| invalid())?;
            return Rational::new(numer, denom);
        }

        let (mantissa, exponent) = match text.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => (&text[..at], Some(&text[at + 1..])),
            None => (text, None),
        };
        let value = parse_decimal(mantissa).ok_or_else(invalid)?;
        let Some(exponent) = exponent else {
            return Ok(value);
        };

        let exponent: i32 = exponent.parse().map_err(|_| invalid())?;
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return Err(invalid());
        }
        let power = Rational::from_integer(num_traits::pow(
            BigInt::from(10u32),
            exponent.unsigned_abs() as usize,
        ));
        if exponent >= 0 {
            Ok(&value * &power)
        } else {
            value.checked_div(&power)
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Reads `"n/d"` or decimal strings as well as bare JSON numbers. Numbers
/// keep their literal text, so `1250.75` never passes through `f64`.
impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => text.parse().map_err(de::Error::custom),
            serde_json::Value::Number(number) => {
                number.to_string().parse().map_err(de::Error::custom)
            }
            other => Err(de::Error::custom(format!(
                "expected a rational string or number, got {}",
                other
            ))),
        }
    }
}

impl From<u32> for Rational {
    fn from(value: u32) -> Self {
        Rational::from_integer(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d).unwrap()
    }

    #[test]
    fn test_normalization() {
        assert_eq!(r(2, 4), r(1, 2));
        assert_eq!(r(3, -6), r(-1, 2));
        assert_eq!(r(-3, -6), r(1, 2));
        assert_eq!(r(0, -5), Rational::zero());
        assert_eq!(r(0, 7).denom(), &BigInt::one());
        assert_eq!(r(6, -4).denom(), &BigInt::from(2));
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert!(matches!(
            Rational::new(1, 0),
            Err(FaraidError::DivisionByZero { .. })
        ));
        assert!(matches!(
            Rational::zero().reciprocal(),
            Err(FaraidError::DivisionByZero { operation: "reciprocal" })
        ));
        assert!(r(1, 2).checked_div(&Rational::zero()).is_err());
        assert!(r(1, 2).split(0).is_err());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(&r(1, 2) + &r(1, 3), r(5, 6));
        assert_eq!(&r(1, 6) - &r(1, 4), r(-1, 12));
        assert_eq!(&r(2, 3) * &r(3, 8), r(1, 4));
        assert_eq!(r(2, 3).checked_div(&r(4, 9)).unwrap(), r(3, 2));
        assert_eq!(r(-13, 12).reciprocal().unwrap(), r(-12, 13));
        assert_eq!(r(1, 6).scale(4), r(2, 3));
        assert_eq!(r(1, 3).split(2).unwrap(), r(1, 6));
        assert_eq!(-r(1, 2), r(-1, 2));
    }

    #[test]
    fn test_ordering() {
        assert!(r(1, 3) < r(1, 2));
        assert!(r(-1, 2) < r(-1, 3));
        assert!(r(13, 12) > Rational::one());
        assert_eq!(r(2, 4).cmp(&r(1, 2)), std::cmp::Ordering::Equal);
        let mut values = vec![r(1, 2), r(1, 8), r(2, 3), r(1, 6)];
        values.sort();
        assert_eq!(values, vec![r(1, 8), r(1, 6), r(1, 2), r(2, 3)]);
    }

    #[test]
    fn test_common_denominator_sum() {
        let shares = vec![r(1, 4), r(1, 6), r(1, 6), r(1, 2)];
        assert_eq!(
            Rational::common_denominator(shares.iter()),
            BigInt::from(12)
        );
        let total: Rational = shares.iter().sum();
        assert_eq!(total, r(13, 12));

        let empty: Vec<Rational> = Vec::new();
        assert_eq!(empty.iter().sum::<Rational>(), Rational::zero());
    }

    #[test]
    fn test_numer_over() {
        let base = BigInt::from(24);
        assert_eq!(r(1, 8).numer_over(&base), Some(BigInt::from(3)));
        assert_eq!(r(2, 3).numer_over(&base), Some(BigInt::from(16)));
        assert_eq!(r(1, 5).numer_over(&base), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("3/4".parse::<Rational>().unwrap(), r(3, 4));
        assert_eq!(" -6/8 ".parse::<Rational>().unwrap(), r(-3, 4));
        assert_eq!("120000".parse::<Rational>().unwrap(), r(120_000, 1));
        assert_eq!("1250.75".parse::<Rational>().unwrap(), r(500_300, 400));
        assert_eq!("-0.5".parse::<Rational>().unwrap(), r(-1, 2));
        assert_eq!(".25".parse::<Rational>().unwrap(), r(1, 4));
        assert!(matches!(
            "1/0".parse::<Rational>(),
            Err(FaraidError::DivisionByZero { .. })
        ));
        assert!("abc".parse::<Rational>().is_err());
        assert!("1.".parse::<Rational>().is_err());
        assert_eq!("1.2e3".parse::<Rational>().unwrap(), r(1200, 1));
        assert_eq!("25E-2".parse::<Rational>().unwrap(), r(1, 4));
        assert!("1e".parse::<Rational>().is_err());
        assert!("1e99999".parse::<Rational>().is_err());
    }

    #[test]
    fn test_display_and_serde() {
        assert_eq!(r(6, 13).to_string(), "6/13");
        assert_eq!(r(4, 2).to_string(), "2");
        assert_eq!(r(-1, 2).to_string(), "-1/2");

        let json = serde_json::to_string(&r(3, 13)).unwrap();
        assert_eq!(json, "\"3/13\"");
        let back: Rational = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r(3, 13));

        let whole: Rational = serde_json::from_str("250000").unwrap();
        assert_eq!(whole, r(250_000, 1));
        let decimal: Rational = serde_json::from_str("0.1").unwrap();
        assert_eq!(decimal, r(1, 10));
        let negative: Rational = serde_json::from_str("-7").unwrap();
        assert_eq!(negative, r(-7, 1));
        assert!(serde_json::from_str::<Rational>("true").is_err());
        assert!(serde_json::from_str::<Rational>("\"1/0\"").is_err());
    }

    #[test]
    fn test_ratio_rejects_zero_denominator() {
        assert_eq!(Rational::ratio(2, 6).unwrap(), r(1, 3));
        assert!(matches!(
            Rational::ratio(5, 0),
            Err(FaraidError::DivisionByZero { operation: "new" })
        ));
    }

    #[test]
    fn test_big_values_stay_exact() {
        let mut acc = Rational::zero();
        for d in 2..60 {
            acc = &acc + &r(1, d * (d - 1));
        }
        // Telescoping: sum of 1/(d(d-1)) for d in 2..60 = 1 - 1/59
        assert_eq!(acc, r(58, 59));
    }

    #[test]
    fn test_to_f64() {
        approx::assert_abs_diff_eq!(r(1, 3).to_f64(), 0.333_333_333, epsilon = 1e-9);
    }
}
