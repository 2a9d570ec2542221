use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An exact rational number extended with `NaN` and the two infinities.
///
/// The `Rat` payload is kept normalized by `BigRational`: numerator and
/// denominator coprime, denominator positive. All arithmetic is total and
/// follows a single rule table for the special values:
///
/// - `NaN` absorbs: any operation involving `NaN` yields `NaN`.
/// - `∞ − ∞`, `∞ + (−∞)`, `0 · ∞`, `∞ / ∞` and `x / 0` yield `NaN`.
/// - `∞ · x` and `∞ / x` with finite non-zero `x` combine signs;
///   `∞ + finite = ∞`; `finite / ∞ = 0`.
///
/// # Example
/// ```rust
/// use parlex::Value;
///
/// let half = Value::from_frac(1.into(), 2.into());
/// assert_eq!(half.clone() + half.clone(), Value::one());
/// assert!(half.floor().is_zero());
/// assert!((Value::infty() + Value::neginfty()).is_nan());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Nan,
    Infty,
    NegInfty,
    Rat(BigRational),
}

impl Value {
    pub fn zero() -> Value {
        Value::Rat(BigRational::zero())
    }

    pub fn one() -> Value {
        Value::Rat(BigRational::one())
    }

    pub fn nan() -> Value {
        Value::Nan
    }

    pub fn infty() -> Value {
        Value::Infty
    }

    pub fn neginfty() -> Value {
        Value::NegInfty
    }

    pub fn from_i64(i: i64) -> Value {
        Value::Rat(BigRational::from_integer(BigInt::from(i)))
    }

    pub fn from_u64(u: u64) -> Value {
        Value::Rat(BigRational::from_integer(BigInt::from(u)))
    }

    pub fn from_int(n: BigInt) -> Value {
        Value::Rat(BigRational::from_integer(n))
    }

    /// Builds `n/d`, normalizing the fraction. A zero denominator yields
    /// `±∞` by the sign of `n`, or `NaN` when `n` is zero as well.
    pub fn from_frac(n: BigInt, d: BigInt) -> Value {
        if d.is_zero() {
            return match n.sign() {
                Sign::Plus => Value::Infty,
                Sign::Minus => Value::NegInfty,
                Sign::NoSign => Value::Nan,
            };
        }
        Value::Rat(BigRational::new(n, d))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Nan)
    }

    pub fn is_infty(&self) -> bool {
        matches!(self, Value::Infty)
    }

    pub fn is_neginfty(&self) -> bool {
        matches!(self, Value::NegInfty)
    }

    /// A finite rational (possibly integer) value.
    pub fn is_rat(&self) -> bool {
        matches!(self, Value::Rat(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Rat(r) if r.is_integer())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Value::Rat(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Value::Rat(r) if r.is_one())
    }

    pub fn is_pos(&self) -> bool {
        match self {
            Value::Infty => true,
            Value::Rat(r) => r.is_positive(),
            _ => false,
        }
    }

    pub fn is_neg(&self) -> bool {
        match self {
            Value::NegInfty => true,
            Value::Rat(r) => r.is_negative(),
            _ => false,
        }
    }

    pub fn is_nonneg(&self) -> bool {
        matches!(self, Value::Rat(r) if !r.is_negative())
    }

    pub fn is_nonpos(&self) -> bool {
        matches!(self, Value::Rat(r) if !r.is_positive())
    }

    /// The sign of the value; `NaN` counts as zero.
    pub fn sign(&self) -> i32 {
        if self.is_pos() {
            1
        } else if self.is_neg() {
            -1
        } else {
            0
        }
    }

    /// Total order on non-`NaN` values; `None` when either side is `NaN`.
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Nan, _) | (_, Value::Nan) => None,
            (Value::Infty, Value::Infty) => Some(Ordering::Equal),
            (Value::NegInfty, Value::NegInfty) => Some(Ordering::Equal),
            (Value::Infty, _) => Some(Ordering::Greater),
            (_, Value::Infty) => Some(Ordering::Less),
            (Value::NegInfty, _) => Some(Ordering::Less),
            (_, Value::NegInfty) => Some(Ordering::Greater),
            (Value::Rat(a), Value::Rat(b)) => a.partial_cmp(b),
        }
    }

    pub fn lt(&self, other: &Value) -> bool {
        self.partial_cmp_value(other) == Some(Ordering::Less)
    }

    pub fn le(&self, other: &Value) -> bool {
        matches!(
            self.partial_cmp_value(other),
            Some(Ordering::Less) | Some(Ordering::Equal)
        )
    }

    pub fn gt(&self, other: &Value) -> bool {
        self.partial_cmp_value(other) == Some(Ordering::Greater)
    }

    pub fn ge(&self, other: &Value) -> bool {
        matches!(
            self.partial_cmp_value(other),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )
    }

    /// Compare against a machine integer; `None` when the value is `NaN`.
    pub fn cmp_i64(&self, i: i64) -> Option<Ordering> {
        self.partial_cmp_value(&Value::from_i64(i))
    }

    pub fn abs(self) -> Value {
        if self.is_neg() {
            -self
        } else {
            self
        }
    }

    /// Round towards negative infinity. Special values pass through.
    pub fn floor(self) -> Value {
        match self {
            Value::Rat(r) => Value::Rat(r.floor()),
            v => v,
        }
    }

    /// Round towards positive infinity. Special values pass through.
    pub fn ceil(self) -> Value {
        match self {
            Value::Rat(r) => Value::Rat(r.ceil()),
            v => v,
        }
    }

    /// Round towards zero. Special values pass through.
    pub fn trunc(self) -> Value {
        match self {
            Value::Rat(r) => Value::Rat(r.trunc()),
            v => v,
        }
    }

    /// `2^self` for integer exponents that fit in a machine word.
    pub fn two_exp(self) -> Result<Value, Error> {
        let Value::Rat(r) = self else {
            return Err(Error::InvalidArgument("can only compute integer powers"));
        };
        if !r.is_integer() {
            return Err(Error::InvalidArgument("can only compute integer powers"));
        }
        let exp = r.numer().abs();
        let exp = exp
            .to_u64()
            .ok_or(Error::InvalidArgument("exponent too large"))?;
        if exp > u32::MAX as u64 {
            return Err(Error::InvalidArgument("exponent too large"));
        }
        let pow = BigInt::one() << exp as usize;
        if r.numer().is_negative() {
            Ok(Value::from_frac(BigInt::one(), pow))
        } else {
            Ok(Value::from_int(pow))
        }
    }

    /// Floor remainder of two integers; anything else yields `NaN`.
    pub fn modulo(self, other: Value) -> Value {
        match (self, other) {
            (Value::Rat(a), Value::Rat(b))
                if a.is_integer() && b.is_integer() && !b.is_zero() =>
            {
                Value::from_int(a.numer().mod_floor(b.numer()))
            }
            _ => Value::Nan,
        }
    }

    /// Gcd of two integers; anything else yields `NaN`.
    pub fn gcd(self, other: Value) -> Value {
        match (self, other) {
            (Value::Rat(a), Value::Rat(b)) if a.is_integer() && b.is_integer() => {
                Value::from_int(a.numer().gcd(b.numer()))
            }
            _ => Value::Nan,
        }
    }

    /// Extended gcd of two integers: `(g, x, y)` with `x·self + y·other = g`.
    /// Non-integer inputs yield `(NaN, NaN, NaN)`.
    pub fn gcdext(self, other: Value) -> (Value, Value, Value) {
        match (self, other) {
            (Value::Rat(a), Value::Rat(b)) if a.is_integer() && b.is_integer() => {
                let e = a.numer().extended_gcd(b.numer());
                (
                    Value::from_int(e.gcd),
                    Value::from_int(e.x),
                    Value::from_int(e.y),
                )
            }
            _ => (Value::Nan, Value::Nan, Value::Nan),
        }
    }

    /// True iff both values are integers and `other` divides `self`.
    pub fn is_divisible_by(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Rat(a), Value::Rat(b))
                if a.is_integer() && b.is_integer() && !b.is_zero() =>
            {
                a.numer().is_multiple_of(b.numer())
            }
            _ => false,
        }
    }

    pub fn add_u64(self, u: u64) -> Value {
        match self {
            Value::Rat(r) => Value::Rat(r + BigRational::from_integer(BigInt::from(u))),
            v => v,
        }
    }

    pub fn sub_u64(self, u: u64) -> Value {
        match self {
            Value::Rat(r) => Value::Rat(r - BigRational::from_integer(BigInt::from(u))),
            v => v,
        }
    }

    pub fn mul_u64(self, u: u64) -> Value {
        self * Value::from_u64(u)
    }

    pub fn div_u64(self, u: u64) -> Value {
        self / Value::from_u64(u)
    }

    /// The numerator as a machine integer.
    pub fn get_num_i64(&self) -> Result<i64, Error> {
        match self {
            Value::Rat(r) => r
                .numer()
                .to_i64()
                .ok_or(Error::InvalidArgument("numerator too large")),
            _ => Err(Error::InvalidArgument("expecting rational value")),
        }
    }

    /// The denominator as a machine integer.
    pub fn get_den_i64(&self) -> Result<i64, Error> {
        match self {
            Value::Rat(r) => r
                .denom()
                .to_i64()
                .ok_or(Error::InvalidArgument("denominator too large")),
            _ => Err(Error::InvalidArgument("expecting rational value")),
        }
    }

    /// A floating-point approximation.
    pub fn get_f64(&self) -> Result<f64, Error> {
        match self {
            Value::Rat(r) => r
                .to_f64()
                .ok_or(Error::InvalidArgument("value out of range")),
            _ => Err(Error::InvalidArgument("expecting rational value")),
        }
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Value::Rat(r) => Some(r),
            _ => None,
        }
    }
}

/// `NaN` compares unequal to everything, itself included.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.partial_cmp_value(other) == Some(Ordering::Equal)
    }
}

impl Neg for Value {
    type Output = Value;

    fn neg(self) -> Value {
        match self {
            Value::Nan => Value::Nan,
            Value::Infty => Value::NegInfty,
            Value::NegInfty => Value::Infty,
            Value::Rat(r) => Value::Rat(-r),
        }
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, other: Value) -> Value {
        match (self, other) {
            (Value::Nan, _) | (_, Value::Nan) => Value::Nan,
            (Value::Infty, Value::NegInfty) | (Value::NegInfty, Value::Infty) => Value::Nan,
            (Value::Infty, _) | (_, Value::Infty) => Value::Infty,
            (Value::NegInfty, _) | (_, Value::NegInfty) => Value::NegInfty,
            (Value::Rat(a), Value::Rat(b)) => Value::Rat(a + b),
        }
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, other: Value) -> Value {
        self + (-other)
    }
}

impl Mul for Value {
    type Output = Value;

    fn mul(self, other: Value) -> Value {
        match (self, other) {
            (Value::Nan, _) | (_, Value::Nan) => Value::Nan,
            (Value::Rat(a), Value::Rat(b)) => Value::Rat(a * b),
            // at least one infinity left
            (a, b) => {
                if a.is_zero() || b.is_zero() {
                    Value::Nan
                } else if a.sign() * b.sign() > 0 {
                    Value::Infty
                } else {
                    Value::NegInfty
                }
            }
        }
    }
}

impl Div for Value {
    type Output = Value;

    fn div(self, other: Value) -> Value {
        match (self, other) {
            (Value::Nan, _) | (_, Value::Nan) => Value::Nan,
            (Value::Infty | Value::NegInfty, Value::Infty | Value::NegInfty) => Value::Nan,
            (_, b) if b.is_zero() => Value::Nan,
            (a @ (Value::Infty | Value::NegInfty), b) => {
                if b.is_neg() {
                    -a
                } else {
                    a
                }
            }
            (_, Value::Infty | Value::NegInfty) => Value::zero(),
            (Value::Rat(a), Value::Rat(b)) => Value::Rat(a / b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nan => write!(f, "NaN"),
            Value::Infty => write!(f, "infty"),
            Value::NegInfty => write!(f, "-infty"),
            Value::Rat(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_frac_normalizes() {
        let v = Value::from_frac(4.into(), (-6).into());
        assert_eq!(v.get_num_i64().unwrap(), -2);
        assert_eq!(v.get_den_i64().unwrap(), 3);
    }

    #[test]
    fn zero_denominator_maps_to_specials() {
        assert!(Value::from_frac(3.into(), 0.into()).is_infty());
        assert!(Value::from_frac((-3).into(), 0.into()).is_neginfty());
        assert!(Value::from_frac(0.into(), 0.into()).is_nan());
    }

    #[test]
    fn infinity_division_yields_zero() {
        let v = Value::from_i64(7) / Value::infty();
        assert!(v.is_zero());
    }

    #[test]
    fn sign_combination_on_multiply() {
        assert!((Value::infty() * Value::from_i64(-2)).is_neginfty());
        assert!((Value::neginfty() * Value::from_i64(-2)).is_infty());
        assert!((Value::infty() * Value::zero()).is_nan());
    }
}
