// ABOUTME: Exact rational arithmetic on arbitrary-precision integers

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Pow, Signed, ToPrimitive, Zero};
use std::fmt;
use std::str::FromStr;

/// An exact rational number in lowest terms.
///
/// Invariants: `denominator > 0`; `gcd(|numerator|, denominator) == 1`;
/// if `numerator == 0` then `denominator == 1` (canonical zero, no signed
/// zero ever exists).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumError {
    DivisionByZero,
    NonIntegerOperand,
    ZeroToNegativePower,
    InvalidLiteral,
}

impl fmt::Display for NumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumError::DivisionByZero => write!(f, "division by zero"),
            NumError::NonIntegerOperand => write!(f, "operand must be an integer"),
            NumError::ZeroToNegativePower => write!(f, "zero cannot be raised to a negative power"),
            NumError::InvalidLiteral => write!(f, "invalid numeric literal"),
        }
    }
}

impl Rational {
    fn new_normalized(numerator: BigInt, denominator: BigInt) -> Result<Self, NumError> {
        if denominator.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        let (mut n, mut d) = if denominator.is_negative() {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        if n.is_zero() {
            d = BigInt::from(1);
        } else {
            let g = n.gcd(&d);
            if g != BigInt::from(1) {
                n /= &g;
                d /= &g;
            }
        }
        Ok(Rational {
            numerator: n,
            denominator: d,
        })
    }

    pub fn zero() -> Self {
        Rational {
            numerator: BigInt::from(0),
            denominator: BigInt::from(1),
        }
    }

    pub fn from_int(value: i64) -> Self {
        Rational {
            numerator: BigInt::from(value),
            denominator: BigInt::from(1),
        }
    }

    pub fn from_bigint(value: BigInt) -> Self {
        Rational {
            numerator: value,
            denominator: BigInt::from(1),
        }
    }

    /// Construct from separate numerator/denominator decimal strings, matching
    /// the original's `nada_num_from_fraction` contract: an invalid or zero
    /// denominator reports a division-by-zero and yields zero, rather than
    /// propagating a Rust error, since callers in the evaluator treat number
    /// construction as infallible.
    pub fn from_fraction_strs(numerator: &str, denominator: &str) -> Result<Self, NumError> {
        let n = BigInt::from_str(numerator).map_err(|_| NumError::InvalidLiteral)?;
        let d = BigInt::from_str(denominator).map_err(|_| NumError::InvalidLiteral)?;
        Self::new_normalized(n, d)
    }

    /// Parse a textual literal: `[+|-]?digits`, `[+|-]?digits/digits`, or
    /// `[+|-]?digits.digits`. The decimal form preserves the *textual*
    /// length of the fractional part when building the denominator's power
    /// of ten (spec.md §4.A / §9): `0.10` is `10/100`, normalized to `1/10`,
    /// not `1/10` built directly from a zero-stripped fraction.
    pub fn parse_literal(text: &str) -> Result<Self, NumError> {
        let (sign, body) = match text.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, text.strip_prefix('+').unwrap_or(text)),
        };

        if body.is_empty() {
            return Err(NumError::InvalidLiteral);
        }

        let rational = if let Some(slash) = body.find('/') {
            let (num_part, den_part) = body.split_at(slash);
            let den_part = &den_part[1..];
            if num_part.is_empty() || den_part.is_empty() {
                return Err(NumError::InvalidLiteral);
            }
            if !num_part.bytes().all(|b| b.is_ascii_digit())
                || !den_part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(NumError::InvalidLiteral);
            }
            Self::from_fraction_strs(num_part, den_part)?
        } else if let Some(dot) = body.find('.') {
            let (int_part, frac_part) = body.split_at(dot);
            let frac_part = &frac_part[1..];
            if !int_part.bytes().all(|b| b.is_ascii_digit())
                || !frac_part.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(NumError::InvalidLiteral);
            }
            let int_part = if int_part.is_empty() { "0" } else { int_part };
            let frac_len = frac_part.len();
            let frac_digits = if frac_part.is_empty() { "0" } else { frac_part };
            let int_val = BigInt::from_str(int_part).map_err(|_| NumError::InvalidLiteral)?;
            let frac_val = BigInt::from_str(frac_digits).map_err(|_| NumError::InvalidLiteral)?;
            let scale = BigInt::from(10).pow(frac_len as u32);
            let numerator = int_val * &scale + frac_val;
            Self::new_normalized(numerator, scale)?
        } else {
            if !body.bytes().all(|b| b.is_ascii_digit()) {
                return Err(NumError::InvalidLiteral);
            }
            let n = BigInt::from_str(body).map_err(|_| NumError::InvalidLiteral)?;
            Self::new_normalized(n, BigInt::from(1))?
        };

        Ok(if sign < 0 {
            Rational {
                numerator: -rational.numerator,
                denominator: rational.denominator,
            }
        } else {
            rational
        })
    }

    pub fn numerator(&self) -> &BigInt {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.numerator.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.denominator == BigInt::from(1)
    }

    pub fn add(&self, other: &Rational) -> Rational {
        let n = &self.numerator * &other.denominator + &other.numerator * &self.denominator;
        let d = &self.denominator * &other.denominator;
        Self::new_normalized(n, d).expect("denominators are always nonzero")
    }

    pub fn sub(&self, other: &Rational) -> Rational {
        let n = &self.numerator * &other.denominator - &other.numerator * &self.denominator;
        let d = &self.denominator * &other.denominator;
        Self::new_normalized(n, d).expect("denominators are always nonzero")
    }

    pub fn mul(&self, other: &Rational) -> Rational {
        let n = &self.numerator * &other.numerator;
        let d = &self.denominator * &other.denominator;
        Self::new_normalized(n, d).expect("denominators are always nonzero")
    }

    pub fn div(&self, other: &Rational) -> Result<Rational, NumError> {
        if other.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        let n = &self.numerator * &other.denominator;
        let d = &self.denominator * &other.numerator;
        Self::new_normalized(n, d)
    }

    pub fn negate(&self) -> Rational {
        Rational {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }

    /// `modulo`: sign of the divisor, result in `[0, |b|)` for `b > 0` and
    /// `(-|b|, 0]` for `b < 0`.
    pub fn modulo(&self, other: &Rational) -> Result<Rational, NumError> {
        if other.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        if !self.is_integer() || !other.is_integer() {
            return Err(NumError::NonIntegerOperand);
        }
        let a = &self.numerator;
        let b = &other.numerator;
        let mut r = a % b;
        if !r.is_zero() && (r.is_negative() != b.is_negative()) {
            r += b;
        }
        Ok(Rational {
            numerator: r,
            denominator: BigInt::from(1),
        })
    }

    /// `remainder`: sign of the dividend.
    pub fn remainder(&self, other: &Rational) -> Result<Rational, NumError> {
        if other.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        if !self.is_integer() || !other.is_integer() {
            return Err(NumError::NonIntegerOperand);
        }
        let r = &self.numerator % &other.numerator;
        Ok(Rational {
            numerator: r,
            denominator: BigInt::from(1),
        })
    }

    /// Integer exponentiation with repeated squaring. Negative exponent of
    /// a nonzero base yields the reciprocal; `0^negative` is an error;
    /// `x^0 == 1`.
    pub fn pow(&self, exponent: &Rational) -> Result<Rational, NumError> {
        if !exponent.is_integer() {
            return Err(NumError::NonIntegerOperand);
        }
        if exponent.is_zero() {
            return Ok(Rational::from_int(1));
        }
        if self.is_zero() && exponent.is_negative() {
            return Err(NumError::ZeroToNegativePower);
        }
        let exp_abs = exponent.numerator.abs();
        let exp_u32 = exp_abs
            .to_u32()
            .expect("exponent magnitude exceeds u32, unsupported by this interpreter");
        let n: BigInt = Pow::pow(self.numerator.clone(), exp_u32);
        let d: BigInt = Pow::pow(self.denominator.clone(), exp_u32);
        let result = Self::new_normalized(n, d).expect("denominators are always nonzero");
        if exponent.is_negative() {
            Rational::from_int(1).div(&result)
        } else {
            Ok(result)
        }
    }

    pub fn cmp(&self, other: &Rational) -> std::cmp::Ordering {
        let lhs = &self.numerator * &other.denominator;
        let rhs = &other.numerator * &self.denominator;
        lhs.cmp(&rhs)
    }

    pub fn to_i64(&self) -> Option<i64> {
        if !self.is_integer() {
            return None;
        }
        self.numerator.to_i64()
    }

    pub fn to_f64(&self) -> f64 {
        // BigInt doesn't implement exact division to f64, so go through
        // string-based f64 parsing of numerator/denominator as a fallback
        // for values outside f64's exact integer range.
        let n = self.numerator.to_f64().unwrap_or(f64::NAN);
        let d = self.denominator.to_f64().unwrap_or(f64::NAN);
        n / d
    }

    /// Fixed-precision decimal rendering, e.g. `"3.14"` for `precision = 2`.
    pub fn to_decimal_string(&self, precision: usize) -> String {
        let negative = self.numerator.is_negative();
        let n = self.numerator.abs();
        let scale = BigInt::from(10).pow(precision as u32);
        let scaled = (&n * &scale) / &self.denominator;
        let s = scaled.to_string();
        let s = if s.len() <= precision {
            format!("{}{}", "0".repeat(precision + 1 - s.len()), s)
        } else {
            s
        };
        let (int_part, frac_part) = s.split_at(s.len() - precision);
        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(int_part);
        if precision > 0 {
            out.push('.');
            out.push_str(frac_part);
        }
        out
    }

    /// Prime factorization of the integer case via trial division.
    pub fn factor(&self) -> Result<Vec<Rational>, NumError> {
        if !self.is_integer() {
            return Err(NumError::NonIntegerOperand);
        }
        let mut n = self.numerator.abs();
        let mut factors = Vec::new();
        if n <= BigInt::from(1) {
            return Ok(factors);
        }
        let mut candidate = BigInt::from(2);
        while &candidate * &candidate <= n {
            while (&n % &candidate).is_zero() {
                factors.push(Rational::from_bigint(candidate.clone()));
                n /= &candidate;
            }
            candidate += 1;
        }
        if n > BigInt::from(1) {
            factors.push(Rational::from_bigint(n));
        }
        Ok(factors)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        Rational::cmp(self, other)
    }
}
