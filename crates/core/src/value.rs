//! Typed environment values.
//!
//! Values are untyped strings when first read from the environment. The
//! `int` and `bool` directives narrow them in place, so a store may hold any
//! of the variants below.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current value of one environment variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl EnvValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric reading of the value.
    ///
    /// Integers and floats are numeric as-is; strings are numeric when they
    /// hold a decimal literal (see [`parse_number`]). Booleans never are.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) => Some(Number::Float(*f)),
            Self::Str(s) => parse_number(s),
            Self::Absent | Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for EnvValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for EnvValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for EnvValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<EnvValue>> From<Option<T>> for EnvValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// A parsed numeric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// The integer this number equals, if it has no fractional part and fits
    /// in an `i64`.
    pub fn to_integral(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) => {
                // i64::MAX as f64 rounds up to 2^63, which is out of range.
                let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
                (f.fract() == 0.0 && in_range).then_some(f as i64)
            }
        }
    }
}

/// Parse a decimal literal, ignoring surrounding ASCII whitespace.
///
/// Accepts an optional sign, digits with an optional fraction, and an
/// optional exponent: `42`, `-3.5`, `.5`, `1e3`. Rejects `inf`, `nan`, hex
/// and anything with trailing garbage.
pub fn parse_number(text: &str) -> Option<Number> {
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace());
    if !is_decimal_literal(trimmed) {
        return None;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Number::Int(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(Number::Float)
}

/// Integer cast of an arbitrary parameter string.
///
/// A numeric string is truncated toward zero; otherwise the leading
/// `[+-]digits` prefix is used; otherwise the result is `0`.
pub fn integer_cast(text: &str) -> i64 {
    match parse_number(text) {
        Some(Number::Int(i)) => i,
        Some(Number::Float(f)) => f as i64,
        None => leading_integer(text),
    }
}

fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    // Overflow saturates at the i64 bounds.
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_i64, |acc, d| {
            let digit = i64::from(d - b'0');
            if negative {
                acc.saturating_mul(10).saturating_sub(digit)
            } else {
                acc.saturating_mul(10).saturating_add(digit)
            }
        })
}

fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_digits = count_digits(&bytes[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = count_digits(&bytes[pos..]);
        pos += frac_digits;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let exp_digits = count_digits(&bytes[pos..]);
        if exp_digits == 0 {
            return false;
        }
        pos += exp_digits;
    }

    pos == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
