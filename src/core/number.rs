//! Purpose: Numeric cell codec for the dialect's decimal literals.
//! Exports: `Number`.
//! Role: Only path by which number cells are parsed, formatted, compared and copied.
//! Invariants: Accepted text matches `-?\d+(\.\d+)?`; exponents and locale separators are rejected.
//! Invariants: At most `MAX_DIGITS` digits in total, so every literal fits the decimal backing.
//! Invariants: Formatting preserves the parsed scale so written files re-read cell-for-cell.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::error::{Error, ErrorKind};

/// Digit budget (integer plus fraction digits) shared by the codec, validator and writer.
pub const MAX_DIGITS: usize = 28;

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Number(Decimal);

impl Number {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn parse(text: &str) -> Result<Self, Error> {
        if !is_decimal_literal(text.as_bytes()) {
            return Err(Error::new(ErrorKind::Parse)
                .with_message(format!("malformed number literal `{text}`"))
                .with_hint("Numbers look like 42, -7 or 3.25 (no exponent, no grouping)."));
        }
        if digit_count(text) > MAX_DIGITS {
            return Err(Error::new(ErrorKind::Parse)
                .with_message(format!("number literal `{text}` has more than {MAX_DIGITS} digits")));
        }
        Decimal::from_str_exact(text).map(Self).map_err(|err| {
            Error::new(ErrorKind::Parse)
                .with_message(format!("number literal `{text}` is out of range"))
                .with_source(err)
        })
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// True when the formatted value stays within the dialect's digit budget.
    pub fn is_encodable(&self) -> bool {
        digit_count(&self.to_string()) <= MAX_DIGITS
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl FromStr for Number {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn digit_count(text: &str) -> usize {
    text.bytes().filter(u8::is_ascii_digit).count()
}

// -?\d+(\.\d+)?
pub(crate) fn is_decimal_literal(bytes: &[u8]) -> bool {
    let digits = bytes.strip_prefix(b"-").unwrap_or(bytes);
    let (whole, frac) = match digits.iter().position(|&b| b == b'.') {
        Some(idx) => (&digits[..idx], Some(&digits[idx + 1..])),
        None => (digits, None),
    };
    let all_digits = |part: &[u8]| !part.is_empty() && part.iter().all(u8::is_ascii_digit);
    all_digits(whole) && frac.is_none_or(all_digits)
}
