//! Chilean RUT (Rol Único Tributario).
//!
//! A RUT is a numeric body followed by a modulo-11 check digit, written as
//! `12.345.678-5`. Workers, dependents and companies are identified by it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Reasons a RUT string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RutError {
    #[error("RUT is empty")]
    Empty,
    #[error("RUT must separate the check digit with '-'")]
    MissingCheckDigit,
    #[error("RUT body must contain only digits")]
    InvalidBody,
    #[error("RUT check digit must be 0-9 or K")]
    InvalidCheckDigit,
    #[error("RUT check digit does not match, expected {expected}")]
    Mismatch { expected: char },
}

/// A validated RUT, stored without dots and with an uppercase check digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rut {
    body: u32,
    check_digit: char,
}

impl Rut {
    /// Parse `12.345.678-5` or `12345678-5`.
    pub fn parse(input: &str) -> Result<Self, RutError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(RutError::Empty);
        }

        let (body, dv) = input.rsplit_once('-').ok_or(RutError::MissingCheckDigit)?;
        let digits: String = body.chars().filter(|c| *c != '.').collect();
        if digits.is_empty() || digits.len() > 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(RutError::InvalidBody);
        }

        let mut dv_chars = dv.chars();
        let check_digit = match (dv_chars.next(), dv_chars.next()) {
            (Some(c), None) if c.is_ascii_digit() || c.eq_ignore_ascii_case(&'k') => {
                c.to_ascii_uppercase()
            }
            _ => return Err(RutError::InvalidCheckDigit),
        };

        let expected = Self::compute_check_digit(&digits);
        if expected != check_digit {
            return Err(RutError::Mismatch { expected });
        }

        let body = digits.parse::<u32>().map_err(|_| RutError::InvalidBody)?;
        Ok(Self { body, check_digit })
    }

    /// Modulo-11 check digit of a digit string.
    ///
    /// Digits are weighted right-to-left by 2..=7, cycling.
    pub fn compute_check_digit(digits: &str) -> char {
        let sum: u32 = digits
            .chars()
            .rev()
            .filter_map(|c| c.to_digit(10))
            .zip((2..=7).cycle())
            .map(|(d, w)| d * w)
            .sum();

        match 11 - (sum % 11) {
            11 => '0',
            10 => 'K',
            n => char::from_digit(n, 10).unwrap_or('0'),
        }
    }

    pub fn check_digit(&self) -> char {
        self.check_digit
    }

    /// Display form with thousands dots: `12.345.678-5`.
    pub fn formatted(&self) -> String {
        let digits = self.body.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        format!("{}-{}", grouped, self.check_digit)
    }
}

/// Canonical storage form: `12345678-5`.
impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.check_digit)
    }
}

impl FromStr for Rut {
    type Err = RutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rut::parse(s)
    }
}

impl Serialize for Rut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rut {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rut::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ruts() {
        for input in ["12.345.678-5", "12345678-5", "11.111.111-1", "7654321-6", "31-0"] {
            assert!(Rut::parse(input).is_ok(), "{input} should be valid");
        }
    }

    #[test]
    fn test_k_check_digit_is_case_insensitive() {
        let rut = Rut::parse("10.000.013-k").unwrap();
        assert_eq!(rut.check_digit(), 'K');
        assert_eq!(rut.to_string(), "10000013-K");
    }

    #[test]
    fn test_wrong_check_digit() {
        assert_eq!(
            Rut::parse("12.345.678-9"),
            Err(RutError::Mismatch { expected: '5' })
        );
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(Rut::parse(""), Err(RutError::Empty));
        assert_eq!(Rut::parse("123456785"), Err(RutError::MissingCheckDigit));
        assert_eq!(Rut::parse("12a45678-5"), Err(RutError::InvalidBody));
        assert_eq!(Rut::parse("-5"), Err(RutError::InvalidBody));
        assert_eq!(Rut::parse("12345678-X"), Err(RutError::InvalidCheckDigit));
        assert_eq!(Rut::parse("12345678-55"), Err(RutError::InvalidCheckDigit));
    }

    #[test]
    fn test_compute_check_digit() {
        assert_eq!(Rut::compute_check_digit("12345678"), '5');
        assert_eq!(Rut::compute_check_digit("10000013"), 'K');
        assert_eq!(Rut::compute_check_digit("31"), '0');
        assert_eq!(Rut::compute_check_digit("76086428"), '5');
    }

    #[test]
    fn test_formatting() {
        let rut = Rut::parse("12345678-5").unwrap();
        assert_eq!(rut.formatted(), "12.345.678-5");
        assert_eq!(Rut::parse("7654321-6").unwrap().formatted(), "7.654.321-6");
        assert_eq!(Rut::parse("31-0").unwrap().formatted(), "31-0");
    }

    #[test]
    fn test_serde_uses_canonical_form() {
        let rut: Rut = serde_json::from_str("\"12.345.678-5\"").unwrap();
        assert_eq!(serde_json::to_string(&rut).unwrap(), "\"12345678-5\"");
        assert!(serde_json::from_str::<Rut>("\"12.345.678-0\"").is_err());
    }
}
