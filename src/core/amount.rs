//! Signed arbitrary-precision amounts.
//!
//! Backends emit amounts in base units, either as a JSON integer or as a
//! decimal string with an optional leading `+`/`-`. The textual rendering
//! splits the magnitude into whole coins and a fixed-width fractional part
//! (`decimal_places` digits). Strings containing a `.` are read back in that
//! same coin notation, so a rendered amount parses to the value it came from.
use std::fmt;

use num::{BigUint, Integer, Zero};
use serde_json::Value;
use thiserror::Error;

/// Explicit sign carried by an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn as_char(self) -> char {
        match self {
            Sign::Plus => '+',
            Sign::Minus => '-',
        }
    }
}

/// Errors raised while reading an amount node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount must be an integer or a decimal string")]
    UnsupportedType,

    #[error("amount '{0}' has no digits")]
    NoDigits(String),

    #[error("amount '{0}' has trailing characters")]
    TrailingCharacters(String),

    #[error("amount '{input}' has more than {decimal_places} fractional digits")]
    TooPrecise { input: String, decimal_places: u32 },
}

/// Non-negative magnitude in base units plus an optional sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigAmount {
    pub sign: Option<Sign>,
    pub magnitude: BigUint,
}

impl BigAmount {
    pub fn new(sign: Option<Sign>, magnitude: BigUint) -> Self {
        Self { sign, magnitude }
    }

    /// Read an amount from the `value` of an `amount` node.
    pub fn from_json(value: &Value, decimal_places: u32) -> Result<Self, AmountError> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_u64() {
                    Ok(Self::from(v))
                } else if let Some(v) = n.as_i64() {
                    // as_u64 failed, so v is negative
                    Ok(Self::new(Some(Sign::Minus), BigUint::from(v.unsigned_abs())))
                } else {
                    Err(AmountError::UnsupportedType)
                }
            }
            Value::String(s) => Self::parse(s, decimal_places),
            _ => Err(AmountError::UnsupportedType),
        }
    }

    /// Parse `[+|-]digits` (base units) or `[+|-]digits.fraction` (coins).
    pub fn parse(input: &str, decimal_places: u32) -> Result<Self, AmountError> {
        let (sign, rest) = match input.as_bytes().first() {
            Some(b'-') => (Some(Sign::Minus), &input[1..]),
            Some(b'+') => (Some(Sign::Plus), &input[1..]),
            _ => (None, input),
        };

        let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, tail) = rest.split_at(int_len);

        let magnitude = match tail.strip_prefix('.') {
            None if tail.is_empty() => {
                if int_digits.is_empty() {
                    return Err(AmountError::NoDigits(input.to_string()));
                }
                scan_decimal(int_digits)
            }
            None => return Err(AmountError::TrailingCharacters(input.to_string())),
            Some(fraction) => {
                let frac_len = fraction.bytes().take_while(u8::is_ascii_digit).count();
                if frac_len != fraction.len() {
                    return Err(AmountError::TrailingCharacters(input.to_string()));
                }
                if int_digits.is_empty() && fraction.is_empty() {
                    return Err(AmountError::NoDigits(input.to_string()));
                }
                if frac_len > decimal_places as usize {
                    return Err(AmountError::TooPrecise {
                        input: input.to_string(),
                        decimal_places,
                    });
                }

                let scale = ten_pow(decimal_places);
                let frac_scale = ten_pow(decimal_places - frac_len as u32);
                scan_decimal(int_digits) * scale + scan_decimal(fraction) * frac_scale
            }
        };

        Ok(Self::new(sign, magnitude))
    }

    /// Render as `[sign]coins.fraction` with exactly `decimal_places` fractional digits.
    pub fn to_decimal_string(&self, decimal_places: u32) -> String {
        let mut out = String::new();
        if let Some(sign) = self.sign {
            out.push(sign.as_char());
        }
        out.push_str(&format_magnitude(&self.magnitude, decimal_places));
        out
    }
}

impl From<u64> for BigAmount {
    fn from(value: u64) -> Self {
        Self::new(None, BigUint::from(value))
    }
}

impl fmt::Display for BigAmount {
    /// Base units, no decimal point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sign) = self.sign {
            write!(f, "{}", sign.as_char())?;
        }
        write!(f, "{}", self.magnitude)
    }
}

fn ten_pow(exp: u32) -> BigUint {
    num::pow(BigUint::from(10u32), exp as usize)
}

fn scan_decimal(digits: &str) -> BigUint {
    if digits.is_empty() {
        return BigUint::zero();
    }
    BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
}

fn format_magnitude(magnitude: &BigUint, decimal_places: u32) -> String {
    if decimal_places == 0 {
        return magnitude.to_string();
    }

    let (whole, fraction) = magnitude.div_rem(&ten_pow(decimal_places));
    format!(
        "{whole}.{fraction:0>width$}",
        fraction = fraction.to_string(),
        width = decimal_places as usize
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_signed_base_units() {
        let amount = BigAmount::parse("-1234500000", 8).unwrap();
        assert_eq!(amount.sign, Some(Sign::Minus));
        assert_eq!(amount.magnitude, BigUint::from(1_234_500_000u64));

        let amount = BigAmount::parse("+7", 8).unwrap();
        assert_eq!(amount.sign, Some(Sign::Plus));

        let amount = BigAmount::parse("42", 8).unwrap();
        assert_eq!(amount.sign, None);
    }

    #[test]
    fn rejects_trailing_characters() {
        assert!(matches!(
            BigAmount::parse("12abc", 8),
            Err(AmountError::TrailingCharacters(_))
        ));
        assert!(matches!(
            BigAmount::parse("1.2.3", 8),
            Err(AmountError::TrailingCharacters(_))
        ));
        assert!(matches!(
            BigAmount::parse("-", 8),
            Err(AmountError::NoDigits(_))
        ));
        assert!(matches!(
            BigAmount::parse("", 8),
            Err(AmountError::NoDigits(_))
        ));
    }

    #[test]
    fn magnitude_beyond_u64_is_kept() {
        let big = "340282366920938463463374607431768211456000";
        let amount = BigAmount::parse(big, 8).unwrap();
        assert_eq!(amount.magnitude.to_string(), big);
    }

    #[test]
    fn formats_with_fixed_fraction() {
        let amount = BigAmount::parse("-1234500000", 5).unwrap();
        assert_eq!(amount.to_decimal_string(5), "-12345.00000");

        let amount = BigAmount::parse("-1234500000", 8).unwrap();
        assert_eq!(amount.to_decimal_string(8), "-12.34500000");

        let amount = BigAmount::parse("5", 8).unwrap();
        assert_eq!(amount.to_decimal_string(8), "0.00000005");

        let amount = BigAmount::parse("5", 0).unwrap();
        assert_eq!(amount.to_decimal_string(0), "5");
    }

    #[test]
    fn rendered_amount_parses_back() {
        for (raw, dp) in [("-1234500000", 8), ("+99", 8), ("0", 8), ("123456789012345678901", 6)] {
            let original = BigAmount::parse(raw, dp).unwrap();
            let rendered = original.to_decimal_string(dp);
            let reparsed = BigAmount::parse(&rendered, dp).unwrap();
            assert_eq!(reparsed, original, "round trip of {raw} via {rendered}");
        }
    }

    #[test]
    fn too_many_fraction_digits_rejected() {
        assert!(matches!(
            BigAmount::parse("1.123", 2),
            Err(AmountError::TooPrecise { .. })
        ));
        assert_eq!(
            BigAmount::parse("1.5", 2).unwrap().magnitude,
            BigUint::from(150u32)
        );
    }

    #[test]
    fn reads_json_values() {
        assert_eq!(
            BigAmount::from_json(&json!(15), 8).unwrap(),
            BigAmount::from(15)
        );
        let negative = BigAmount::from_json(&json!(-15), 8).unwrap();
        assert_eq!(negative.sign, Some(Sign::Minus));
        assert_eq!(negative.magnitude, BigUint::from(15u32));

        assert_eq!(
            BigAmount::from_json(&json!(1.5), 8),
            Err(AmountError::UnsupportedType)
        );
        assert_eq!(
            BigAmount::from_json(&json!([1]), 8),
            Err(AmountError::UnsupportedType)
        );
    }

    #[test]
    fn display_uses_base_units() {
        let amount = BigAmount::parse("-250", 8).unwrap();
        assert_eq!(amount.to_string(), "-250");
    }
}
