//! Base unit <-> precision unit conversion
//!
//! Amounts travel through the system as unsigned integers of base units
//! (e.g. wei, satoshis). Precision amounts are decimal strings such as `"1.5"`.
//! Every conversion that drops digits truncates toward zero.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::shared::errors::AmountError;

/// Basis points in a whole
pub const BPS_DENOMINATOR: u32 = 10_000;

fn ten_pow(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

/// Parse an integer amount of base units
pub fn parse_base_unit(value: &str) -> Result<BigUint, AmountError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::InvalidBaseUnit(value.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| AmountError::InvalidBaseUnit(value.to_string()))
}

/// Render base units as a decimal string with `precision` fractional digits
pub fn from_base_unit(amount: &BigUint, precision: u32) -> String {
    if precision == 0 {
        return amount.to_string();
    }

    let divisor = ten_pow(precision);
    let whole = amount / &divisor;
    let fraction = amount % &divisor;
    if fraction.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction.to_string(), width = precision as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Convert a decimal string into base units, truncating digits beyond `precision`
pub fn to_base_unit(value: &str, precision: u32) -> Result<BigUint, AmountError> {
    let invalid = || AmountError::InvalidDecimal(value.to_string());
    let trimmed = value.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let kept: String = fraction.chars().take(precision as usize).collect();
    let digits = format!("{}{:0<width$}", whole, kept, width = precision as usize);
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    digits.parse().map_err(|_| invalid())
}

/// Re-express base units of one precision in another, i.e.
/// `to_base_unit(from_base_unit(amount, from), to)`.
pub fn rescale(amount: &BigUint, from_precision: u32, to_precision: u32) -> BigUint {
    if to_precision >= from_precision {
        amount * ten_pow(to_precision - from_precision)
    } else {
        amount / ten_pow(from_precision - to_precision)
    }
}

/// Serde helpers for base unit amounts as decimal strings
pub mod base_units {
    use num_bigint::BigUint;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_base_unit(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use num_bigint::BigUint;
        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<BigUint>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(amount) => serializer.serialize_some(&amount.to_string()),
                None => serializer.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(value: u64) -> BigUint {
        BigUint::from(value)
    }

    #[test]
    fn test_from_base_unit() {
        assert_eq!(from_base_unit(&big(150_000_000), 8), "1.5");
        assert_eq!(from_base_unit(&big(1), 18), "0.000000000000000001");
        assert_eq!(from_base_unit(&big(42), 0), "42");
        assert_eq!(from_base_unit(&big(2_000_000), 6), "2");
    }

    #[test]
    fn test_to_base_unit_truncates() {
        assert_eq!(to_base_unit("1.5", 8).unwrap(), big(150_000_000));
        assert_eq!(to_base_unit("0.123456789", 6).unwrap(), big(123_456));
        assert_eq!(to_base_unit(".5", 1).unwrap(), big(5));
        assert_eq!(to_base_unit("0.0000001", 6).unwrap(), big(0));
        assert!(to_base_unit("1.2.3", 8).is_err());
        assert!(to_base_unit("-1", 8).is_err());
        assert!(to_base_unit("", 8).is_err());
    }

    #[test]
    fn test_rescale_matches_decimal_round_trip() {
        // 1 ETH (18 decimals) in 8-decimal accounting units
        let one_eth = BigUint::from(10u32).pow(18);
        assert_eq!(rescale(&one_eth, 18, 8), big(100_000_000));
        assert_eq!(
            rescale(&one_eth, 18, 8),
            to_base_unit(&from_base_unit(&one_eth, 18), 8).unwrap()
        );
        // USDC (6 decimals) scales up
        assert_eq!(rescale(&big(1_500_000), 6, 8), big(150_000_000));
        // dust below the target precision is dropped
        assert_eq!(rescale(&big(9_999_999_999), 18, 8), big(0));
    }

    #[test]
    fn test_parse_base_unit() {
        assert_eq!(parse_base_unit("1000").unwrap(), big(1000));
        assert!(parse_base_unit("1.0").is_err());
        assert!(parse_base_unit("").is_err());
        assert!(parse_base_unit("abc").is_err());
    }
}
