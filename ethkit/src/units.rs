//! Conversions between wei and the named ether denominations.
use ethers::{
    types::U256,
    utils::{format_units, parse_units, ConversionError},
};

#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    #[error("negative amounts are not supported: {0}")]
    Negative(String),

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("too many decimal places in {value}, {unit} has {decimals}")]
    TooManyDecimals { value: String, unit: String, decimals: u32 },

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Number of decimals of `unit`, names are case insensitive.
///
/// # Errors
/// Returns [`UnitError::UnknownUnit`] if the name isn't a known denomination.
pub fn unit_decimals(unit: &str) -> Result<u32, UnitError> {
    let decimals = match unit.to_ascii_lowercase().as_str() {
        "wei" => 0,
        "kwei" | "babbage" | "femtoether" => 3,
        "mwei" | "lovelace" | "picoether" => 6,
        "gwei" | "shannon" | "nanoether" | "nano" => 9,
        "szabo" | "microether" | "micro" => 12,
        "finney" | "milliether" | "milli" => 15,
        "ether" => 18,
        "kether" | "grand" => 21,
        "mether" => 24,
        "gether" => 27,
        "tether" => 30,
        _ => return Err(UnitError::UnknownUnit(unit.to_string())),
    };
    Ok(decimals)
}

/// Formats `value` wei as a decimal amount of `unit`, trailing zero decimals are dropped.
///
/// # Errors
/// Fails if `unit` is unknown.
pub fn from_wei(value: impl Into<U256>, unit: &str) -> Result<String, UnitError> {
    let value: U256 = value.into();
    let formatted = format_units(value, unit_decimals(unit)?)?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    Ok(formatted.trim_end_matches('0').trim_end_matches('.').to_string())
}

/// Parses a decimal amount of `unit` into wei.
///
/// # Errors
/// Fails if `unit` is unknown, if the amount is negative or isn't a decimal number.
pub fn to_wei(value: &str, unit: &str) -> Result<U256, UnitError> {
    let decimals = unit_decimals(unit)?;
    let value = value.trim();
    if value.starts_with('-') {
        return Err(UnitError::Negative(value.to_string()));
    }
    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.len() + fraction.len() == 0 || !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitError::InvalidNumber(value.to_string()));
    }
    // `parse_units` drops the extra digits instead of failing.
    if fraction.len() > decimals as usize {
        return Err(UnitError::TooManyDecimals {
            value: value.to_string(),
            unit: unit.to_string(),
            decimals,
        });
    }
    Ok(parse_units(value, decimals)?.into())
}

/// Parses a `0x` prefixed hex or a decimal number.
///
/// # Errors
/// Returns [`UnitError::InvalidNumber`] if `value` is neither.
pub fn parse_u256(value: &str) -> Result<U256, UnitError> {
    let invalid = || UnitError::InvalidNumber(value.to_string());
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
        None => U256::from_dec_str(value).map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_wei_in_named_units() {
        assert_eq!(from_wei(U256::exp10(18), "ether").unwrap(), "1");
        assert_eq!(from_wei(1_500_000_000_000_000_000u64, "Ether").unwrap(), "1.5");
        assert_eq!(from_wei(1u64, "ether").unwrap(), "0.000000000000000001");
        assert_eq!(from_wei(21_000_000_000u64, "shannon").unwrap(), "21");
        assert_eq!(from_wei(0u64, "gwei").unwrap(), "0");
        assert_eq!(from_wei(1000u64, "wei").unwrap(), "1000");
        assert!(matches!(
            from_wei(1u64, "bitcoin"),
            Err(UnitError::UnknownUnit(unit)) if unit == "bitcoin"
        ));
    }

    #[test]
    fn parses_amounts_into_wei() {
        assert_eq!(to_wei("1.5", "ether").unwrap(), U256::from(1_500_000_000_000_000_000u64));
        assert_eq!(to_wei("2", "GWEI").unwrap(), U256::from(2_000_000_000u64));
        assert_eq!(to_wei("1", "kether").unwrap(), U256::exp10(21));
        assert!(matches!(to_wei("-1", "ether"), Err(UnitError::Negative(_))));
        assert!(matches!(to_wei("1e18", "wei"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(to_wei("", "wei"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(to_wei(".", "ether"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(to_wei("1.2.3", "ether"), Err(UnitError::InvalidNumber(_))));
        assert_eq!(to_wei(".5", "ether").unwrap(), U256::from(500_000_000_000_000_000u64));
        assert_eq!(to_wei("2.", "gwei").unwrap(), U256::from(2_000_000_000u64));
    }

    #[test]
    fn rejects_more_decimals_than_the_unit_has() {
        assert!(matches!(
            to_wei("0.1", "wei"),
            Err(UnitError::TooManyDecimals { decimals: 0, .. })
        ));
        assert!(matches!(
            to_wei("1.0000000001", "gwei"),
            Err(UnitError::TooManyDecimals { decimals: 9, .. })
        ));
        assert_eq!(to_wei("1.000000001", "gwei").unwrap(), U256::from(1_000_000_001u64));
    }

    #[test]
    fn parses_hex_and_decimal_numbers() {
        assert_eq!(parse_u256("0x10").unwrap(), U256::from(16));
        assert_eq!(parse_u256("255").unwrap(), U256::from(255));
        assert!(parse_u256("0x").is_err());
        assert!(parse_u256("0xzz").is_err());
        assert!(parse_u256("12ab").is_err());
    }
}
