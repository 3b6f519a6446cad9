//! Hex string helpers and hashing.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HexError {
    #[error("hex string must start with 0x: {0}")]
    MissingPrefix(String),

    #[error(transparent)]
    Decode(#[from] hex::FromHexError),

    #[error("decoded bytes are not valid utf-8")]
    Utf8,
}

/// Checks that `value` is `0x` followed by hex digits, and `bytes` long if given.
pub fn is_hex_string(value: &str, bytes: Option<usize>) -> bool {
    let Some(digits) = value.strip_prefix("0x") else {
        return false;
    };
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }
    bytes.map_or(true, |bytes| digits.len() == bytes * 2)
}

/// Checks that `value` is a `0x` prefixed 20 bytes hex string, the checksum isn't verified.
pub fn is_address(value: &str) -> bool {
    is_hex_string(value, Some(20))
}

pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Decodes a `0x` prefixed hex string, odd length strings are left padded.
///
/// # Errors
/// Fails if the prefix is missing or `value` has non hex digits.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, HexError> {
    let Some(digits) = value.strip_prefix("0x") else {
        return Err(HexError::MissingPrefix(value.to_string()));
    };
    decode(digits)
}

/// Hex encoding of the bytes of `value`.
pub fn from_ascii(value: &str) -> String {
    format!("0x{}", hex::encode(value))
}

/// Maps each byte of a hex string to a char, the `0x` prefix is optional.
///
/// # Errors
/// Fails if `value` has non hex digits.
pub fn to_ascii(value: &str) -> Result<String, HexError> {
    Ok(decode(strip_hex_prefix(value))?.into_iter().map(char::from).collect())
}

/// Hex encoding of the utf-8 bytes of `value`.
pub fn from_utf8(value: &str) -> String {
    format!("0x{}", hex::encode(value.as_bytes()))
}

/// Decodes a hex string as utf-8, leading and trailing zero bytes are ignored.
///
/// # Errors
/// Fails if `value` has non hex digits or the bytes aren't valid utf-8.
pub fn to_utf8(value: &str) -> Result<String, HexError> {
    let bytes = decode(strip_hex_prefix(value))?;
    let start = bytes.iter().position(|byte| *byte != 0).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|byte| *byte != 0).map_or(start, |end| end + 1);
    String::from_utf8(bytes[start..end].to_vec()).map_err(|_| HexError::Utf8)
}

/// Keccak-256 of `data` as a `0x` prefixed hex string.
pub fn keccak256(data: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(ethers::utils::keccak256(data)))
}

fn decode(digits: &str) -> Result<Vec<u8>, HexError> {
    if digits.len() % 2 == 1 {
        return Ok(hex::decode(format!("0{digits}"))?);
    }
    Ok(hex::decode(digits)?)
}
