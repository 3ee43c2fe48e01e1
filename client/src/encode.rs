//! Canonical big-endian field encoding.
//!
//! The wire protocol carries every numeric transaction field as its
//! shortest big-endian byte string: no leading zero byte, and zero is
//! the empty string. Each field also has a protocol-defined ceiling on
//! the encoded length; an over-limit value never reaches the signer.

/// Ceiling for the nonce field, in bytes.
pub const NONCE_MAX_BYTES: usize = 32;
/// Ceiling for the gas price field, in bytes.
pub const GAS_PRICE_MAX_BYTES: usize = 15;
/// Ceiling for the gas limit field, in bytes.
pub const GAS_LIMIT_MAX_BYTES: usize = 15;
/// Ceiling for the value field, in bytes.
pub const VALUE_MAX_BYTES: usize = 32;

/// Encodes `value` as its minimal big-endian byte string.
///
/// Returns `None` if the minimal encoding would exceed `max_bytes`.
/// Zero encodes to an empty vector, never a single zero byte.
pub fn encode_be(value: u128, max_bytes: usize) -> Option<Vec<u8>> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let minimal = &bytes[skip..];
    if minimal.len() > max_bytes {
        return None;
    }
    Some(minimal.to_vec())
}
