//! # Integer and Flag Codecs
//!
//! Byte-to-value primitives shared by the telemetry frame and the command
//! payload parsers.
//!
//! **Integers**: unsigned, big-endian, exact width
//! **Flags**: bit 0 = least significant

use super::protocol::{StatusFlag, StatusFlags};
use crate::error::{DecoderError, Result};

/// Width of a 16-bit field
pub const UINT16_BYTES: usize = 2;

/// Width of a 32-bit field
pub const UINT32_BYTES: usize = 4;

/// Widest integer the accumulator can hold
const MAX_WIDTH: usize = 8;

/// Decode an unsigned big-endian integer of exactly `width` bytes
///
/// # Arguments
///
/// * `bytes` - Field bytes, most significant first
/// * `width` - Expected field width in bytes (at most 8)
///
/// # Returns
///
/// * `Result<u64>` - Decoded value
///
/// # Errors
///
/// Returns `LengthMismatch` if `bytes.len() != width`, and `MalformedFrame`
/// if `width` exceeds 8 bytes.
///
/// # Examples
///
/// ```
/// use counter_uplink::uplink::codec::decode_unsigned_be;
///
/// assert_eq!(decode_unsigned_be(&[0, 0, 1, 200], 4).unwrap(), 456);
/// ```
pub fn decode_unsigned_be(bytes: &[u8], width: usize) -> Result<u64> {
    if width > MAX_WIDTH {
        return Err(DecoderError::MalformedFrame(format!(
            "unsupported integer width {}",
            width
        )));
    }

    if bytes.len() != width {
        return Err(DecoderError::LengthMismatch {
            expected: width,
            actual: bytes.len(),
        });
    }

    Ok(bytes
        .iter()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
}

/// Decode a big-endian `u16` from exactly 2 bytes
pub fn uint16(bytes: &[u8]) -> Result<u16> {
    decode_unsigned_be(bytes, UINT16_BYTES).map(|value| value as u16)
}

/// Decode a big-endian `u32` from exactly 4 bytes
pub fn uint32(bytes: &[u8]) -> Result<u32> {
    decode_unsigned_be(bytes, UINT32_BYTES).map(|value| value as u32)
}

/// Slice `bytes[start..end]`, clamped to the available bytes
///
/// A window past the end yields a shorter (possibly empty) slice, so the
/// width check of the integer decoders reports truncated fields.
pub fn window(bytes: &[u8], start: usize, end: usize) -> &[u8] {
    let end = end.min(bytes.len());
    let start = start.min(end);
    &bytes[start..end]
}

/// Test whether bit `k` of `byte` is set (bit 0 = least significant)
///
/// Bits beyond 7 are never set.
pub fn is_bit_set(byte: u8, k: u32) -> bool {
    byte.checked_shr(k).map_or(false, |shifted| shifted & 1 == 1)
}

/// Decode the telemetry status byte into the set of flags whose bit is set
///
/// Bits 3-7 are unassigned and ignored.
pub fn decode_flags(byte: u8) -> StatusFlags {
    StatusFlag::ALL
        .iter()
        .filter(|&&(_, bit)| is_bit_set(byte, u32::from(bit)))
        .map(|&(flag, _)| flag)
        .collect()
}
