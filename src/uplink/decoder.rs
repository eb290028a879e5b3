//! # Uplink Decoder
//!
//! Entry point turning one uplink (port + raw bytes) into a decoded record.
//!
//! - Telemetry port: fixed frame, counters and status flags.
//! - Any other port: header classification, registry lookup, then the
//!   command's payload parser for response-style frames.

use tracing::{debug, warn};

use super::codec::{decode_flags, uint32, window, UINT32_BYTES};
use super::header::classify_header;
use super::protocol::*;
use super::registry::CommandRegistry;
use crate::error::{DecoderError, Result};

/// Decode one uplink
///
/// Never fails: frames that cannot be decoded produce an `errors` record.
/// An unregistered command yields exactly `{"errors": ["unknown command"]}`.
///
/// # Examples
///
/// ```
/// use counter_uplink::{decode_uplink, CommandRegistry, UplinkInput};
///
/// let registry = CommandRegistry::standard().unwrap();
/// let input = UplinkInput::new(1, vec![0, 0, 0, 200, 0, 0, 1, 200, 1]);
///
/// let record = decode_uplink(&registry, &input);
/// assert!(record.is_ok());
/// ```
pub fn decode_uplink(registry: &CommandRegistry, input: &UplinkInput) -> DecodedRecord {
    let result = if input.channel == TELEMETRY_CHANNEL {
        decode_telemetry(&input.bytes).map(UplinkData::Telemetry)
    } else {
        decode_command(registry, input.channel, &input.bytes).map(|cmd| UplinkData::Command { cmd })
    };

    match result {
        Ok(data) => DecodedRecord::from_data(data),
        Err(e) => {
            warn!("Rejected uplink on port {}: {}", input.channel, e);
            DecodedRecord::from_error(e.to_string())
        }
    }
}

/// Decode the fixed telemetry frame
///
/// # Arguments
///
/// * `bytes` - count_in(4) + count_out(4) + flags(1)
///
/// # Errors
///
/// Returns error if the frame is shorter than 9 bytes. Trailing bytes are
/// ignored.
pub fn decode_telemetry(bytes: &[u8]) -> Result<TelemetryFrame> {
    let count_in = uint32(window(bytes, 0, UINT32_BYTES))?;
    let count_out = uint32(window(bytes, UINT32_BYTES, 2 * UINT32_BYTES))?;

    let flag_byte = *bytes.get(TELEMETRY_FLAGS_OFFSET).ok_or_else(|| {
        DecoderError::MalformedFrame(format!(
            "telemetry frame too short: expected {} bytes, got {}",
            TELEMETRY_FRAME_SIZE,
            bytes.len()
        ))
    })?;

    debug!(
        "Telemetry frame: in={} out={} flags=0x{:02X}",
        count_in, count_out, flag_byte
    );

    Ok(TelemetryFrame {
        count_in,
        count_out,
        flags: decode_flags(flag_byte),
    })
}

/// Decode a generic command frame on `channel`
///
/// The payload (everything after byte 0) is parsed only for response-style
/// frames whose command has a registered parser.
///
/// # Errors
///
/// Returns `NotRegistered` for an unknown command, `MalformedFrame` for an
/// empty or truncated header, and the parser's error if the payload is too
/// short.
pub fn decode_command(
    registry: &CommandRegistry,
    channel: Channel,
    bytes: &[u8],
) -> Result<CommandRecord> {
    let header = classify_header(bytes)?;
    let descriptor = registry.lookup(channel, header.command_id)?;

    debug!(
        "Command frame on port {}: {} (id {}, {:?}, success={})",
        channel,
        descriptor.name(),
        header.command_id,
        header.kind,
        header.success
    );

    let value = match (header.kind, descriptor.parser()) {
        (FrameKind::Response, Some(parser)) => Some(parser.parse(&bytes[1..])?),
        _ => None,
    };

    Ok(CommandRecord {
        name: descriptor.name().to_string(),
        id: header.command_id,
        success: header.success,
        value,
    })
}
