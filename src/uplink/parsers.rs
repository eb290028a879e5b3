//! # Command Payload Parsers
//!
//! One parser per command that carries a payload. Offsets are relative to
//! the start of the payload, i.e. the byte after the command id of a
//! response-style frame.

use super::codec::{uint16, uint32, window, UINT16_BYTES, UINT32_BYTES};
use super::protocol::{
    AccessPointState, CablePosition, CommandValue, CountDirection, SOFTWARE_VERSION_WINDOW,
};
use crate::error::{DecoderError, Result};

/// Payload parser selected through the command registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadParser {
    /// `count_in`, `count_out` as two big-endian u32
    Counts,
    /// `mounting_height` as big-endian u16
    MountingHeight,
    /// `push_period_min` as big-endian u16
    PushPeriod,
    /// `direction`: 1 = IN, else OUT
    CountDirection,
    /// `cable_position`: 1 = LEFT, else RIGHT
    CablePosition,
    /// `state`: 1 = ENABLED, else DISABLED
    AccessPointState,
    /// `software_version` as ASCII, terminator dropped
    SoftwareVersion,
}

impl PayloadParser {
    /// Decode `payload` into this command's value
    ///
    /// # Errors
    ///
    /// Returns `LengthMismatch` or `MalformedFrame` if the payload is too
    /// short for the command's layout.
    pub fn parse(&self, payload: &[u8]) -> Result<CommandValue> {
        match self {
            PayloadParser::Counts => parse_counts(payload),
            PayloadParser::MountingHeight => parse_mounting_height(payload),
            PayloadParser::PushPeriod => parse_push_period(payload),
            PayloadParser::CountDirection => parse_count_direction(payload),
            PayloadParser::CablePosition => parse_cable_position(payload),
            PayloadParser::AccessPointState => parse_access_point_state(payload),
            PayloadParser::SoftwareVersion => parse_software_version(payload),
        }
    }
}

pub fn parse_counts(payload: &[u8]) -> Result<CommandValue> {
    Ok(CommandValue::Counts {
        count_in: uint32(window(payload, 0, UINT32_BYTES))?,
        count_out: uint32(window(payload, UINT32_BYTES, 2 * UINT32_BYTES))?,
    })
}

pub fn parse_mounting_height(payload: &[u8]) -> Result<CommandValue> {
    Ok(CommandValue::MountingHeight {
        mounting_height: uint16(window(payload, 0, UINT16_BYTES))?,
    })
}

/// Push period in minutes
pub fn parse_push_period(payload: &[u8]) -> Result<CommandValue> {
    Ok(CommandValue::PushPeriod {
        push_period_min: uint16(window(payload, 0, UINT16_BYTES))?,
    })
}

pub fn parse_count_direction(payload: &[u8]) -> Result<CommandValue> {
    let direction = if first_byte(payload)? == 1 {
        CountDirection::In
    } else {
        CountDirection::Out
    };
    Ok(CommandValue::Direction { direction })
}

pub fn parse_cable_position(payload: &[u8]) -> Result<CommandValue> {
    let cable_position = if first_byte(payload)? == 1 {
        CablePosition::Left
    } else {
        CablePosition::Right
    };
    Ok(CommandValue::CablePosition { cable_position })
}

pub fn parse_access_point_state(payload: &[u8]) -> Result<CommandValue> {
    let state = if first_byte(payload)? == 1 {
        AccessPointState::Enabled
    } else {
        AccessPointState::Disabled
    };
    Ok(CommandValue::AccessPoint { state })
}

/// Software version string
///
/// The version sits in `payload[1..11]`; the last byte of that window is a
/// terminator and is not part of the string. Shorter payloads use whatever
/// part of the window is present.
pub fn parse_software_version(payload: &[u8]) -> Result<CommandValue> {
    if payload.len() < 2 {
        return Err(DecoderError::MalformedFrame(format!(
            "software version payload too short: {} bytes",
            payload.len()
        )));
    }

    let text = window(payload, 1, 1 + SOFTWARE_VERSION_WINDOW);
    let software_version = text[..text.len() - 1]
        .iter()
        .map(|&byte| char::from(byte))
        .collect();

    Ok(CommandValue::SoftwareVersion { software_version })
}

fn first_byte(payload: &[u8]) -> Result<u8> {
    payload
        .first()
        .copied()
        .ok_or_else(|| DecoderError::MalformedFrame("empty payload".to_string()))
}
