//! # Uplink Protocol Constants and Types
//!
//! Wire-level definitions for the counter's uplinks and the records they
//! decode into.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Logical uplink stream (LoRaWAN FPort)
pub type Channel = u8;

/// Command identifier within a channel
pub type CommandId = u8;

/// Port carrying the fixed-layout telemetry frame
pub const TELEMETRY_CHANNEL: Channel = 1;

/// Valid channel range for command registration
pub const CHANNEL_MIN: i32 = 1;
pub const CHANNEL_MAX: i32 = 223;

/// Valid command id range for command registration
pub const COMMAND_ID_MIN: i32 = 0;
pub const COMMAND_ID_MAX: i32 = 254;

/// First byte of an acknowledgement-style frame
pub const ACK_SENTINEL: u8 = 0xFF;

/// Status byte of an acknowledgement-style frame signalling failure.
/// Any other value is success.
pub const ACK_FAILURE: u8 = 0xFF;

/// Acknowledgement header size: sentinel(1) + command id(1) + status(1)
pub const ACK_HEADER_SIZE: usize = 3;

/// Telemetry frame size: count_in(4) + count_out(4) + flags(1)
pub const TELEMETRY_FRAME_SIZE: usize = 9;

/// Offset of the status flag byte in the telemetry frame
pub const TELEMETRY_FLAGS_OFFSET: usize = 8;

/// Software version window length (including the trailing terminator)
pub const SOFTWARE_VERSION_WINDOW: usize = 10;

/// Command channels of the standard device table
pub const CHANNEL_COUNTS: Channel = 2;
pub const CHANNEL_REBOOT: Channel = 3;
pub const CHANNEL_SOFTWARE_VERSION: Channel = 4;
pub const CHANNEL_ACCESS_POINT: Channel = 5;
pub const CHANNEL_REJOIN: Channel = 6;
pub const CHANNEL_COUNTING_PARAMS: Channel = 7;

/// Status flag carried in the telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFlag {
    /// Bit 0: counting stopped
    Stopped,
    /// Bit 1: sensor stuck
    Stuck,
    /// Bit 2: network connection up
    NetworkOn,
}

impl StatusFlag {
    /// All flags with their bit positions (bit 0 = least significant)
    pub const ALL: [(StatusFlag, u8); 3] = [
        (StatusFlag::Stopped, 0),
        (StatusFlag::Stuck, 1),
        (StatusFlag::NetworkOn, 2),
    ];
}

/// Set of flags whose bit was set; absent flags are simply not present
pub type StatusFlags = BTreeSet<StatusFlag>;

/// Kind of a generic (non-telemetry) frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Starts with `ACK_SENTINEL`, carries an explicit status byte
    Acknowledgement,
    /// Command id first, implicitly successful, payload follows
    Response,
}

/// Classified header of a generic frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub command_id: CommandId,
    pub kind: FrameKind,
    pub success: bool,
}

impl FrameHeader {
    pub fn is_acknowledgement(&self) -> bool {
        self.kind == FrameKind::Acknowledgement
    }
}

/// Fixed telemetry frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryFrame {
    pub count_in: u32,
    pub count_out: u32,
    pub flags: StatusFlags,
}

/// Counting direction reported by `CMD_GET_COUNTING_DIRECTION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountDirection {
    In,
    Out,
}

/// Cable side reported by `CMD_GET_CABLE_CONNECTION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CablePosition {
    Left,
    Right,
}

/// Wi-Fi access point state reported by `CMD_GET_AP_STATE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessPointState {
    Enabled,
    Disabled,
}

/// Decoded command payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CommandValue {
    Counts { count_in: u32, count_out: u32 },
    MountingHeight { mounting_height: u16 },
    PushPeriod { push_period_min: u16 },
    Direction { direction: CountDirection },
    CablePosition { cable_position: CablePosition },
    AccessPoint { state: AccessPointState },
    SoftwareVersion { software_version: String },
}

/// Command envelope of a generic frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandRecord {
    pub name: String,
    pub id: CommandId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<CommandValue>,
}

/// Decoded content of an uplink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UplinkData {
    Telemetry(TelemetryFrame),
    Command { cmd: CommandRecord },
}

/// Result of decoding one uplink: data or errors, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DecodedRecord {
    Data {
        data: UplinkData,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<String>,
    },
    Errors {
        errors: Vec<String>,
    },
}

impl DecodedRecord {
    /// Successful record without warnings
    pub fn from_data(data: UplinkData) -> Self {
        DecodedRecord::Data {
            data,
            warnings: Vec::new(),
        }
    }

    /// Failed record with a single error message
    pub fn from_error(message: impl Into<String>) -> Self {
        DecodedRecord::Errors {
            errors: vec![message.into()],
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, DecodedRecord::Data { .. })
    }

    pub fn data(&self) -> Option<&UplinkData> {
        match self {
            DecodedRecord::Data { data, .. } => Some(data),
            DecodedRecord::Errors { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            DecodedRecord::Data { .. } => &[],
            DecodedRecord::Errors { errors } => errors,
        }
    }
}

/// One uplink as delivered by the network server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UplinkInput {
    #[serde(rename = "fPort", alias = "channel")]
    pub channel: Channel,
    pub bytes: Vec<u8>,
}

impl UplinkInput {
    pub fn new(channel: Channel, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            channel,
            bytes: bytes.into(),
        }
    }

    /// Parse a network-server JSON object, e.g. `{"fPort": 1, "bytes": [..]}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build an input from a hex-encoded payload (whitespace is ignored)
    pub fn from_hex(channel: Channel, payload: &str) -> Result<Self> {
        let compact: String = payload.split_whitespace().collect();
        Ok(Self::new(channel, hex::decode(compact)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_constants() {
        assert_eq!(TELEMETRY_CHANNEL, 1);
        assert_eq!(ACK_SENTINEL, 0xFF);
        assert_eq!(ACK_FAILURE, 0xFF);
        assert_eq!(TELEMETRY_FRAME_SIZE, 9);
        assert_eq!(TELEMETRY_FLAGS_OFFSET, TELEMETRY_FRAME_SIZE - 1);
    }

    #[test]
    fn test_status_flag_bits() {
        let bits: Vec<u8> = StatusFlag::ALL.iter().map(|&(_, bit)| bit).collect();
        assert_eq!(bits, vec![0, 1, 2]);
    }

    #[test]
    fn test_telemetry_record_json() {
        let record = DecodedRecord::from_data(UplinkData::Telemetry(TelemetryFrame {
            count_in: 200,
            count_out: 456,
            flags: [StatusFlag::Stopped, StatusFlag::NetworkOn].into_iter().collect(),
        }));

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"data": {"count_in": 200, "count_out": 456, "flags": ["STOPPED", "NETWORK_ON"]}})
        );
    }

    #[test]
    fn test_command_record_json_without_value() {
        let record = DecodedRecord::from_data(UplinkData::Command {
            cmd: CommandRecord {
                name: "CMD_SET_AP_STATE".to_string(),
                id: 129,
                success: false,
                value: None,
            },
        });

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"data": {"cmd": {"name": "CMD_SET_AP_STATE", "id": 129, "success": false}}})
        );
    }

    #[test]
    fn test_command_value_json() {
        let value = CommandValue::Direction {
            direction: CountDirection::In,
        };
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"direction": "IN"}));

        let value = CommandValue::AccessPoint {
            state: AccessPointState::Disabled,
        };
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"state": "DISABLED"}));
    }

    #[test]
    fn test_error_record_json() {
        let record = DecodedRecord::from_error("unknown command");
        assert!(!record.is_ok());
        assert!(record.data().is_none());
        assert_eq!(record.errors(), ["unknown command".to_string()]);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"errors": ["unknown command"]})
        );
    }

    #[test]
    fn test_uplink_input_from_network_server_json() {
        let input: UplinkInput =
            serde_json::from_str(r#"{"fPort": 2, "bytes": [2, 0, 0, 0, 1]}"#).unwrap();
        assert_eq!(input, UplinkInput::new(2, vec![2, 0, 0, 0, 1]));

        let input: UplinkInput = serde_json::from_str(r#"{"channel": 7, "bytes": []}"#).unwrap();
        assert_eq!(input.channel, 7);
        assert!(input.bytes.is_empty());
    }

    #[test]
    fn test_uplink_input_from_json() {
        let input = UplinkInput::from_json(r#"{"fPort": 5, "bytes": [1, 1]}"#).unwrap();
        assert_eq!(input, UplinkInput::new(5, vec![1, 1]));

        assert!(matches!(
            UplinkInput::from_json(r#"{"fPort": 300, "bytes": []}"#),
            Err(crate::error::DecoderError::Json(_))
        ));
        assert!(UplinkInput::from_json("not json").is_err());
    }

    #[test]
    fn test_uplink_input_from_hex() {
        let input = UplinkInput::from_hex(1, "000000C8 000001C8 01").unwrap();
        assert_eq!(input.bytes, vec![0, 0, 0, 200, 0, 0, 1, 200, 1]);

        assert!(matches!(
            UplinkInput::from_hex(1, "0G"),
            Err(crate::error::DecoderError::Hex(_))
        ));
        assert!(UplinkInput::from_hex(1, "ABC").is_err());
    }

    #[test]
    fn test_frame_header_kind() {
        let header = FrameHeader {
            command_id: 1,
            kind: FrameKind::Acknowledgement,
            success: true,
        };
        assert!(header.is_acknowledgement());
    }
}
