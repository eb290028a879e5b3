//! # Error Types
//!
//! Custom error types for the uplink decoder using `thiserror`.

use thiserror::Error;

/// Main error type for the uplink decoder
#[derive(Debug, Error)]
pub enum DecoderError {
    /// Integer field given the wrong number of bytes
    #[error("expected exactly {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Registration channel outside 1..=223
    #[error("channel {0} out of range (must be between 1 and 223)")]
    ChannelOutOfRange(i32),

    /// Registration command id outside 0..=254
    #[error("command id {0} out of range (must be between 0 and 254)")]
    CommandIdOutOfRange(i32),

    /// No descriptor for the (channel, command id) pair
    #[error("unknown command")]
    NotRegistered { channel: u8, command_id: u8 },

    /// Same (channel, command id) registered twice
    #[error("command {command_id} already registered on channel {channel}")]
    DuplicateCommand { channel: u8, command_id: u8 },

    /// Frame too short or otherwise not decodable
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON input/output errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Hex-encoded frame could not be parsed
    #[error("invalid hex payload: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Result type alias for the uplink decoder
pub type Result<T> = std::result::Result<T, DecoderError>;
