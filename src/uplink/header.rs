//! # Frame Header Classifier
//!
//! Classifies a generic (non-telemetry) frame as an acknowledgement or a
//! response and extracts the command id and success indicator.
//!
//! ```text
//! acknowledgement: [0xFF] [command id] [status: 0xFF = failure, else success]
//! response:        [command id] [payload ...]
//! ```

use super::protocol::{FrameHeader, FrameKind, ACK_FAILURE, ACK_HEADER_SIZE, ACK_SENTINEL};
use crate::error::{DecoderError, Result};

/// Classify the header of a generic frame
///
/// # Errors
///
/// Returns `MalformedFrame` if the frame is empty, or if it starts with the
/// acknowledgement sentinel but is shorter than the 3-byte header.
pub fn classify_header(bytes: &[u8]) -> Result<FrameHeader> {
    let first = *bytes
        .first()
        .ok_or_else(|| DecoderError::MalformedFrame("empty frame".to_string()))?;

    if first != ACK_SENTINEL {
        return Ok(FrameHeader {
            command_id: first,
            kind: FrameKind::Response,
            success: true,
        });
    }

    if bytes.len() < ACK_HEADER_SIZE {
        return Err(DecoderError::MalformedFrame(format!(
            "acknowledgement header too short: expected {} bytes, got {}",
            ACK_HEADER_SIZE,
            bytes.len()
        )));
    }

    Ok(FrameHeader {
        command_id: bytes[1],
        kind: FrameKind::Acknowledgement,
        success: bytes[2] != ACK_FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledgement_success() {
        let header = classify_header(&[0xFF, 129, 0]).unwrap();
        assert_eq!(header.command_id, 129);
        assert_eq!(header.kind, FrameKind::Acknowledgement);
        assert!(header.success);
    }

    #[test]
    fn test_acknowledgement_failure_is_0xff() {
        let header = classify_header(&[0xFF, 130, 0xFF]).unwrap();
        assert_eq!(header.command_id, 130);
        assert!(header.is_acknowledgement());
        assert!(!header.success);
    }

    #[test]
    fn test_acknowledgement_any_other_status_is_success() {
        for status in [0u8, 1, 0x7F, 0xFE] {
            assert!(classify_header(&[0xFF, 1, status]).unwrap().success);
        }
    }

    #[test]
    fn test_response() {
        let header = classify_header(&[2, 0, 0, 0, 200]).unwrap();
        assert_eq!(header.command_id, 2);
        assert_eq!(header.kind, FrameKind::Response);
        assert!(header.success);
    }

    #[test]
    fn test_response_without_payload() {
        let header = classify_header(&[1]).unwrap();
        assert_eq!(header.command_id, 1);
        assert!(!header.is_acknowledgement());
    }

    #[test]
    fn test_empty_frame() {
        assert!(matches!(
            classify_header(&[]),
            Err(DecoderError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_truncated_acknowledgement() {
        assert!(classify_header(&[0xFF]).is_err());
        assert!(classify_header(&[0xFF, 129]).is_err());
    }
}
