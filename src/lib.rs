//! # Counter Uplink Library
//!
//! Decode LoRaWAN uplinks from a battery-powered people counter.
//!
//! This library turns the raw `FRMPayload` bytes of an uplink, together with
//! its port, into structured records: either the fixed telemetry frame
//! (in/out counters and status flags) or the response to a command looked up
//! in a per-port command table.

pub mod config;
pub mod error;
pub mod uplink;

pub use uplink::decoder::decode_uplink;
pub use uplink::protocol::{DecodedRecord, UplinkInput};
pub use uplink::registry::CommandRegistry;
