//! # Uplink Decoding Module
//!
//! Decoding of the people counter's LoRaWAN uplinks.
//!
//! This module handles:
//! - Big-endian integer fields and status bit flags
//! - Acknowledgement / response header classification
//! - The per-port command table and payload parsers
//! - Dispatch from (port, bytes) to a decoded record

pub mod protocol;
pub mod codec;
pub mod header;
pub mod parsers;
pub mod registry;
pub mod decoder;
