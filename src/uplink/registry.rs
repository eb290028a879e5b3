//! # Command Registry
//!
//! Maps (channel, command id) pairs to command descriptors.
//!
//! The table is assembled once by a [`RegistryBuilder`] and is read-only
//! afterwards; decoders borrow it for every call. Wire identifiers are small
//! firmware-defined integers, so adding a command is one `register` call plus
//! one [`PayloadParser`] variant.
//!
//! ## Usage
//!
//! ```
//! use counter_uplink::uplink::registry::CommandRegistry;
//!
//! let mut builder = CommandRegistry::builder();
//! builder.register(2, "CMD_CNT_RST", 1, None).unwrap();
//! let registry = builder.build();
//!
//! assert_eq!(registry.lookup(2, 1).unwrap().name(), "CMD_CNT_RST");
//! assert!(registry.lookup(2, 2).is_err());
//! ```

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::parsers::PayloadParser;
use super::protocol::*;
use crate::error::{DecoderError, Result};

/// Registered name and optional payload parser of a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    name: String,
    parser: Option<PayloadParser>,
}

impl CommandDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parser(&self) -> Option<PayloadParser> {
        self.parser
    }
}

/// Immutable command table
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<(Channel, CommandId), CommandDescriptor>,
}

impl CommandRegistry {
    /// Start an empty builder that rejects duplicate registrations
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build the counter's documented command table
    ///
    /// # Errors
    ///
    /// Only fails if the table itself is inconsistent (out of range or
    /// duplicate entries).
    pub fn standard() -> Result<Self> {
        let mut builder = Self::builder();
        builder
            // Counts
            .register(CHANNEL_COUNTS.into(), "CMD_CNT_RST", 1, None)?
            .register(CHANNEL_COUNTS.into(), "CMD_CNT_GET", 2, Some(PayloadParser::Counts))?
            .register(CHANNEL_COUNTS.into(), "CMD_CNT_SET", 130, None)?
            // Reboot
            .register(CHANNEL_REBOOT.into(), "CMD_DEV_RBT", 1, None)?
            .register(CHANNEL_REBOOT.into(), "CMD_TPC_RST", 2, None)?
            // Software version
            .register(
                CHANNEL_SOFTWARE_VERSION.into(),
                "CMD_GET_SW_VER",
                1,
                Some(PayloadParser::SoftwareVersion),
            )?
            // Access point
            .register(
                CHANNEL_ACCESS_POINT.into(),
                "CMD_GET_AP_STATE",
                1,
                Some(PayloadParser::AccessPointState),
            )?
            .register(CHANNEL_ACCESS_POINT.into(), "CMD_SET_AP_STATE", 129, None)?
            // Rejoin
            .register(CHANNEL_REJOIN.into(), "CMD_FORCE_REJOIN", 1, None)?
            // Counting parameters
            .register(CHANNEL_COUNTING_PARAMS.into(), "CMD_SET_HEIGHT", 129, None)?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_GET_HEIGHT",
                1,
                Some(PayloadParser::MountingHeight),
            )?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_SET_COUNTING_DIRECTION",
                130,
                None,
            )?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_GET_COUNTING_DIRECTION",
                2,
                Some(PayloadParser::CountDirection),
            )?
            .register(CHANNEL_COUNTING_PARAMS.into(), "CMD_SET_PUSH_PERIOD", 131, None)?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_GET_PUSH_PERIOD",
                3,
                Some(PayloadParser::PushPeriod),
            )?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_SET_CABLE_CONNECTION",
                132,
                None,
            )?
            .register(
                CHANNEL_COUNTING_PARAMS.into(),
                "CMD_GET_CABLE_CONNECTION",
                4,
                Some(PayloadParser::CablePosition),
            )?;

        Ok(builder.build())
    }

    /// Look up the descriptor registered for `(channel, command_id)`
    ///
    /// # Errors
    ///
    /// Returns `NotRegistered` if nothing is registered for the pair.
    pub fn lookup(&self, channel: Channel, command_id: CommandId) -> Result<&CommandDescriptor> {
        self.commands
            .get(&(channel, command_id))
            .ok_or(DecoderError::NotRegistered {
                channel,
                command_id,
            })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registered commands ordered by channel, then command id
    pub fn iter(&self) -> impl Iterator<Item = (Channel, CommandId, &CommandDescriptor)> + '_ {
        self.commands
            .iter()
            .map(|(&(channel, command_id), descriptor)| (channel, command_id, descriptor))
    }
}

/// Assembles a [`CommandRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    commands: BTreeMap<(Channel, CommandId), CommandDescriptor>,
    allow_overrides: bool,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let a later registration replace an earlier one for the same pair
    pub fn allow_overrides(mut self, allow: bool) -> Self {
        self.allow_overrides = allow;
        self
    }

    /// Register a command
    ///
    /// # Arguments
    ///
    /// * `channel` - Uplink port (1-223)
    /// * `name` - Command name reported in decoded records
    /// * `command_id` - Command id on that port (0-254)
    /// * `parser` - Payload parser, if the response carries a value
    ///
    /// # Errors
    ///
    /// Returns `ChannelOutOfRange` or `CommandIdOutOfRange` for the bound
    /// that was violated, and `DuplicateCommand` if the pair is already
    /// registered and overrides are not allowed.
    pub fn register(
        &mut self,
        channel: i32,
        name: impl Into<String>,
        command_id: i32,
        parser: Option<PayloadParser>,
    ) -> Result<&mut Self> {
        let channel = validate_channel(channel)?;
        let command_id = validate_command_id(command_id)?;

        if !self.allow_overrides && self.commands.contains_key(&(channel, command_id)) {
            return Err(DecoderError::DuplicateCommand {
                channel,
                command_id,
            });
        }

        if channel == TELEMETRY_CHANNEL {
            warn!(
                "Command {} registered on telemetry channel {} will never be decoded",
                command_id, channel
            );
        }

        let descriptor = CommandDescriptor {
            name: name.into(),
            parser,
        };
        self.commands.insert((channel, command_id), descriptor);

        Ok(self)
    }

    /// Freeze the table
    pub fn build(self) -> CommandRegistry {
        info!("Command registry built with {} commands", self.commands.len());
        CommandRegistry {
            commands: self.commands,
        }
    }
}

fn validate_channel(channel: i32) -> Result<Channel> {
    if !(CHANNEL_MIN..=CHANNEL_MAX).contains(&channel) {
        return Err(DecoderError::ChannelOutOfRange(channel));
    }
    Ok(channel as Channel)
}

fn validate_command_id(command_id: i32) -> Result<CommandId> {
    if !(COMMAND_ID_MIN..=COMMAND_ID_MAX).contains(&command_id) {
        return Err(DecoderError::CommandIdOutOfRange(command_id));
    }
    Ok(command_id as CommandId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut builder = CommandRegistry::builder();
        builder.register(2, "CMD_CNT_RST", 1, None).unwrap();
        let registry = builder.build();

        let descriptor = registry.lookup(2, 1).unwrap();
        assert_eq!(descriptor.name(), "CMD_CNT_RST");
        assert!(descriptor.parser().is_none());
    }

    #[test]
    fn test_lookup_not_registered() {
        let registry = CommandRegistry::builder().build();
        assert!(matches!(
            registry.lookup(2, 1),
            Err(DecoderError::NotRegistered {
                channel: 2,
                command_id: 1
            })
        ));
    }

    #[test]
    fn test_lookup_is_keyed_by_channel_and_id() {
        let mut builder = CommandRegistry::builder();
        builder
            .register(2, "CMD_CNT_GET", 2, Some(PayloadParser::Counts))
            .unwrap()
            .register(3, "CMD_TPC_RST", 2, None)
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.lookup(2, 2).unwrap().name(), "CMD_CNT_GET");
        assert_eq!(registry.lookup(3, 2).unwrap().name(), "CMD_TPC_RST");
        assert!(registry.lookup(4, 2).is_err());
    }

    #[test]
    fn test_register_channel_out_of_range() {
        let mut builder = CommandRegistry::builder();
        assert!(matches!(
            builder.register(0, "X", 1, None),
            Err(DecoderError::ChannelOutOfRange(0))
        ));
        assert!(matches!(
            builder.register(224, "X", 1, None),
            Err(DecoderError::ChannelOutOfRange(224))
        ));
    }

    #[test]
    fn test_register_command_id_out_of_range() {
        let mut builder = CommandRegistry::builder();
        assert!(matches!(
            builder.register(2, "X", -1, None),
            Err(DecoderError::CommandIdOutOfRange(-1))
        ));
        assert!(matches!(
            builder.register(2, "X", 255, None),
            Err(DecoderError::CommandIdOutOfRange(255))
        ));
    }

    #[test]
    fn test_register_bounds_inclusive() {
        let mut builder = CommandRegistry::builder();
        builder.register(1, "LOW", 0, None).unwrap();
        builder.register(223, "HIGH", 254, None).unwrap();
        let registry = builder.build();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup(223, 254).unwrap().name(), "HIGH");
    }

    #[test]
    fn test_register_duplicate_rejected() {
        let mut builder = CommandRegistry::builder();
        builder.register(2, "FIRST", 1, None).unwrap();
        assert!(matches!(
            builder.register(2, "SECOND", 1, None),
            Err(DecoderError::DuplicateCommand {
                channel: 2,
                command_id: 1
            })
        ));
        assert_eq!(builder.build().lookup(2, 1).unwrap().name(), "FIRST");
    }

    #[test]
    fn test_register_duplicate_overrides_when_allowed() {
        let mut builder = CommandRegistry::builder().allow_overrides(true);
        builder.register(2, "FIRST", 1, None).unwrap();
        builder
            .register(2, "SECOND", 1, Some(PayloadParser::Counts))
            .unwrap();
        let registry = builder.build();

        let descriptor = registry.lookup(2, 1).unwrap();
        assert_eq!(descriptor.name(), "SECOND");
        assert_eq!(descriptor.parser(), Some(PayloadParser::Counts));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_standard_table() {
        let registry = CommandRegistry::standard().unwrap();
        assert_eq!(registry.len(), 17);

        let get_counts = registry.lookup(CHANNEL_COUNTS, 2).unwrap();
        assert_eq!(get_counts.name(), "CMD_CNT_GET");
        assert_eq!(get_counts.parser(), Some(PayloadParser::Counts));

        let set_ap = registry.lookup(CHANNEL_ACCESS_POINT, 129).unwrap();
        assert_eq!(set_ap.name(), "CMD_SET_AP_STATE");
        assert!(set_ap.parser().is_none());

        assert_eq!(
            registry
                .lookup(CHANNEL_COUNTING_PARAMS, 4)
                .unwrap()
                .parser(),
            Some(PayloadParser::CablePosition)
        );
        assert!(registry.lookup(TELEMETRY_CHANNEL, 1).is_err());
    }

    #[test]
    fn test_iter_is_ordered() {
        let registry = CommandRegistry::standard().unwrap();
        let keys: Vec<(Channel, CommandId)> = registry.iter().map(|(c, id, _)| (c, id)).collect();

        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first(), Some(&(CHANNEL_COUNTS, 1)));
    }
}
