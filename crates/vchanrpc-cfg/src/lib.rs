#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[macro_use]
extern crate tracing;

mod file;
mod propertyset;

pub use file::{load, parse, write, Error, ErrorKind, ParseResult};
pub use propertyset::{ExtractFrom, Key, PropertySet, Value};

use vchanrpc_rpc::ChannelType;

pub const CHANNEL_TYPE: &str = "channel type";
pub const PARAM_NAME_MAX_LENGTH: &str = "param name max length";
pub const PURGE_ABORTED_REQUESTS: &str = "purge aborted requests";
pub const CLIENT_SMART_CARD_PROBE: &str = "client smart card probe";

pub trait PropertySetExt {
    fn channel_type(&self) -> Option<&str>;

    fn param_name_max_length(&self) -> Option<usize>;

    fn purge_aborted_requests(&self) -> Option<bool>;

    /// Send the smart card client info right after the channel becomes ready (client only)
    fn client_smart_card_probe(&self) -> Option<bool>;
}

impl PropertySetExt for PropertySet {
    fn channel_type(&self) -> Option<&str> {
        self.get::<&str>(CHANNEL_TYPE)
    }

    fn param_name_max_length(&self) -> Option<usize> {
        self.get::<usize>(PARAM_NAME_MAX_LENGTH)
    }

    fn purge_aborted_requests(&self) -> Option<bool> {
        self.get::<bool>(PURGE_ABORTED_REQUESTS)
    }

    fn client_smart_card_probe(&self) -> Option<bool> {
        self.get::<bool>(CLIENT_SMART_CARD_PROBE)
    }
}

/// Typed configuration consumed by the channel session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Object messages are created on and delivered through
    pub channel_type: ChannelType,
    /// Size of the buffer parameter names are copied into, terminator included
    pub param_name_max_length: usize,
    /// Drop the outstanding request when the runtime aborts its delivery
    pub purge_aborted_requests: bool,
    pub client_smart_card_probe: bool,
}

impl ChannelConfig {
    pub const DEFAULT_PARAM_NAME_MAX_LENGTH: usize = 1024;

    /// Builds the configuration, falling back to defaults for absent or invalid entries.
    pub fn from_properties(properties: &PropertySet) -> Self {
        let default = Self::default();

        let channel_type = match properties.channel_type() {
            Some(name) => ChannelType::from_name(name).unwrap_or_else(|| {
                warn!(name, "Unknown channel type, using the default one");
                default.channel_type
            }),
            None => default.channel_type,
        };

        let param_name_max_length = match properties.param_name_max_length() {
            // The runtime needs room for at least one character and the terminator.
            Some(len) if len >= 2 => len,
            Some(len) => {
                warn!(len, "Parameter name buffer is too small, using the default size");
                default.param_name_max_length
            }
            None => default.param_name_max_length,
        };

        Self {
            channel_type,
            param_name_max_length,
            purge_aborted_requests: properties
                .purge_aborted_requests()
                .unwrap_or(default.purge_aborted_requests),
            client_smart_card_probe: properties
                .client_smart_card_probe()
                .unwrap_or(default.client_smart_card_probe),
        }
    }

    /// Loads `key:type:value` text on top of the defaults.
    ///
    /// Lines that fail to load are logged and skipped.
    pub fn from_text(input: &str) -> Self {
        let ParseResult { properties, errors } = parse(input);

        for error in &errors {
            warn!(%error, "Ignoring configuration entry");
        }

        Self::from_properties(&properties)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_type: ChannelType::Control,
            param_name_max_length: Self::DEFAULT_PARAM_NAME_MAX_LENGTH,
            purge_aborted_requests: true,
            client_smart_card_probe: false,
        }
    }
}
