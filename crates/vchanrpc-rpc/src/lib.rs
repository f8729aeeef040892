#![cfg_attr(doc, doc = include_str!("../README.md"))]

mod variant;

pub use variant::*;

use core::fmt;

/// Identifier assigned by the transport to an outbound message, unique while it is in flight.
pub type RequestId = u32;

pub type RpcResult<T> = Result<T, RpcError>;

pub type RpcError = vchanrpc_error::Error<RpcErrorKind>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// The transport could not allocate a new message handle
    CreateMessage,
    /// The parameter at this index does not exist or could not be converted
    ParamUnavailable { index: usize },
    /// A named parameter could not be appended to the message
    AppendParam,
    /// The message could not be queued for delivery
    Invoke,
}

impl std::error::Error for RpcErrorKind {}

impl fmt::Display for RpcErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateMessage => write!(f, "failed to create message"),
            Self::ParamUnavailable { index } => write!(f, "could not retrieve variant at parameter {index}"),
            Self::AppendParam => write!(f, "failed to append named parameter"),
            Self::Invoke => write!(f, "failed to invoke message"),
        }
    }
}

/// Returned by [`RpcTransport::invoke`] when delivery could not be started.
///
/// The message is handed back so the caller can destroy it.
#[derive(Debug)]
pub struct InvokeError<M> {
    pub message: M,
    pub error: RpcError,
}

/// Which side of the connection this plugin instance runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn is_server(self) -> bool {
        matches!(self, Role::Server)
    }

    #[must_use]
    pub fn peer(self) -> Self {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// Selects the underlying object a message is created on and delivered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelType {
    #[default]
    Control,
    Data,
}

impl ChannelType {
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("control") {
            Some(Self::Control)
        } else if name.eq_ignore_ascii_case("data") {
            Some(Self::Data)
        } else {
            None
        }
    }
}

/// Message handle operations offered by the RPC channel runtime.
///
/// All calls are made from the runtime's service thread.
pub trait RpcTransport {
    /// Opaque message handle
    type Message: fmt::Debug;

    fn role(&self) -> Role;

    fn create_message(&mut self, channel: ChannelType) -> RpcResult<Self::Message>;

    fn destroy_message(&mut self, message: Self::Message);

    fn command(&self, message: &Self::Message) -> u32;

    fn set_command(&mut self, message: &mut Self::Message, command: u32);

    fn param_count(&self, message: &Self::Message) -> usize;

    /// Fetches the parameter at `index` along its declared name.
    ///
    /// Names are copied into a buffer of `max_name_len` bytes by the runtime, so anything longer
    /// than `max_name_len - 1` bytes comes back truncated (see [`truncate_param_name`]).
    fn named_param(&self, message: &Self::Message, index: usize, max_name_len: usize) -> RpcResult<NamedParam>;

    fn append_named_param(&mut self, message: &mut Self::Message, name: &str, value: Variant) -> RpcResult<()>;

    fn request_id(&self, message: &Self::Message) -> RequestId;

    /// Queues the message for asynchronous delivery.
    ///
    /// Completion is reported later through [`RpcPlugin::on_done`] or [`RpcPlugin::on_abort`].
    /// With `deliver_when_not_ready`, the runtime must not discard the message while the peer is
    /// still settling.
    fn invoke(
        &mut self,
        message: Self::Message,
        deliver_when_not_ready: bool,
        channel: ChannelType,
    ) -> Result<(), InvokeError<Self::Message>>;
}

/// Callbacks the RPC channel runtime drives on a plugin instance.
pub trait RpcPlugin {
    type Message;

    /// The channel is usable.
    fn on_ready(&mut self);

    /// The channel was disconnected.
    fn on_not_ready(&mut self);

    /// The peer rejected the channel open request.
    fn on_connection_reject(&mut self);

    /// A message was received from the peer.
    fn on_invoke(&mut self, message: &Self::Message);

    /// A previously invoked message was delivered.
    fn on_done(&mut self, request_id: RequestId);

    /// A previously invoked message was discarded by the runtime or the peer.
    fn on_abort(&mut self, request_id: RequestId, user_cancelled: bool, reason: u32);
}

/// Truncates a parameter name the way the runtime does when copying it into a bounded buffer.
pub fn truncate_param_name(name: &str, max_name_len: usize) -> &str {
    let limit = max_name_len.saturating_sub(1);

    if name.len() <= limit {
        return name;
    }

    let mut end = limit;
    while !name.is_char_boundary(end) {
        end -= 1;
    }

    name.get(..end).unwrap_or_default()
}
