use core::fmt;

use vchanrpc_rpc::{ChannelType, InvokeError, RequestId, RpcTransport, Variant};

use crate::interest::DispatchContext;
use crate::request::{OutstandingRequest, RequestTable};
use crate::validate::{CLIPBOARD_DATA_PARAM_NAME, CLIPBOARD_ERROR_PARAM_NAME};
use crate::PacketType;

pub type SendResult<T> = Result<T, SendError>;

pub type SendError = vchanrpc_error::Error<SendErrorKind>;

#[non_exhaustive]
#[derive(Debug)]
pub enum SendErrorKind {
    /// The channel is not ready, no message was built
    NotReady,
    /// The transport refused to build or queue the message
    Transport,
}

impl std::error::Error for SendErrorKind {}

impl fmt::Display for SendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "channel is not ready"),
            Self::Transport => write!(f, "transport failure"),
        }
    }
}

pub(crate) struct Outbound<'a, T: RpcTransport> {
    pub(crate) transport: &'a mut T,
    pub(crate) requests: &'a mut RequestTable,
    pub(crate) context: &'a mut DispatchContext,
    pub(crate) channel: ChannelType,
}

impl<T: RpcTransport> Outbound<'_, T> {
    /// Builds and queues a message of `packet_type`.
    ///
    /// A request is tracked only when `data` is not empty, its id is returned.
    pub(crate) fn send(self, packet_type: PacketType, data: &[u8]) -> SendResult<Option<RequestId>> {
        let Self {
            transport,
            requests,
            context,
            channel,
        } = self;

        let mut message = transport
            .create_message(channel)
            .map_err(|e| SendError::new("create message", SendErrorKind::Transport).with_source(e))?;

        let wire_type = packet_type.wire_type();
        transport.set_command(&mut message, wire_type.value());

        let mut request_id = None;

        if !data.is_empty() {
            let id = transport.request_id(&message);
            requests.insert(OutstandingRequest::new(id, data.len(), packet_type));
            request_id = Some(id);

            if let Err(e) = transport.append_named_param(&mut message, CLIPBOARD_DATA_PARAM_NAME, Variant::from(data)) {
                requests.take(id);
                transport.destroy_message(message);
                return Err(SendError::new("append data", SendErrorKind::Transport).with_source(e));
            }
        }

        // An error alone is a valid payload, e.g. content exceeding the size limit.
        if let Some(error) = context.take_pending_clipboard_error() {
            debug!(%error, "Attaching pending clipboard error");

            if let Err(e) =
                transport.append_named_param(&mut message, CLIPBOARD_ERROR_PARAM_NAME, Variant::UInt32(error.value()))
            {
                if let Some(id) = request_id {
                    requests.take(id);
                }
                transport.destroy_message(message);
                return Err(SendError::new("append error", SendErrorKind::Transport).with_source(e));
            }
        }

        if let Err(InvokeError { message, error }) = transport.invoke(message, true, channel) {
            if let Some(id) = request_id {
                requests.take(id);
            }
            transport.destroy_message(message);
            return Err(SendError::new("invoke", SendErrorKind::Transport).with_source(error));
        }

        trace!(%packet_type, %wire_type, size = data.len(), ?request_id, "Message queued");

        Ok(request_id)
    }
}
