#![cfg_attr(doc, doc = include_str!("../README.md"))]

#[macro_use]
extern crate tracing;

mod backend;
mod dispatch;
mod interest;
mod packet;
mod request;
mod send;
mod thread;
mod validate;

pub use backend::{CopyMsgHandler, FileTransferBackend, PlatformHooks, PluginBackend};
pub use interest::{DispatchContext, InterestRegistry};
pub use packet::{ClipboardErrorCode, ClipboardPolicy, PacketType};
pub use request::{DataKind, OnDoneHandler, OutstandingRequest, RequestTable};
pub use send::{SendError, SendErrorKind, SendResult};
pub use thread::ServiceThread;
pub use validate::{
    into_payload, validate_data_param, ValidationError, CLIPBOARD_DATA_PARAM_NAME, CLIPBOARD_ERROR_PARAM_NAME,
};

use vchanrpc_cfg::ChannelConfig;
use vchanrpc_rpc::{RequestId, Role, RpcPlugin, RpcTransport};

use crate::backend::Features;
use crate::dispatch::{dispatch, DispatchOutcome};
use crate::send::Outbound;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    NotReady,
    Ready,
}

/// One end of the channel: readiness, inbound routing, outbound sends and their completions.
///
/// The session is driven by the RPC runtime through [`RpcPlugin`], and by the features through
/// [`ChannelSession::send_message`]. Everything happens on the runtime's service thread.
#[derive(Debug)]
pub struct ChannelSession<T: RpcTransport> {
    transport: T,
    state: ChannelState,
    service_thread: ServiceThread,
    chunk_send_count: u32,
    requests: RequestTable,
    context: DispatchContext,
    features: Features,
    config: ChannelConfig,
}

impl<T: RpcTransport> ChannelSession<T> {
    pub fn new(transport: T, plugin: Box<dyn PluginBackend>) -> Self {
        Self {
            transport,
            state: ChannelState::NotReady,
            service_thread: ServiceThread::default(),
            chunk_send_count: 0,
            requests: RequestTable::new(),
            context: DispatchContext::new(),
            features: Features::new(plugin),
            config: ChannelConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: DispatchContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn with_file_transfer(mut self, file_transfer: Box<dyn FileTransferBackend>) -> Self {
        self.features.file_transfer = Some(file_transfer);
        self
    }

    #[must_use]
    pub fn with_dnd_handler(mut self, handler: Box<dyn CopyMsgHandler>) -> Self {
        self.features.dnd = Some(handler);
        self
    }

    #[must_use]
    pub fn with_fcp_handler(mut self, handler: Box<dyn CopyMsgHandler>) -> Self {
        self.features.fcp = Some(handler);
        self
    }

    #[must_use]
    pub fn with_platform_hooks(mut self, hooks: Box<dyn PlatformHooks>) -> Self {
        self.features.platform = Some(hooks);
        self
    }

    pub fn role(&self) -> Role {
        self.transport.role()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ChannelState::Ready
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    pub fn requests(&self) -> &RequestTable {
        &self.requests
    }

    pub fn context(&self) -> &DispatchContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut DispatchContext {
        &mut self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn service_thread(&self) -> &ServiceThread {
        &self.service_thread
    }

    /// Number of file transfer chunks delivered in the current batch.
    pub fn chunk_send_count(&self) -> u32 {
        self.chunk_send_count
    }

    pub fn downcast_plugin<B: PluginBackend>(&self) -> Option<&B> {
        self.features.plugin.as_any().downcast_ref::<B>()
    }

    pub fn downcast_plugin_mut<B: PluginBackend>(&mut self) -> Option<&mut B> {
        self.features.plugin.as_any_mut().downcast_mut::<B>()
    }

    pub fn downcast_file_transfer<B: FileTransferBackend>(&self) -> Option<&B> {
        self.features.file_transfer.as_ref()?.as_any().downcast_ref::<B>()
    }

    pub fn downcast_file_transfer_mut<B: FileTransferBackend>(&mut self) -> Option<&mut B> {
        self.features.file_transfer.as_mut()?.as_any_mut().downcast_mut::<B>()
    }

    /// Sends `data` as a message of `packet_type`.
    ///
    /// Any pending clipboard error is attached, then cleared. When `data` is not empty the
    /// message is tracked until the runtime reports its delivery, and its request id is returned.
    pub fn send_message(&mut self, packet_type: PacketType, data: &[u8]) -> SendResult<Option<RequestId>> {
        self.check_service_thread("send");

        if !self.is_ready() {
            error!(%packet_type, "Channel is not ready, dropping outbound message");
            return Err(SendError::new("send message", SendErrorKind::NotReady));
        }

        let result = Outbound {
            transport: &mut self.transport,
            requests: &mut self.requests,
            context: &mut self.context,
            channel: self.config.channel_type,
        }
        .send(packet_type, data);

        if let Err(e) = &result {
            error!(%packet_type, error = %e.report(), "Failed to send message");
        }

        result
    }

    pub fn register_on_done_packet_type(&mut self, packet_type: PacketType) {
        self.context.register_on_done_packet_type(packet_type);
    }

    pub fn register_on_invoke_packet_type(&mut self, packet_type: PacketType) {
        self.context.register_on_invoke_packet_type(packet_type);
    }

    pub fn set_pending_clipboard_error(&mut self, error: ClipboardErrorCode) {
        self.context.set_pending_clipboard_error(error);
    }

    fn check_service_thread(&self, operation: &'static str) {
        let on_service_thread = self.service_thread.is_current();

        if !on_service_thread {
            warn!(operation, bound = ?self.service_thread.bound(), "Called outside of the service thread");
        }

        debug_assert!(on_service_thread, "{operation} called outside of the service thread");
    }

    fn send_smart_card_probe(&mut self) {
        let Some(info) = self.features.plugin.smart_card_info() else {
            debug!("No smart card information to advertise");
            return;
        };

        if let Err(e) = self.send_message(PacketType::SMART_CARD_INFO, &info) {
            warn!(error = %e.report(), "Failed to advertise smart card information");
        }
    }

    fn on_chunk_sent(&mut self) {
        let Some(file_transfer) = self.features.file_transfer.as_deref_mut() else {
            warn!("File transfer chunk delivered without a file transfer backend");
            return;
        };

        self.chunk_send_count += 1;

        let batch_size = file_transfer.current_chunk_count();
        trace!(sent = self.chunk_send_count, batch_size, "File transfer chunk delivered");

        if self.chunk_send_count == batch_size {
            self.chunk_send_count = 0;
            file_transfer.send_next_chunks();
        }
    }
}

impl<T: RpcTransport> RpcPlugin for ChannelSession<T> {
    type Message = T::Message;

    fn on_ready(&mut self) {
        self.service_thread.bind();
        self.state = ChannelState::Ready;

        let role = self.role();
        info!(%role, "Channel ready");

        if !role.is_server() && self.config.client_smart_card_probe {
            self.send_smart_card_probe();
        }

        if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
            file_transfer.init_config();
        }

        if !role.is_server() {
            return;
        }

        if !self.features.plugin.init() {
            error!("Plugin initialization failed");
            return;
        }

        self.features.plugin.queue_clipboard_capability();
        self.features.plugin.queue_clipboard_state();
        self.features.plugin.queue_file_transfer_config();

        if let Some(dnd) = self.features.dnd.as_deref_mut() {
            dnd.check_session_type();
            dnd.queue_dnd_capability();
        }
    }

    fn on_not_ready(&mut self) {
        self.check_service_thread("on_not_ready");
        self.state = ChannelState::NotReady;

        let role = self.role();
        info!(%role, "Channel not ready");

        if role.is_server() {
            if self.features.plugin.should_listen_for_clipboard_changes() {
                self.features.plugin.queue_unregister_clipboard_listener();
            }

            self.features.plugin.cleanup(true);

            if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
                file_transfer.on_interrupt(true);
            }

            let dropped = self.requests.clear();
            debug!(dropped, "Cleared outstanding requests");
        } else if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
            file_transfer.on_interrupt(false);
        }

        self.chunk_send_count = 0;
        self.service_thread.reset();

        if let Some(fcp) = self.features.fcp.as_deref_mut() {
            fcp.on_recv_not_ready();
        }

        if let Some(dnd) = self.features.dnd.as_deref_mut() {
            dnd.on_recv_not_ready();
        }

        if self.features.has_copy_handlers() {
            if let Some(platform) = self.features.platform.as_deref_mut() {
                platform.remove_temp_folders();
            }
        }
    }

    fn on_connection_reject(&mut self) {
        let role = self.role();
        info!(%role, "Channel connection rejected");

        self.features.plugin.cleanup(false);

        if !role.is_server() {
            return;
        }

        match self.features.platform.as_deref_mut() {
            Some(platform) => {
                if !platform.signal_channel_open_rejected() {
                    error!("Failed to signal the channel open rejection");
                }
            }
            None => debug!("No platform hooks to signal the channel open rejection"),
        }
    }

    fn on_invoke(&mut self, message: &Self::Message) {
        self.check_service_thread("on_invoke");

        let outcome = dispatch(
            &self.transport,
            &mut self.features,
            self.config.param_name_max_length,
            message,
        );

        match outcome {
            DispatchOutcome::Handled(packet_type) => {
                self.context.notify_on_invoke(self.features.plugin.as_mut(), packet_type);
            }
            DispatchOutcome::Rejected(packet_type) => {
                trace!(%packet_type, "Skipping on-invoke notification for rejected packet");
            }
        }
    }

    fn on_done(&mut self, request_id: RequestId) {
        self.check_service_thread("on_done");

        let Some(request) = self.requests.take(request_id) else {
            debug!(request_id, "Delivery confirmed for an unknown request");
            return;
        };

        match request.kind() {
            DataKind::FileTransferChunk => self.on_chunk_sent(),
            DataKind::LegacyDropInteraction => {
                if let Some(handler) = request.on_done() {
                    handler(self.features.plugin.as_mut(), PacketType::CLIPBOARD_DATA_CP_CLIPBOARD);
                }

                debug!(
                    request_id,
                    size = request.data_len(),
                    elapsed = ?request.elapsed(),
                    "Drop interaction data delivered"
                );
            }
            DataKind::Generic => {
                debug!(
                    request_id,
                    packet_type = %request.packet_type(),
                    size = request.data_len(),
                    elapsed = ?request.elapsed(),
                    "Message delivered"
                );

                self.context.notify_on_done(self.features.plugin.as_mut(), &request);
            }
        }
    }

    fn on_abort(&mut self, request_id: RequestId, user_cancelled: bool, reason: u32) {
        self.check_service_thread("on_abort");

        if !self.config.purge_aborted_requests {
            debug!(request_id, user_cancelled, reason, "Message aborted, keeping its request");
            return;
        }

        match self.requests.take(request_id) {
            Some(request) => info!(
                request_id,
                packet_type = %request.packet_type(),
                user_cancelled,
                reason,
                "Message aborted"
            ),
            None => debug!(request_id, user_cancelled, reason, "Abort reported for an unknown request"),
        }
    }
}
