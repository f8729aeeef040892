//! Test doubles for the channel session: an in-memory RPC transport and collaborators recording
//! every call they receive into a shared [`EventLog`].

use std::sync::{Arc, Mutex, PoisonError};

use vchanrpc_core::impl_as_any;
use vchanrpc_dispatch::{
    ChannelSession, CopyMsgHandler, FileTransferBackend, PacketType, PlatformHooks, PluginBackend,
};
use vchanrpc_error::StrError;
use vchanrpc_rpc::{
    truncate_param_name, ChannelType, InvokeError, NamedParam, RequestId, Role, RpcError, RpcErrorKind, RpcResult,
    RpcTransport, Variant,
};

/// Installs a subscriber honoring `RUST_LOG`, once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockMessage {
    pub request_id: RequestId,
    pub command: u32,
    pub channel: ChannelType,
    pub params: Vec<NamedParam>,
}

impl MockMessage {
    /// An inbound message of `packet_type`.
    pub fn new(packet_type: PacketType) -> Self {
        Self::raw(packet_type.value())
    }

    pub fn raw(command: u32) -> Self {
        Self {
            request_id: 0,
            command,
            channel: ChannelType::Control,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<Variant>) -> Self {
        self.params.push(NamedParam::new(name, value));
        self
    }

    #[must_use]
    pub fn with_unnamed(mut self, value: impl Into<Variant>) -> Self {
        self.params.push(NamedParam::unnamed(value));
        self
    }

    pub fn packet_type(&self) -> PacketType {
        PacketType::new(self.command)
    }

    pub fn param(&self, name: &str) -> Option<&Variant> {
        self.params.iter().find(|p| p.is_named(name)).map(|p| &p.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokedMessage {
    pub message: MockMessage,
    pub deliver_when_not_ready: bool,
    pub channel: ChannelType,
}

/// In-memory transport handing out sequential request ids, starting at 1.
#[derive(Debug)]
pub struct MockTransport {
    pub role: Role,
    pub next_request_id: RequestId,
    pub fail_create: bool,
    pub fail_append: bool,
    pub fail_invoke: bool,
    pub created: usize,
    pub invoked: Vec<InvokedMessage>,
    pub destroyed: Vec<MockMessage>,
}

impl MockTransport {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            next_request_id: 1,
            fail_create: false,
            fail_append: false,
            fail_invoke: false,
            created: 0,
            invoked: Vec::new(),
            destroyed: Vec::new(),
        }
    }

    pub fn last_invoked(&self) -> Option<&MockMessage> {
        self.invoked.last().map(|invoked| &invoked.message)
    }
}

impl RpcTransport for MockTransport {
    type Message = MockMessage;

    fn role(&self) -> Role {
        self.role
    }

    fn create_message(&mut self, channel: ChannelType) -> RpcResult<MockMessage> {
        if self.fail_create {
            return Err(RpcError::new("create message", RpcErrorKind::CreateMessage)
                .with_source(StrError("out of message handles")));
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.created += 1;

        Ok(MockMessage {
            request_id,
            channel,
            ..MockMessage::raw(0)
        })
    }

    fn destroy_message(&mut self, message: MockMessage) {
        self.destroyed.push(message);
    }

    fn command(&self, message: &MockMessage) -> u32 {
        message.command
    }

    fn set_command(&mut self, message: &mut MockMessage, command: u32) {
        message.command = command;
    }

    fn param_count(&self, message: &MockMessage) -> usize {
        message.params.len()
    }

    fn named_param(&self, message: &MockMessage, index: usize, max_name_len: usize) -> RpcResult<NamedParam> {
        let param = message
            .params
            .get(index)
            .ok_or_else(|| RpcError::new("named param", RpcErrorKind::ParamUnavailable { index }))?;

        Ok(NamedParam {
            name: truncate_param_name(&param.name, max_name_len).to_owned(),
            value: param.value.clone(),
        })
    }

    fn append_named_param(&mut self, message: &mut MockMessage, name: &str, value: Variant) -> RpcResult<()> {
        if self.fail_append {
            return Err(RpcError::new("append param", RpcErrorKind::AppendParam));
        }

        message.params.push(NamedParam::new(name, value));
        Ok(())
    }

    fn request_id(&self, message: &MockMessage) -> RequestId {
        message.request_id
    }

    fn invoke(
        &mut self,
        message: MockMessage,
        deliver_when_not_ready: bool,
        channel: ChannelType,
    ) -> Result<(), InvokeError<MockMessage>> {
        if self.fail_invoke {
            return Err(InvokeError {
                message,
                error: RpcError::new("invoke", RpcErrorKind::Invoke).with_source(StrError("peer is gone")),
            });
        }

        self.invoked.push(InvokedMessage {
            message,
            deliver_when_not_ready,
            channel,
        });

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFeature {
    Dnd,
    Fcp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Init,
    Cleanup { notify: bool },
    QueueClipboardCapability,
    QueueClipboardState,
    QueueFileTransferConfig,
    UnregisterClipboardListener,
    SetClipboardLocale(u32),
    SetClipboardCaps(u32),
    SetClipboardAudit(Vec<u8>),
    SaveSmartCardInfo(Vec<u8>),
    SendClipboardData,
    SetClipboard(PacketType, Vec<u8>),
    DataSent(PacketType),
    InvokeDone(PacketType),

    FileTransferInitConfig,
    FileTransferInterrupt { is_server: bool },
    FileTransferRequest(Vec<u8>),
    FileTransferData(Vec<u8>),
    FileTransferConfig(Vec<u8>),
    SendNextChunks,

    CheckSessionType(CopyFeature),
    QueueDndCapability(CopyFeature),
    DndCapability(CopyFeature, u64),
    DndRpcPacket(CopyFeature, Vec<u8>),
    CopyProgress(CopyFeature, u32),
    CopyDone(CopyFeature, u32),
    ClientTmpFolder(CopyFeature, Vec<u8>),
    FilePaths(CopyFeature, Vec<u8>),
    CancelCopy(CopyFeature),
    StartPasteFiles(CopyFeature),
    NotReady(CopyFeature),

    SignalOpenRejected,
    RemoveTempFolders,
}

/// Calls received by every collaborator of a session, in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Returns the recorded events and forgets them.
    pub fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[derive(Debug)]
pub struct RecordingPlugin {
    pub log: EventLog,
    pub init_succeeds: bool,
    pub listens_for_clipboard_changes: bool,
    pub clipboard_to_client: bool,
    pub clipboard_to_server: bool,
    pub smart_card_info: Option<Vec<u8>>,
}

impl_as_any!(RecordingPlugin);

impl RecordingPlugin {
    /// A plugin with every feature enabled by policy.
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            init_succeeds: true,
            listens_for_clipboard_changes: false,
            clipboard_to_client: true,
            clipboard_to_server: true,
            smart_card_info: None,
        }
    }
}

impl PluginBackend for RecordingPlugin {
    fn init(&mut self) -> bool {
        self.log.push(Event::Init);
        self.init_succeeds
    }

    fn cleanup(&mut self, notify: bool) {
        self.log.push(Event::Cleanup { notify });
    }

    fn queue_clipboard_capability(&mut self) {
        self.log.push(Event::QueueClipboardCapability);
    }

    fn queue_clipboard_state(&mut self) {
        self.log.push(Event::QueueClipboardState);
    }

    fn queue_file_transfer_config(&mut self) {
        self.log.push(Event::QueueFileTransferConfig);
    }

    fn should_listen_for_clipboard_changes(&self) -> bool {
        self.listens_for_clipboard_changes
    }

    fn queue_unregister_clipboard_listener(&mut self) {
        self.log.push(Event::UnregisterClipboardListener);
    }

    fn smart_card_info(&self) -> Option<Vec<u8>> {
        self.smart_card_info.clone()
    }

    fn set_clipboard_locale(&mut self, lang_id: u32) {
        self.log.push(Event::SetClipboardLocale(lang_id));
    }

    fn set_clipboard_caps(&mut self, caps: u32) {
        self.log.push(Event::SetClipboardCaps(caps));
    }

    fn set_clipboard_audit(&mut self, audit: &[u8]) {
        self.log.push(Event::SetClipboardAudit(audit.to_vec()));
    }

    fn save_smart_card_info(&mut self, info: &[u8]) {
        self.log.push(Event::SaveSmartCardInfo(info.to_vec()));
    }

    fn clipboard_to_client_enabled(&self) -> bool {
        self.clipboard_to_client
    }

    fn clipboard_to_server_enabled(&self) -> bool {
        self.clipboard_to_server
    }

    fn send_clipboard_data(&mut self) {
        self.log.push(Event::SendClipboardData);
    }

    fn set_clipboard(&mut self, packet_type: PacketType, data: &[u8]) {
        self.log.push(Event::SetClipboard(packet_type, data.to_vec()));
    }

    fn on_data_sent(&mut self, packet_type: PacketType) {
        self.log.push(Event::DataSent(packet_type));
    }

    fn on_invoke_done(&mut self, packet_type: PacketType) {
        self.log.push(Event::InvokeDone(packet_type));
    }
}

#[derive(Debug)]
pub struct RecordingFileTransfer {
    pub log: EventLog,
    pub to_server: bool,
    pub chunk_count: u32,
}

impl_as_any!(RecordingFileTransfer);

impl RecordingFileTransfer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            to_server: true,
            chunk_count: 3,
        }
    }
}

impl FileTransferBackend for RecordingFileTransfer {
    fn init_config(&mut self) {
        self.log.push(Event::FileTransferInitConfig);
    }

    fn on_interrupt(&mut self, is_server: bool) {
        self.log.push(Event::FileTransferInterrupt { is_server });
    }

    fn receive_request(&mut self, request: &[u8]) {
        self.log.push(Event::FileTransferRequest(request.to_vec()));
    }

    fn receive_file_data(&mut self, data: &[u8]) {
        self.log.push(Event::FileTransferData(data.to_vec()));
    }

    fn receive_config(&mut self, config: &[u8]) {
        self.log.push(Event::FileTransferConfig(config.to_vec()));
    }

    fn to_server_enabled(&self) -> bool {
        self.to_server
    }

    fn current_chunk_count(&self) -> u32 {
        self.chunk_count
    }

    fn send_next_chunks(&mut self) {
        self.log.push(Event::SendNextChunks);
    }
}

#[derive(Debug)]
pub struct RecordingCopyHandler {
    pub log: EventLog,
    pub feature: CopyFeature,
}

impl_as_any!(RecordingCopyHandler);

impl RecordingCopyHandler {
    pub fn new(log: EventLog, feature: CopyFeature) -> Self {
        Self { log, feature }
    }
}

impl CopyMsgHandler for RecordingCopyHandler {
    fn check_session_type(&mut self) {
        self.log.push(Event::CheckSessionType(self.feature));
    }

    fn queue_dnd_capability(&mut self) {
        self.log.push(Event::QueueDndCapability(self.feature));
    }

    fn on_recv_dnd_capability(&mut self, capability: u64) {
        self.log.push(Event::DndCapability(self.feature, capability));
    }

    fn on_recv_dnd_rpc_packet(&mut self, packet: &[u8]) {
        self.log.push(Event::DndRpcPacket(self.feature, packet.to_vec()));
    }

    fn on_recv_copy_progress(&mut self, progress: u32) {
        self.log.push(Event::CopyProgress(self.feature, progress));
    }

    fn on_recv_copy_done(&mut self, result: u32) {
        self.log.push(Event::CopyDone(self.feature, result));
    }

    fn on_recv_client_tmp_folder(&mut self, path: &[u8]) {
        self.log.push(Event::ClientTmpFolder(self.feature, path.to_vec()));
    }

    fn on_recv_file_paths(&mut self, paths: &[u8]) {
        self.log.push(Event::FilePaths(self.feature, paths.to_vec()));
    }

    fn on_recv_cancel_copy(&mut self) {
        self.log.push(Event::CancelCopy(self.feature));
    }

    fn on_recv_start_paste_files(&mut self) {
        self.log.push(Event::StartPasteFiles(self.feature));
    }

    fn on_recv_not_ready(&mut self) {
        self.log.push(Event::NotReady(self.feature));
    }
}

#[derive(Debug)]
pub struct RecordingPlatform {
    pub log: EventLog,
    pub signal_succeeds: bool,
}

impl_as_any!(RecordingPlatform);

impl RecordingPlatform {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            signal_succeeds: true,
        }
    }
}

impl PlatformHooks for RecordingPlatform {
    fn signal_channel_open_rejected(&mut self) -> bool {
        self.log.push(Event::SignalOpenRejected);
        self.signal_succeeds
    }

    fn remove_temp_folders(&mut self) {
        self.log.push(Event::RemoveTempFolders);
    }
}

/// A session with every collaborator attached, sharing one event log.
pub fn full_session(role: Role) -> (ChannelSession<MockTransport>, EventLog) {
    let log = EventLog::default();

    let session = ChannelSession::new(MockTransport::new(role), Box::new(RecordingPlugin::new(log.clone())))
        .with_file_transfer(Box::new(RecordingFileTransfer::new(log.clone())))
        .with_dnd_handler(Box::new(RecordingCopyHandler::new(log.clone(), CopyFeature::Dnd)))
        .with_fcp_handler(Box::new(RecordingCopyHandler::new(log.clone(), CopyFeature::Fcp)))
        .with_platform_hooks(Box::new(RecordingPlatform::new(log.clone())));

    (session, log)
}

/// A session with every collaborator attached, already made ready, with an empty event log.
pub fn ready_session(role: Role) -> (ChannelSession<MockTransport>, EventLog) {
    use vchanrpc_rpc::RpcPlugin as _;

    let (mut session, log) = full_session(role);
    session.on_ready();
    log.take();

    (session, log)
}
