use pretty_assertions::assert_eq;
use vchanrpc_cfg::ChannelConfig;
use vchanrpc_dispatch::{ChannelSession, ChannelState, PacketType, ServiceThread, CLIPBOARD_DATA_PARAM_NAME};
use vchanrpc_rpc::{Role, RpcPlugin as _, Variant};
use vchanrpc_testsuite_core::{
    full_session, init_tracing, ready_session, CopyFeature, Event, EventLog, MockTransport, RecordingPlatform,
    RecordingPlugin,
};

#[test]
fn server_ready_queues_feature_initialization() {
    init_tracing();
    let (mut session, log) = full_session(Role::Server);

    assert_eq!(session.state(), ChannelState::NotReady);

    session.on_ready();

    assert!(session.is_ready());
    assert!(session.service_thread().bound().is_some());
    assert_eq!(
        log.take(),
        vec![
            Event::FileTransferInitConfig,
            Event::Init,
            Event::QueueClipboardCapability,
            Event::QueueClipboardState,
            Event::QueueFileTransferConfig,
            Event::CheckSessionType(CopyFeature::Dnd),
            Event::QueueDndCapability(CopyFeature::Dnd),
        ]
    );
}

#[test]
fn server_ready_stops_setup_when_init_fails() {
    init_tracing();
    let (mut session, log) = full_session(Role::Server);
    session.downcast_plugin_mut::<RecordingPlugin>().unwrap().init_succeeds = false;

    session.on_ready();

    // The transition itself still completes.
    assert!(session.is_ready());
    assert_eq!(log.take(), vec![Event::FileTransferInitConfig, Event::Init]);
}

#[test]
fn client_ready_only_initializes_file_transfer() {
    init_tracing();
    let (mut session, log) = full_session(Role::Client);

    session.on_ready();

    assert!(session.is_ready());
    assert_eq!(log.take(), vec![Event::FileTransferInitConfig]);
    assert!(session.transport().invoked.is_empty());
}

#[test]
fn client_ready_advertises_smart_card_info_when_probing() {
    init_tracing();
    let (session, _log) = full_session(Role::Client);
    let mut session = session.with_config(ChannelConfig {
        client_smart_card_probe: true,
        ..ChannelConfig::default()
    });
    session.downcast_plugin_mut::<RecordingPlugin>().unwrap().smart_card_info = Some(b"reader0".to_vec());

    session.on_ready();

    let message = session.transport().last_invoked().unwrap();
    assert_eq!(message.packet_type(), PacketType::SMART_CARD_INFO);
    assert_eq!(
        message.param(CLIPBOARD_DATA_PARAM_NAME),
        Some(&Variant::Blob(b"reader0".to_vec()))
    );
    assert_eq!(session.requests().len(), 1);
}

#[test]
fn client_probe_without_info_sends_nothing() {
    init_tracing();
    let (session, _log) = full_session(Role::Client);
    let mut session = session.with_config(ChannelConfig {
        client_smart_card_probe: true,
        ..ChannelConfig::default()
    });

    session.on_ready();

    assert_eq!(session.transport().created, 0);
}

#[test]
fn server_not_ready_clears_outstanding_requests() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);

    session.send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello").unwrap();
    session.send_message(PacketType::DND_CONTROLLER_RPC, b"rpc").unwrap();
    assert_eq!(session.requests().len(), 2);

    session.on_not_ready();

    assert_eq!(session.state(), ChannelState::NotReady);
    assert!(session.requests().is_empty());
    assert_eq!(session.service_thread().bound(), None);
    assert_eq!(
        log.take(),
        vec![
            Event::Cleanup { notify: true },
            Event::FileTransferInterrupt { is_server: true },
            Event::NotReady(CopyFeature::Fcp),
            Event::NotReady(CopyFeature::Dnd),
            Event::RemoveTempFolders,
        ]
    );
}

#[test]
fn server_not_ready_unregisters_clipboard_listener() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session
        .downcast_plugin_mut::<RecordingPlugin>()
        .unwrap()
        .listens_for_clipboard_changes = true;

    session.on_not_ready();

    assert_eq!(log.take().first(), Some(&Event::UnregisterClipboardListener));
}

#[test]
fn client_not_ready_keeps_outstanding_requests() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Client);

    session.send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello").unwrap();

    session.on_not_ready();

    assert!(!session.is_ready());
    assert_eq!(session.requests().len(), 1);
    assert_eq!(
        log.take(),
        vec![
            Event::FileTransferInterrupt { is_server: false },
            Event::NotReady(CopyFeature::Fcp),
            Event::NotReady(CopyFeature::Dnd),
            Event::RemoveTempFolders,
        ]
    );
}

#[test]
fn not_ready_without_copy_handlers_keeps_temp_folders() {
    init_tracing();
    let log = EventLog::default();
    let mut session = ChannelSession::new(
        MockTransport::new(Role::Server),
        Box::new(RecordingPlugin::new(log.clone())),
    )
    .with_platform_hooks(Box::new(RecordingPlatform::new(log.clone())));

    session.on_ready();
    log.take();
    session.on_not_ready();

    assert_eq!(log.take(), vec![Event::Cleanup { notify: true }]);
}

#[test]
fn ready_again_after_reconnect() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);

    session.on_not_ready();
    session.on_ready();

    assert!(session.is_ready());
    assert!(session.send_message(PacketType::CLIPBOARD_STATE, &[3, 0, 0, 0]).is_ok());
}

#[test]
fn server_connection_reject_signals_fallback() {
    init_tracing();
    let (mut session, log) = full_session(Role::Server);

    session.on_connection_reject();

    assert_eq!(log.take(), vec![Event::Cleanup { notify: false }, Event::SignalOpenRejected]);
    assert_eq!(session.state(), ChannelState::NotReady);
}

#[test]
fn client_connection_reject_only_cleans_up() {
    init_tracing();
    let (mut session, log) = full_session(Role::Client);

    session.on_connection_reject();

    assert_eq!(log.take(), vec![Event::Cleanup { notify: false }]);
}

#[test]
fn service_thread_rejects_other_threads_once_bound() {
    let mut thread = ServiceThread::default();
    assert!(thread.is_current());

    thread.bind();
    assert!(thread.is_current());

    let moved = thread.clone();
    let on_other_thread = std::thread::spawn(move || moved.is_current()).join().unwrap();
    assert!(!on_other_thread);

    thread.reset();
    let moved = thread.clone();
    assert!(std::thread::spawn(move || moved.is_current()).join().unwrap());
}
