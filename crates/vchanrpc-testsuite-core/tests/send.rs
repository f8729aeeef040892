use expect_test::expect;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vchanrpc_cfg::ChannelConfig;
use vchanrpc_dispatch::{
    ClipboardErrorCode, DataKind, PacketType, SendErrorKind, CLIPBOARD_DATA_PARAM_NAME, CLIPBOARD_ERROR_PARAM_NAME,
};
use vchanrpc_rpc::{ChannelType, NamedParam, Role, Variant};
use vchanrpc_testsuite_core::{full_session, init_tracing, ready_session};

#[test]
fn data_send_is_tracked_until_delivery() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();

    let request = session.requests().get(id).unwrap();
    assert_eq!(request.packet_type(), PacketType::CLIPBOARD_DATA_TEXT);
    assert_eq!(request.kind(), DataKind::Generic);
    assert_eq!(request.data_len(), 5);
    assert!(request.on_done().is_some());

    let invoked = session.transport().invoked.last().unwrap();
    assert!(invoked.deliver_when_not_ready);
    assert_eq!(invoked.channel, ChannelType::Control);
    assert_eq!(invoked.message.packet_type(), PacketType::CLIPBOARD_DATA_TEXT);
    assert_eq!(
        invoked.message.params,
        vec![NamedParam::new(CLIPBOARD_DATA_PARAM_NAME, b"hello".as_slice())]
    );
}

#[test]
fn empty_send_is_not_tracked() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);

    let id = session.send_message(PacketType::DND_CANCEL_COPY, &[]).unwrap();

    assert_eq!(id, None);
    assert!(session.requests().is_empty());

    let message = session.transport().last_invoked().unwrap();
    assert_eq!(message.packet_type(), PacketType::DND_CANCEL_COPY);
    assert!(message.params.is_empty());
}

#[test]
fn legacy_drop_data_goes_out_as_rich_clipboard_data() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);

    let id = session
        .send_message(PacketType::LEGACY_DND_DATA, b"drop")
        .unwrap()
        .unwrap();

    assert_eq!(
        session.transport().last_invoked().unwrap().packet_type(),
        PacketType::CLIPBOARD_DATA_CP_CLIPBOARD
    );

    let request = session.requests().get(id).unwrap();
    assert_eq!(request.packet_type(), PacketType::LEGACY_DND_DATA);
    assert_eq!(request.kind(), DataKind::LegacyDropInteraction);
}

#[test]
fn file_chunks_carry_no_completion_callback() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Client);

    let id = session
        .send_message(PacketType::FILE_TRANSFER_DATA_FILE, b"chunk")
        .unwrap()
        .unwrap();

    let request = session.requests().get(id).unwrap();
    assert_eq!(request.kind(), DataKind::FileTransferChunk);
    assert!(request.on_done().is_none());
}

#[test]
fn pending_error_alone_is_a_valid_payload() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);
    session.set_pending_clipboard_error(ClipboardErrorCode::MAX_LIMIT_EXCEEDED);

    let id = session.send_message(PacketType::CLIPBOARD_DATA_CP_CLIPBOARD, &[]).unwrap();

    assert_eq!(id, None);
    assert_eq!(
        session.transport().last_invoked().unwrap().params,
        vec![NamedParam::new(
            CLIPBOARD_ERROR_PARAM_NAME,
            ClipboardErrorCode::MAX_LIMIT_EXCEEDED.value()
        )]
    );
    assert!(session.context().pending_clipboard_error().is_none());
}

#[test]
fn pending_error_is_attached_once() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);
    session.set_pending_clipboard_error(ClipboardErrorCode::MAX_LIMIT_EXCEEDED);

    session.send_message(PacketType::CLIPBOARD_DATA_TEXT, b"trunc").unwrap();
    session.send_message(PacketType::CLIPBOARD_DATA_TEXT, b"next").unwrap();

    let invoked = &session.transport().invoked;
    assert_eq!(invoked.len(), 2);
    assert_eq!(
        invoked[0].message.params,
        vec![
            NamedParam::new(CLIPBOARD_DATA_PARAM_NAME, b"trunc".as_slice()),
            NamedParam::new(CLIPBOARD_ERROR_PARAM_NAME, Variant::UInt32(1)),
        ]
    );
    assert_eq!(
        invoked[1].message.params,
        vec![NamedParam::new(CLIPBOARD_DATA_PARAM_NAME, b"next".as_slice())]
    );
}

#[test]
fn messages_use_the_configured_channel() {
    init_tracing();
    let (session, _log) = ready_session(Role::Server);
    let mut session = session.with_config(ChannelConfig {
        channel_type: ChannelType::Data,
        ..ChannelConfig::default()
    });

    session.send_message(PacketType::FILE_TRANSFER_CONFIG, b"cfg").unwrap();

    let invoked = session.transport().invoked.last().unwrap();
    assert_eq!(invoked.channel, ChannelType::Data);
    assert_eq!(invoked.message.channel, ChannelType::Data);
}

#[test]
fn invoke_failure_destroys_the_message_and_forgets_the_request() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);
    session.transport_mut().fail_invoke = true;

    let error = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap_err();

    assert!(matches!(error.kind(), SendErrorKind::Transport));
    expect!["[invoke] transport failure, caused by: [invoke] failed to invoke message, caused by: peer is gone"]
        .assert_eq(&error.report().to_string());

    assert!(session.requests().is_empty());
    assert!(session.transport().invoked.is_empty());
    assert_eq!(session.transport().destroyed.len(), 1);
}

#[test]
fn append_failure_destroys_the_message_and_forgets_the_request() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);
    session.transport_mut().fail_append = true;

    let error = session.send_message(PacketType::DND_FILE_PATHS, b"/tmp").unwrap_err();

    assert!(matches!(error.kind(), SendErrorKind::Transport));
    assert!(session.requests().is_empty());
    assert_eq!(session.transport().destroyed.len(), 1);
}

#[test]
fn create_failure_builds_nothing() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);
    session.transport_mut().fail_create = true;

    let error = session.send_message(PacketType::CLIPBOARD_STATE, &[3, 0, 0, 0]).unwrap_err();

    assert!(matches!(error.kind(), SendErrorKind::Transport));
    expect!["[create message] transport failure"].assert_eq(&error.to_string());
    assert!(session.requests().is_empty());
    assert!(session.transport().destroyed.is_empty());
}

proptest! {
    #[test]
    fn nothing_is_sent_while_not_ready(command in any::<u32>(), data in proptest::collection::vec(any::<u8>(), 0..64)) {
        let (mut session, _log) = full_session(Role::Server);

        let error = session.send_message(PacketType::new(command), &data).unwrap_err();

        prop_assert!(matches!(error.kind(), SendErrorKind::NotReady));
        prop_assert_eq!(session.transport().created, 0);
        prop_assert!(session.requests().is_empty());
    }
}
