use pretty_assertions::assert_eq;
use rstest::rstest;
use vchanrpc_cfg::ChannelConfig;
use vchanrpc_dispatch::PacketType;
use vchanrpc_rpc::{Role, RpcPlugin as _};
use vchanrpc_testsuite_core::{init_tracing, ready_session, Event};

#[rstest]
#[case(true, vec![Event::DataSent(PacketType::CLIPBOARD_DATA_TEXT)])]
#[case(false, vec![])]
fn delivery_fires_completion_only_when_registered(#[case] registered: bool, #[case] expected: Vec<Event>) {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);

    if registered {
        session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_TEXT);
    }

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    assert!(session.requests().contains(id));

    session.on_done(id);

    assert_eq!(log.take(), expected);
    assert!(!session.requests().contains(id));
}

#[test]
fn completion_matches_the_send_time_packet_type() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_CP_CLIPBOARD);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    session.on_done(id);

    assert_eq!(log.take(), vec![]);
}

#[test]
fn duplicate_done_registrations_fire_once() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session.register_on_done_packet_type(PacketType::DND_CONTROLLER_RPC);
    session.register_on_done_packet_type(PacketType::DND_CONTROLLER_RPC);

    let id = session
        .send_message(PacketType::DND_CONTROLLER_RPC, b"rpc")
        .unwrap()
        .unwrap();
    session.on_done(id);

    assert_eq!(log.take(), vec![Event::DataSent(PacketType::DND_CONTROLLER_RPC)]);
}

#[test]
fn legacy_drop_delivery_reports_rich_clipboard_data() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);

    let id = session
        .send_message(PacketType::LEGACY_DND_DATA, b"drop")
        .unwrap()
        .unwrap();
    session.on_done(id);

    assert_eq!(log.take(), vec![Event::DataSent(PacketType::CLIPBOARD_DATA_CP_CLIPBOARD)]);
    assert!(session.requests().is_empty());
}

#[test]
fn full_chunk_batch_triggers_the_next_one() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Client);

    // The recording backend reports batches of three chunks.
    let ids: Vec<_> = (0..3)
        .map(|_| {
            session
                .send_message(PacketType::FILE_TRANSFER_DATA_FILE, b"chunk")
                .unwrap()
                .unwrap()
        })
        .collect();

    session.on_done(ids[0]);
    session.on_done(ids[1]);
    assert_eq!(session.chunk_send_count(), 2);
    assert_eq!(log.take(), vec![]);

    session.on_done(ids[2]);
    assert_eq!(session.chunk_send_count(), 0);
    assert_eq!(log.take(), vec![Event::SendNextChunks]);
    assert!(session.requests().is_empty());
}

#[test]
fn unknown_delivery_is_ignored() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_TEXT);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    session.on_done(id + 100);

    assert_eq!(log.take(), vec![]);
    assert_eq!(session.requests().len(), 1);
}

#[test]
fn delivery_is_reported_once() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_TEXT);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    session.on_done(id);
    session.on_done(id);

    assert_eq!(log.take(), vec![Event::DataSent(PacketType::CLIPBOARD_DATA_TEXT)]);
}

#[test]
fn abort_purges_the_request() {
    init_tracing();
    let (mut session, log) = ready_session(Role::Server);
    session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_TEXT);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    session.on_abort(id, false, 5);

    assert!(session.requests().is_empty());

    session.on_done(id);
    assert_eq!(log.take(), vec![]);
}

#[test]
fn abort_keeps_the_request_when_purging_is_disabled() {
    init_tracing();
    let (session, log) = ready_session(Role::Server);
    let mut session = session.with_config(ChannelConfig {
        purge_aborted_requests: false,
        ..ChannelConfig::default()
    });
    session.register_on_done_packet_type(PacketType::CLIPBOARD_DATA_TEXT);

    let id = session
        .send_message(PacketType::CLIPBOARD_DATA_TEXT, b"hello")
        .unwrap()
        .unwrap();
    session.on_abort(id, true, 0);

    assert!(session.requests().contains(id));
    assert_eq!(log.take(), vec![]);

    session.on_done(id);
    assert_eq!(log.take(), vec![Event::DataSent(PacketType::CLIPBOARD_DATA_TEXT)]);
}

#[test]
fn every_tracked_send_is_released_by_its_delivery() {
    init_tracing();
    let (mut session, _log) = ready_session(Role::Server);

    let ids: Vec<_> = (1..=8_u8)
        .map(|len| {
            session
                .send_message(PacketType::DND_CONTROLLER_RPC, &vec![0xAB; usize::from(len)])
                .unwrap()
                .unwrap()
        })
        .collect();

    for (delivered, id) in ids.iter().enumerate() {
        assert_eq!(session.requests().iter().filter(|r| r.id() == *id).count(), 1);

        session.on_done(*id);

        assert!(!session.requests().contains(*id));
        assert_eq!(session.requests().len(), ids.len() - delivered - 1);
    }
}
