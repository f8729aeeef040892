use expect_test::expect;
use pretty_assertions::assert_eq;
use vchanrpc_cfg::{ChannelConfig, ParseResult, PropertySet, PropertySetExt as _};
use vchanrpc_rpc::ChannelType;

const CONFIG_SAMPLE: &str = "# vchanrpc channel
channel type:s:data
param name max length:i:256
purge aborted requests:i:0
client smart card probe:i:1
MalformedLine
bogus:z:1";

#[test]
fn parse_file() {
    let ParseResult { properties, errors } = vchanrpc_cfg::parse(CONFIG_SAMPLE);

    expect![[r#"
        {
            "channel type": Str(
                "data",
            ),
            "client smart card probe": Int(
                1,
            ),
            "param name max length": Int(
                256,
            ),
            "purge aborted requests": Int(
                0,
            ),
        }
    "#]]
    .assert_debug_eq(&properties);

    expect![[r#"
        [
            Error {
                kind: MalformedLine {
                    line: "MalformedLine",
                },
                line: 5,
            },
            Error {
                kind: UnknownType {
                    ty: "z",
                },
                line: 6,
            },
        ]
    "#]]
    .assert_debug_eq(&errors);
}

#[test]
fn config_from_text() {
    expect![[r#"
        ChannelConfig {
            channel_type: Data,
            param_name_max_length: 256,
            purge_aborted_requests: false,
            client_smart_card_probe: true,
        }
    "#]]
    .assert_debug_eq(&ChannelConfig::from_text(CONFIG_SAMPLE));
}

#[test]
fn empty_config_is_the_default() {
    let config = ChannelConfig::from_text("");

    assert_eq!(config, ChannelConfig::default());
    assert_eq!(config.channel_type, ChannelType::Control);
    assert_eq!(config.param_name_max_length, 1024);
    assert!(config.purge_aborted_requests);
    assert!(!config.client_smart_card_probe);
}

#[test]
fn invalid_entries_fall_back_to_defaults() {
    let config = ChannelConfig::from_text(
        "channel type:s:pipe
param name max length:i:1
purge aborted requests:s:yes",
    );

    assert_eq!(config, ChannelConfig::default());
}

#[test]
fn unparsable_integer_is_reported() {
    let ParseResult { properties, errors } = vchanrpc_cfg::parse("param name max length:i:abc");

    assert!(properties.is_empty());
    expect![[r#"
        [
            Error {
                kind: InvalidValue {
                    ty: "i",
                    value: "abc",
                },
                line: 0,
            },
        ]
    "#]]
    .assert_debug_eq(&errors);
}

#[test]
fn typed_accessors() {
    let mut properties = PropertySet::new();
    properties.insert("channel type", "control");
    properties.insert("param name max length", 64_u32);
    properties.insert("purge aborted requests", false);

    assert_eq!(properties.channel_type(), Some("control"));
    assert_eq!(properties.param_name_max_length(), Some(64));
    assert_eq!(properties.purge_aborted_requests(), Some(false));
    assert_eq!(properties.client_smart_card_probe(), None);

    // Wrong type
    properties.insert("param name max length", "64");
    assert_eq!(properties.param_name_max_length(), None);
}

#[test]
fn write_file() {
    let ParseResult { properties, .. } = vchanrpc_cfg::parse(CONFIG_SAMPLE);

    expect![[r#"
        channel type:s:data
        client smart card probe:i:1
        param name max length:i:256
        purge aborted requests:i:0
    "#]]
    .assert_eq(&vchanrpc_cfg::write(&properties));
}
