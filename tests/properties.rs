//! Generated properties and hand-polled futures.

mod common;

use std::time::Duration;

use frame_link::transport::OriginValidator;
use frame_link::{ANY_ORIGIN, MessageId, WireMessage, is_wire_message};
use proptest::prelude::*;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value, json};
use tokio_test::{assert_pending, assert_ready_err, assert_ready_ok};

use common::Harness;

// ============================================================================
// Strategies
// ============================================================================

fn origin() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("https://example.com".to_string()),
        Just("https://example.com:8443".to_string()),
        Just("http://example.com".to_string()),
        "[a-z]{1,8}://[a-z]{1,12}(\\.[a-z]{2,4})?",
        ".{0,24}",
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        ".{0,12}".prop_map(Value::String),
        prop_oneof![Just("request"), Just("response"), Just("event")]
            .prop_map(|s| Value::String(s.to_string())),
    ];

    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(
                (
                    prop_oneof![
                        Just("type".to_string()),
                        Just("id".to_string()),
                        Just("key".to_string()),
                        Just("payload".to_string()),
                        Just("error".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                ),
                0..6,
            )
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_exact_origin_is_string_equality(expected in origin(), actual in origin()) {
        prop_assume!(expected != ANY_ORIGIN);
        let validator = OriginValidator::new(&expected);

        prop_assert_eq!(validator.accepts(&actual), actual == expected);
        prop_assert!(validator.accepts(&expected));
    }

    #[test]
    fn prop_any_origin_accepts_everything(actual in origin()) {
        prop_assert!(OriginValidator::new(ANY_ORIGIN).accepts(&actual));
    }

    #[test]
    fn prop_parse_agrees_with_shape_guard(value in json_value()) {
        prop_assert_eq!(WireMessage::parse(&value).is_some(), is_wire_message(&value));
    }

    #[test]
    fn prop_well_formed_messages_parse(
        id in "[a-z0-9-]{1,20}",
        key in "[a-z:]{1,20}",
        payload in json_value(),
        is_request in any::<bool>(),
    ) {
        let value = json!({
            "type": if is_request { "request" } else { "response" },
            "id": id,
            "key": key,
            "payload": payload,
        });

        let message = WireMessage::parse(&value).expect("well-formed message");
        prop_assert_eq!(message.is_request(), is_request);
        prop_assert_eq!(message.id.as_str(), id.as_str());
        prop_assert_eq!(message.key, key);
        prop_assert!(message.error.is_none());
    }
}

// ============================================================================
// Identifiers
// ============================================================================

#[test]
fn test_generated_ids_are_well_formed() {
    let is_base36 = |s: &str| {
        !s.is_empty()
            && s
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
    };

    for _ in 0..256 {
        let id = MessageId::generate();
        let (time, random) = id.as_str().split_once('-').expect("two components");

        assert!(is_base36(time), "bad time component in {id}");
        assert!(is_base36(random), "bad random component in {id}");
        assert!(random.len() <= 9);
    }
}

#[test]
fn test_generated_ids_are_unique() {
    let ids: FxHashSet<MessageId> = (0..10_000).map(|_| MessageId::generate()).collect();
    assert_eq!(ids.len(), 10_000);
}

// ============================================================================
// Polled Futures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_send_before_connect_is_immediate() {
    let h = Harness::new(Duration::from_millis(1000));

    let mut send = tokio_test::task::spawn(h.link.send_raw("k", Value::Null));
    assert_ready_err!(send.poll());
}

#[tokio::test(start_paused = true)]
async fn test_connect_when_connected_is_immediate() {
    let h = Harness::connected(Duration::from_millis(1000)).await;

    let mut connect = tokio_test::task::spawn(h.link.connect(h.recorder.clone()));
    assert_ready_ok!(connect.poll());
}

#[tokio::test(start_paused = true)]
async fn test_send_waits_for_response() {
    let mut h = Harness::connected(Duration::from_millis(1000)).await;

    let mut send = tokio_test::task::spawn(h.link.send_raw("k", json!(1)));
    assert_pending!(send.poll());

    let outbound = h.outbox.try_next().expect("request posted on first poll");
    h.deliver(common::response_to(&outbound, json!(2)));

    assert!(send.is_woken());
    assert_eq!(assert_ready_ok!(send.poll()), json!(2));
}
