//! Integration tests for packstream-client.
//!
//! These tests verify the integration between different modules.

use std::collections::BTreeMap;

use packstream_client::codec::{marker, ExactReader, PackStreamCodec};
use packstream_client::protocol::{
    build_message_with_chunk_size, MessageBuffer, HANDSHAKE_SIZE, MAGIC,
};
use packstream_client::{AuthToken, Client, PackStreamError, Value};
use proptest::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn roundtrip(value: &Value) -> Value {
    let encoded = PackStreamCodec::encode(value).unwrap();
    PackStreamCodec::decode(&encoded).unwrap()
}

fn generate_map(size: usize) -> Value {
    Value::map((0..size).map(|i| (i.to_string(), Value::from("value"))))
}

/// Scenario: Null encodes to a single marker and decodes back.
#[test]
fn test_null_scenario() {
    assert_eq!(PackStreamCodec::encode(&Value::Null).unwrap(), vec![0xC0]);
    assert_eq!(PackStreamCodec::decode(&[0xC0]).unwrap(), Value::Null);
}

/// Scenario: -16 is tiny, -17 needs INT_8.
#[test]
fn test_negative_tiny_boundary_scenario() {
    assert_eq!(PackStreamCodec::encode(&Value::Integer(-16)).unwrap(), vec![0xF0]);
    assert_eq!(
        PackStreamCodec::encode(&Value::Integer(-17)).unwrap(),
        vec![0xC8, 0xEF]
    );
}

/// Scenario: one-character text.
#[test]
fn test_single_char_text_scenario() {
    let encoded = PackStreamCodec::encode(&Value::from("A")).unwrap();
    assert_eq!(encoded, vec![0x81, 0x41]);
    assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), Value::from("A"));
}

/// Scenario: empty map.
#[test]
fn test_empty_map_scenario() {
    let empty = Value::Map(BTreeMap::new());
    assert_eq!(PackStreamCodec::encode(&empty).unwrap(), vec![0xA0]);
    assert_eq!(roundtrip(&empty), empty);
}

/// Scenario: 16 entries escalate to MAP_8 with a one-byte count.
#[test]
fn test_sixteen_entry_map_scenario() {
    let map = generate_map(16);
    let encoded = PackStreamCodec::encode(&map).unwrap();
    assert_eq!(&encoded[..2], &[0xD8, 16]);
    assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), map);
}

/// Scenario: i64::MAX uses INT_64 and survives the round trip.
#[test]
fn test_max_integer_scenario() {
    let encoded = PackStreamCodec::encode(&Value::Integer(i64::MAX)).unwrap();
    assert_eq!(
        encoded,
        vec![0xCB, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(
        PackStreamCodec::decode(&encoded).unwrap(),
        Value::Integer(i64::MAX)
    );
}

/// Every integer class boundary picks the smallest marker and round-trips.
#[test]
fn test_integer_classes_are_minimal() {
    let cases: [(i64, usize); 16] = [
        (i64::MIN, 9),
        (-2_147_483_649, 9),
        (-2_147_483_648, 5),
        (-32_769, 5),
        (-32_768, 3),
        (-129, 3),
        (-128, 2),
        (-17, 2),
        (-16, 1),
        (127, 1),
        (128, 3),
        (32_767, 3),
        (32_768, 5),
        (2_147_483_647, 5),
        (2_147_483_648, 9),
        (i64::MAX, 9),
    ];

    for (i, expected_len) in cases {
        let encoded = PackStreamCodec::encode(&Value::Integer(i)).unwrap();
        assert_eq!(encoded.len(), expected_len, "integer {}", i);
        assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), Value::Integer(i));
    }
}

/// Text and map size classes switch exactly at 16, 256 and 65536.
#[test]
fn test_size_class_boundaries() {
    let text_cases = [
        (0, marker::TINY_TEXT),
        (15, marker::TINY_TEXT | 0x0F),
        (16, marker::TEXT_8),
        (255, marker::TEXT_8),
        (256, marker::TEXT_16),
        (65_535, marker::TEXT_16),
        (65_536, marker::TEXT_32),
    ];
    for (len, expected_marker) in text_cases {
        let value = Value::from("\0".repeat(len));
        let encoded = PackStreamCodec::encode(&value).unwrap();
        assert_eq!(encoded[0], expected_marker, "text length {}", len);
        assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), value);
    }

    let map_cases = [
        (15, marker::TINY_MAP | 0x0F),
        (16, marker::MAP_8),
        (255, marker::MAP_8),
        (256, marker::MAP_16),
        (65_536, marker::MAP_32),
    ];
    for (size, expected_marker) in map_cases {
        let value = generate_map(size);
        let encoded = PackStreamCodec::encode(&value).unwrap();
        assert_eq!(encoded[0], expected_marker, "map size {}", size);
        assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), value);
    }
}

/// Arbitrary values, nested up to four levels of maps.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::Integer),
        any::<String>().prop_map(Value::Text),
    ];
    leaf.prop_recursive(4, 64, 20, |inner| {
        prop::collection::btree_map(any::<String>(), inner, 0..20).prop_map(Value::Map)
    })
}

/// Encoded size of the smallest integer class holding `i`.
fn smallest_integer_len(i: i64) -> usize {
    match i {
        -16..=127 => 1,
        -128..=127 => 2,
        -32_768..=32_767 => 3,
        -2_147_483_648..=2_147_483_647 => 5,
        _ => 9,
    }
}

proptest! {
    #[test]
    fn value_round_trip(value in arb_value()) {
        let encoded = PackStreamCodec::encode(&value).unwrap();
        let (decoded, consumed) = PackStreamCodec::decode_prefix(&encoded).unwrap();
        prop_assert_eq!(&decoded, &value);
        prop_assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn integer_uses_smallest_class(i in any::<i64>()) {
        let encoded = PackStreamCodec::encode(&Value::Integer(i)).unwrap();
        prop_assert_eq!(encoded.len(), smallest_integer_len(i));
        prop_assert_eq!(PackStreamCodec::decode(&encoded).unwrap(), Value::Integer(i));
    }

    #[test]
    fn small_integer_classes(i in -70_000i64..70_000) {
        let encoded = PackStreamCodec::encode(&Value::Integer(i)).unwrap();
        prop_assert_eq!(encoded.len(), smallest_integer_len(i));
    }

    #[test]
    fn text_header_is_minimal(s in "\\PC{0,300}") {
        let encoded = PackStreamCodec::encode(&Value::from(s.as_str())).unwrap();
        let header_len = match s.len() {
            0..=15 => 1,
            16..=255 => 2,
            256..=65_535 => 3,
            _ => 5,
        };
        prop_assert_eq!(encoded.len(), header_len + s.len());
    }
}

/// Nested maps with every variant round-trip through a byte-at-a-time reader.
#[test]
fn test_nested_roundtrip_over_trickling_reader() {
    struct OneByte<'a>(&'a [u8]);

    impl std::io::Read for OneByte<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    let value = Value::map([
        ("name", Value::from("Ada")),
        ("born", Value::Integer(1815)),
        ("alive", Value::Boolean(false)),
        ("spouse", Value::Null),
        (
            "address",
            Value::map([
                ("city", Value::from("London")),
                ("zip", Value::from("x".repeat(300))),
            ]),
        ),
    ]);

    let encoded = PackStreamCodec::encode(&value).unwrap();
    let decoded = PackStreamCodec::read_from(OneByte(&encoded)).unwrap();
    assert_eq!(decoded, value);

    let mut source = ExactReader::new(OneByte(&encoded[..encoded.len() - 1]));
    let err = packstream_client::codec::decode(&mut source).unwrap_err();
    assert!(err.is_unexpected_end());
}

/// A value framed into small chunks and delivered in odd pieces decodes intact.
#[test]
fn test_chunked_message_with_codec_payload() {
    let hello = AuthToken::basic("neo4j", "password").to_value();
    let payload = PackStreamCodec::encode(&hello).unwrap();
    let wire = build_message_with_chunk_size(&payload, 7);

    let mut buffer = MessageBuffer::new();
    let mut messages = Vec::new();
    for piece in wire.chunks(5) {
        messages.extend(buffer.push(piece).unwrap());
    }

    assert_eq!(messages.len(), 1);
    assert_eq!(PackStreamCodec::decode(&messages[0]).unwrap(), hello);
}

/// Short payload after a length header is rejected, not truncated.
#[test]
fn test_short_read_rejection() {
    let err = PackStreamCodec::decode(&[0x8A, b'h', b'e', b'l', b'l', b'o']).unwrap_err();
    assert!(matches!(
        err,
        PackStreamError::UnexpectedEnd {
            expected: 10,
            actual: 5
        }
    ));
}

/// Client over a real TCP loopback: handshake, hello, echo reply.
#[tokio::test]
async fn test_client_against_loopback_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut preamble = [0u8; HANDSHAKE_SIZE];
        socket.read_exact(&mut preamble).await.unwrap();
        assert_eq!(&preamble[..4], &MAGIC);
        socket.write_all(&[0, 0, 1, 4]).await.unwrap();

        let mut buffer = MessageBuffer::new();
        let mut buf = [0u8; 1024];
        let hello = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "client closed before hello");
            if let Some(message) = buffer.push(&buf[..n]).unwrap().pop() {
                break PackStreamCodec::decode(&message).unwrap();
            }
        };

        let reply = Value::map([("server", Value::from("test/1.0")), ("hello", hello)]);
        let payload = PackStreamCodec::encode(&reply).unwrap();
        socket
            .write_all(&packstream_client::protocol::build_message(&payload))
            .await
            .unwrap();
    });

    let mut client = Client::builder()
        .user_agent("integration/1.0")
        .connect(addr)
        .await
        .unwrap();
    assert_eq!(client.version().to_string(), "4.1");

    client
        .hello(&AuthToken::basic("neo4j", "password"))
        .await
        .unwrap();

    let reply = client.receive().await.unwrap();
    let fields = reply.as_map().unwrap();
    assert_eq!(fields["server"], Value::from("test/1.0"));
    let echoed = fields["hello"].as_map().unwrap();
    assert_eq!(echoed["user_agent"], Value::from("integration/1.0"));
    assert_eq!(echoed["principal"], Value::from("neo4j"));

    client.close().await.unwrap();
    server.await.unwrap();
}
