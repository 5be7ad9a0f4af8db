//! Integration tests for packet encoding, dispatch on the ID byte, and
//! handling of truncated datagrams.

use rakwire_bitstream::{BitSerializable, BitStream, BitStreamError};
use rakwire_codec::{BitCodec, Codec, CodecConfig, CodecError, Packet, peek_id};

// =========================================================================
// Test packets
// =========================================================================

#[derive(Debug, Default, Clone, PartialEq)]
struct Chat {
    sender: u32,
    text: String,
    whisper_to: Option<u32>,
}

impl BitSerializable for Chat {
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
        stream.write_u32_compressed(self.sender);
        stream.write_str(&self.text)?;
        stream.write_object(&self.whisper_to)
    }

    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError> {
        self.sender = stream.read_u32_compressed()?;
        self.text = stream.read_string()?;
        stream.read_object(&mut self.whisper_to)
    }
}

impl Packet for Chat {
    const ID: u8 = 0x86;
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Snapshot {
    tick: u32,
    positions: Vec<i16>,
    heading: f32,
    alive: bool,
}

impl BitSerializable for Snapshot {
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
        stream.write_u32_compressed(self.tick);
        stream.write_object(&self.positions)?;
        stream.write_float16(self.heading, 0.0, 360.0);
        stream.write_bool(self.alive);
        Ok(())
    }

    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError> {
        self.tick = stream.read_u32_compressed()?;
        stream.read_object(&mut self.positions)?;
        self.heading = stream.read_float16(0.0, 360.0)?;
        self.alive = stream.read_bool()?;
        Ok(())
    }
}

impl Packet for Snapshot {
    const ID: u8 = 0x87;
}

#[derive(Debug, PartialEq)]
enum Inbound {
    Chat(Chat),
    Snapshot(Snapshot),
}

fn dispatch(codec: &BitCodec, data: &[u8]) -> Result<Inbound, CodecError> {
    match peek_id(data)? {
        Chat::ID => codec.decode_packet(data).map(Inbound::Chat),
        Snapshot::ID => codec.decode_packet(data).map(Inbound::Snapshot),
        found => Err(CodecError::UnexpectedId {
            expected: Chat::ID,
            found,
        }),
    }
}

fn sample_chat() -> Chat {
    Chat {
        sender: 42,
        text: "gg".into(),
        whisper_to: Some(7),
    }
}

fn sample_snapshot() -> Snapshot {
    Snapshot {
        tick: 90_000,
        positions: vec![-3, 0, 1200],
        heading: 180.0,
        alive: true,
    }
}

// =========================================================================
// Dispatch
// =========================================================================

#[test]
fn test_dispatch_by_id() {
    let codec = BitCodec::default();

    let chat = codec.encode_packet(&sample_chat()).unwrap();
    let snapshot = codec.encode_packet(&sample_snapshot()).unwrap();
    assert_eq!(chat[0], 0x86);
    assert_eq!(snapshot[0], 0x87);

    assert_eq!(
        dispatch(&codec, &chat).unwrap(),
        Inbound::Chat(sample_chat())
    );
    match dispatch(&codec, &snapshot).unwrap() {
        Inbound::Snapshot(s) => {
            assert_eq!(s.tick, 90_000);
            assert_eq!(s.positions, vec![-3, 0, 1200]);
            assert!((s.heading - 180.0).abs() < 0.01);
            assert!(s.alive);
        }
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[test]
fn test_dispatch_unknown_id() {
    let codec = BitCodec::default();
    let err = dispatch(&codec, &[0x01, 0x02]).unwrap_err();
    assert!(matches!(err, CodecError::UnexpectedId { found: 0x01, .. }));
}

// =========================================================================
// Malformed input
// =========================================================================

#[test]
fn test_every_truncation_is_reported_as_truncated() {
    let codec = BitCodec::default();
    let full = codec.encode_packet(&sample_chat()).unwrap();

    for len in 0..full.len() {
        let err = codec.decode_packet::<Chat>(&full[..len]).unwrap_err();
        assert!(err.is_truncated(), "len={len}: {err}");
    }
    assert!(codec.decode_packet::<Chat>(&full).is_ok());
}

#[test]
fn test_extra_datagram_bytes_rejected() {
    let codec = BitCodec::default();
    let mut data = codec.encode_packet(&sample_chat()).unwrap();
    data.extend_from_slice(&[0xAA, 0xBB]);

    assert_eq!(
        codec.decode_packet::<Chat>(&data).unwrap_err(),
        CodecError::TrailingBytes { bytes: 2 }
    );

    let lenient = BitCodec::new(CodecConfig {
        reject_trailing: false,
        ..CodecConfig::default()
    });
    assert_eq!(lenient.decode_packet::<Chat>(&data).unwrap(), sample_chat());
}

// =========================================================================
// Streams shared between values
// =========================================================================

#[test]
fn test_encode_into_and_decode_from_share_a_stream() {
    let codec = BitCodec::default();
    let mut stream = BitStream::new();
    codec.encode_into(&mut stream, &sample_chat()).unwrap();
    codec.encode_into(&mut stream, &sample_snapshot()).unwrap();

    let chat: Chat = codec.decode_from(&mut stream).unwrap();
    let snapshot: Snapshot = codec.decode_from(&mut stream).unwrap();
    assert_eq!(chat, sample_chat());
    assert_eq!(snapshot.positions, sample_snapshot().positions);
    assert!(stream.all_read());
}

#[test]
fn test_codec_from_json_config() {
    let config: CodecConfig =
        serde_json::from_str(r#"{ "stream": { "growth": "exact" } }"#).unwrap();
    let codec = BitCodec::new(config);
    let bytes = codec.encode(&sample_snapshot()).unwrap();
    let decoded: Snapshot = codec.decode(&bytes).unwrap();
    assert_eq!(decoded.tick, 90_000);
}
