use rakwire::prelude::*;

// ---------------------------------------------------------------------------
// Packet types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
struct PlayerState {
    player: u32,
    tick: u32,
    position: [f32; 3],
    velocity: [f32; 3],
    health: u8,
    grounded: bool,
    emote: Option<String>,
}

impl BitSerializable for PlayerState {
    fn serialize(&self, s: &mut BitStream) -> Result<(), BitStreamError> {
        s.write_u32_compressed(self.player);
        s.write_u32_compressed(self.tick);
        for axis in self.position {
            s.write_f32(axis);
        }
        s.write_vector(self.velocity);
        s.write_u8_compressed(self.health);
        s.write_bool(self.grounded);
        s.write_object(&self.emote)
    }

    fn deserialize(&mut self, s: &mut BitStream) -> Result<(), BitStreamError> {
        self.player = s.read_u32_compressed()?;
        self.tick = s.read_u32_compressed()?;
        for axis in &mut self.position {
            *axis = s.read_f32()?;
        }
        self.velocity = s.read_vector()?;
        self.health = s.read_u8_compressed()?;
        self.grounded = s.read_bool()?;
        s.read_object(&mut self.emote)
    }
}

impl Packet for PlayerState {
    const ID: u8 = 0x87;
}

// ---------------------------------------------------------------------------
// Dumping
// ---------------------------------------------------------------------------

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

fn dump(label: &str, data: &[u8]) {
    let stream = BitStream::from(data);
    println!("{label}: {} bytes", data.len());
    println!("  hex  {stream:x}");
    println!("  bits {stream:b}");
}

fn decode(codec: &BitCodec, data: &[u8]) -> Result<(), RakwireError> {
    match peek_id(data)? {
        PlayerState::ID => {
            let state: PlayerState = codec.decode_packet(data)?;
            tracing::info!(player = state.player, tick = state.tick, "player state");
            println!("{state:#?}");
        }
        id => tracing::warn!(id, "no decoder for packet id"),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    rakwire::init_tracing("info");
    let codec = BitCodec::default();

    // `packet-dump 87 ...` dumps an inbound datagram given as hex.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let data = parse_hex(&args.join("")).ok_or("argument is not a hex byte string")?;
        dump("inbound", &data);
        if let Err(e) = decode(&codec, &data) {
            tracing::error!(error = %e, truncated = e.is_truncated(), "decode failed");
        }
        return Ok(());
    }

    let state = PlayerState {
        player: 12,
        tick: 4410,
        position: [10.5, 64.0, -3.25],
        velocity: [0.0, -9.8, 1.5],
        health: 100,
        grounded: false,
        emote: Some("wave".into()),
    };
    let bytes = codec.encode_packet(&state)?;
    tracing::info!(bytes = bytes.len(), "encoded sample packet");
    dump("outbound", &bytes);
    decode(&codec, &bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("87 0a ff"), Some(vec![0x87, 0x0A, 0xFF]));
        assert_eq!(parse_hex("8"), None);
        assert_eq!(parse_hex("zz"), None);
    }

    #[test]
    fn test_player_state_round_trip() {
        let codec = BitCodec::default();
        let state = PlayerState {
            player: 3,
            tick: 1,
            position: [1.0, 2.0, 3.0],
            health: 55,
            grounded: true,
            ..PlayerState::default()
        };
        let bytes = codec.encode_packet(&state).unwrap();
        let decoded: PlayerState = codec.decode_packet(&bytes).unwrap();
        assert_eq!(decoded, state);
    }
}
