//! # rakwire
//!
//! The bit-level wire layer of a RakNet-style network game stack.
//!
//! rakwire builds and parses datagram payloads. A [`BitStream`] packs
//! fields at bit granularity (with RakNet's compressed integers), and a
//! [`BitCodec`] turns whole [`Packet`]s into bytes and back. Sockets,
//! reliability and connection state live above this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use rakwire::prelude::*;
//!
//! let mut out = BitStream::new();
//! out.write_byte(0x86);
//! out.write_u32_compressed(42);
//! out.write_str("hello").unwrap();
//!
//! let mut inbound = BitStream::from_bytes(out.into_bytes());
//! assert_eq!(inbound.read_byte().unwrap(), 0x86);
//! assert_eq!(inbound.read_u32_compressed().unwrap(), 42);
//! assert_eq!(inbound.read_string().unwrap(), "hello");
//! ```

mod error;
mod logging;

pub use error::RakwireError;
pub use logging::init_tracing;
pub use rakwire_bitstream::{
    BitSerializable, BitStream, BitStreamError, GrowthPolicy, StreamConfig,
};
pub use rakwire_codec::{
    BitCodec, Codec, CodecConfig, CodecError, Packet, peek_id,
};

/// The types most callers need, in one import.
pub mod prelude {
    pub use crate::{
        BitCodec, BitSerializable, BitStream, BitStreamError, Codec,
        CodecConfig, Packet, RakwireError, StreamConfig, peek_id,
    };
}
