//! Packet codecs for rakwire.
//!
//! This crate sits between raw datagrams and application code:
//!
//! - **Codec** ([`Codec`] trait, [`BitCodec`]) encodes whole values to
//!   bytes and back through a [`BitStream`](rakwire_bitstream::BitStream).
//! - **Packets** ([`Packet`], [`peek_id`]) put a fixed ID byte in front of
//!   a value so receivers can dispatch before decoding.
//! - **Config** ([`CodecConfig`]) and **errors** ([`CodecError`]).
//!
//! ```text
//! Transport (datagrams) → Codec (packets) → Game logic
//! ```

mod codec;
mod config;
mod error;

pub use codec::{BitCodec, Codec, Packet, peek_id};
pub use config::CodecConfig;
pub use error::CodecError;
