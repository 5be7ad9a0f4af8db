//! Bit-level binary stream for the rakwire protocol stack.
//!
//! Every RakNet packet is built and parsed through a [`BitStream`]:
//!
//! - **Bit core** ([`BitStream::write_bits`], [`BitStream::read_bits`],
//!   alignment) moves arbitrary bit counts at arbitrary bit offsets.
//! - **Typed accessors** (`write_u32`, `read_f64`, ...) serialize
//!   fixed-width numbers in little-endian byte order.
//! - **Compressed integers** (`write_u32_compressed`, ...) drop leading
//!   zero or sign-fill bytes behind one flag bit each.
//! - **Objects** ([`BitSerializable`]) let any type write and read itself.
//! - **Errors** ([`BitStreamError`]) separate caller bugs
//!   (`InvalidArgument`) from truncated input (`OutOfRange`).
//!
//! # Architecture
//!
//! The stream is the bottom of the stack. It knows nothing about packet
//! IDs, reliability or sockets:
//!
//! ```text
//! Transport (datagrams) → BitStream (bits) → Codec (packets)
//! ```

mod compressed;
mod config;
mod error;
mod object;
mod stream;
mod typed;

pub use config::{GrowthPolicy, StreamConfig};
pub use error::BitStreamError;
pub use object::BitSerializable;
pub use stream::BitStream;
