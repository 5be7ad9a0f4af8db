//! Codec trait and the bit stream implementation.
//!
//! A codec turns whole values into datagram bytes and back. Callers that
//! only need "value in, bytes out" depend on the [`Codec`] trait; the
//! [`BitCodec`] implementation drives a [`BitStream`] through each type's
//! own [`BitSerializable`] impl.
//!
//! Packets are values with a leading ID byte (see [`Packet`]). The ID lets
//! a receiver peek at a datagram and pick the right type before decoding
//! the body.

use rakwire_bitstream::{BitSerializable, BitStream, BitStreamError};

use crate::{CodecConfig, CodecError};

/// A codec that can encode values to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so one codec can be shared by every
/// connection task in a server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `CodecError::Stream` if the value's serializer rejects a
    /// write (e.g. an over-long string).
    fn encode<T: BitSerializable + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, CodecError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `CodecError::Stream` if the bytes are truncated or
    /// malformed, and `CodecError::TrailingBytes` if whole bytes are
    /// left over and the codec is configured to reject them.
    fn decode<T: BitSerializable + Default>(
        &self,
        data: &[u8],
    ) -> Result<T, CodecError>;
}

/// A value that travels as one datagram behind a fixed ID byte.
pub trait Packet: BitSerializable + Default {
    /// The leading byte that identifies this packet type on the wire.
    const ID: u8;
}

// ---------------------------------------------------------------------------
// BitCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that writes values through a [`BitStream`].
///
/// ## Example
///
/// ```rust
/// use rakwire_codec::{BitCodec, Codec};
///
/// let codec = BitCodec::default();
///
/// let bytes = codec.encode(&vec![1u16, 2, 3]).unwrap();
/// let decoded: Vec<u16> = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, vec![1, 2, 3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BitCodec {
    config: CodecConfig,
}

impl BitCodec {
    /// Creates a codec with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the codec's configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Writes `value` at the end of an existing stream.
    pub fn encode_into<T: BitSerializable + ?Sized>(
        &self,
        stream: &mut BitStream,
        value: &T,
    ) -> Result<(), CodecError> {
        stream.write_object(value)?;
        Ok(())
    }

    /// Reads one value at the stream's read cursor. Trailing data is left
    /// for the caller.
    pub fn decode_from<T: BitSerializable + Default>(
        &self,
        stream: &mut BitStream,
    ) -> Result<T, CodecError> {
        let mut value = T::default();
        stream.read_object(&mut value)?;
        Ok(value)
    }

    /// Encodes a packet: its ID byte, then its body.
    pub fn encode_packet<P: Packet>(&self, packet: &P) -> Result<Vec<u8>, CodecError> {
        let mut stream = BitStream::with_config(&self.config.stream);
        stream.write_byte(P::ID);
        self.encode_into(&mut stream, packet)?;
        tracing::trace!(
            id = P::ID,
            bits = stream.bit_count(),
            "packet encoded"
        );
        Ok(stream.into_bytes())
    }

    /// Decodes a packet, checking its ID byte first.
    ///
    /// # Errors
    /// Returns `CodecError::UnexpectedId` when the datagram carries a
    /// different packet type, plus the errors of [`Codec::decode`].
    pub fn decode_packet<P: Packet>(&self, data: &[u8]) -> Result<P, CodecError> {
        let mut stream = BitStream::from(data);
        let found = stream.read_byte()?;
        if found != P::ID {
            return Err(CodecError::UnexpectedId {
                expected: P::ID,
                found,
            });
        }
        let packet = self.decode_from(&mut stream)?;
        self.check_trailing(&stream)?;
        tracing::trace!(id = P::ID, bytes = data.len(), "packet decoded");
        Ok(packet)
    }

    fn check_trailing(&self, stream: &BitStream) -> Result<(), CodecError> {
        // Only whole bytes count. The final byte's padding bits are left
        // over on every datagram whose body is not a multiple of 8 bits.
        let bytes = stream.unread_bits() / 8;
        if self.config.reject_trailing && bytes > 0 {
            return Err(CodecError::TrailingBytes { bytes });
        }
        Ok(())
    }
}

/// Reads the ID byte of a datagram without decoding the body.
///
/// # Errors
/// Returns `CodecError::Stream` for an empty datagram.
pub fn peek_id(data: &[u8]) -> Result<u8, CodecError> {
    data.first().copied().ok_or(CodecError::Stream(
        BitStreamError::OutOfRange {
            requested: 8,
            available: 0,
        },
    ))
}

impl Codec for BitCodec {
    fn encode<T: BitSerializable + ?Sized>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, CodecError> {
        let mut stream = BitStream::with_config(&self.config.stream);
        self.encode_into(&mut stream, value)?;
        tracing::trace!(bits = stream.bit_count(), "value encoded");
        Ok(stream.into_bytes())
    }

    fn decode<T: BitSerializable + Default>(
        &self,
        data: &[u8],
    ) -> Result<T, CodecError> {
        let mut stream = BitStream::from(data);
        let value = self.decode_from(&mut stream)?;
        self.check_trailing(&stream)?;
        tracing::trace!(bytes = data.len(), "value decoded");
        Ok(value)
    }
}
