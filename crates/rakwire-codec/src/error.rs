//! Error types for the codec layer.
//!
//! A [`CodecError`] either wraps a [`BitStreamError`] from the stream
//! underneath, or reports a packet-level problem the stream cannot see,
//! such as the wrong leading ID byte.

use rakwire_bitstream::BitStreamError;

/// Errors that can occur while encoding or decoding a packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The bit stream rejected a read or write.
    ///
    /// `#[from]` lets `?` lift stream errors straight out of
    /// [`BitSerializable`](rakwire_bitstream::BitSerializable) impls.
    #[error(transparent)]
    Stream(#[from] BitStreamError),

    /// The value decoded cleanly but whole bytes were left over.
    #[error("{bytes} trailing bytes after decoded value")]
    TrailingBytes {
        /// Unread whole bytes.
        bytes: usize,
    },

    /// The leading ID byte names a different packet.
    #[error("expected packet id {expected:#04x}, found {found:#04x}")]
    UnexpectedId {
        /// ID of the packet type the caller asked for.
        expected: u8,
        /// ID byte found on the wire.
        found: u8,
    },
}

impl CodecError {
    /// Returns `true` when the input ended early, meaning the datagram was
    /// truncated rather than malformed.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Stream(e) if e.is_out_of_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stream_error() {
        let err: CodecError = BitStreamError::OutOfRange {
            requested: 8,
            available: 0,
        }
        .into();
        assert!(err.is_truncated());
        assert_eq!(err.to_string(), "read of 8 bits out of range (0 bits available)");
    }

    #[test]
    fn test_unexpected_id_display() {
        let err = CodecError::UnexpectedId {
            expected: 0x13,
            found: 0x84,
        };
        assert_eq!(err.to_string(), "expected packet id 0x13, found 0x84");
        assert!(!err.is_truncated());
    }
}
