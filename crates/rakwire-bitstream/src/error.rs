//! Error types for the bit stream.
//!
//! Every fallible stream operation returns a [`BitStreamError`]. Reads that
//! run past the written data are expected when parsing truncated or
//! malformed inbound packets, so they surface as a plain `Err` (or `None`
//! from the `try_*` family) rather than a panic.

/// Errors that can occur while reading from or writing to a
/// [`BitStream`](crate::BitStream).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BitStreamError {
    /// A bit or byte count was zero, or the input slice is too short
    /// for the requested count.
    ///
    /// This is always a caller bug. The message names the operation and
    /// the offending value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A read asked for more bits than remain between the read cursor
    /// and the write cursor.
    #[error("read of {requested} bits out of range ({available} bits available)")]
    OutOfRange {
        /// Number of bits the read asked for.
        requested: usize,
        /// Number of unread bits left in the stream.
        available: usize,
    },

    /// Shrinking the buffer would drop bytes that have already been written.
    #[error("capacity {requested} bytes is below the {required} bytes already written")]
    CapacityBelowWritten {
        /// Capacity the caller asked for, in bytes.
        requested: usize,
        /// Bytes occupied by written bits.
        required: usize,
    },

    /// The read cursor cannot be moved past the write cursor.
    #[error("read position {position} is past the write position {limit}")]
    InvalidPosition {
        /// Requested read position, in bits.
        position: usize,
        /// Current write position, in bits.
        limit: usize,
    },

    /// A string does not fit the u16 length prefix.
    #[error("string of {len} bytes exceeds the 65535 byte limit")]
    StringTooLong {
        /// Length of the rejected string in bytes.
        len: usize,
    },

    /// String bytes read from the stream are not valid UTF-8.
    #[error("string is not valid UTF-8")]
    InvalidUtf8,
}

impl BitStreamError {
    /// Returns `true` for the error a truncated inbound packet produces.
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
