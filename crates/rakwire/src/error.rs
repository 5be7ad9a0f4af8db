//! Unified error type for rakwire.

use rakwire_bitstream::BitStreamError;
use rakwire_codec::CodecError;

/// Top-level error that wraps the errors of each rakwire crate.
///
/// The `#[from]` attributes let `?` convert stream and codec errors
/// automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RakwireError {
    /// A bit stream error (bad argument, read out of range, ...).
    #[error(transparent)]
    Stream(#[from] BitStreamError),

    /// A codec error (trailing bytes, unexpected packet ID, ...).
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl RakwireError {
    /// Returns `true` when the input ended early. The transport decides
    /// whether that means "drop the datagram" or "wait for more data".
    pub fn is_truncated(&self) -> bool {
        match self {
            Self::Stream(e) => e.is_out_of_range(),
            Self::Codec(e) => e.is_truncated(),
        }
    }
}
