//! The bit buffer core: an owned byte buffer with independent bit-granular
//! write and read cursors.
//!
//! Bits are packed MSB-first: the first bit written to a fresh stream lands
//! in bit 7 of byte 0. Both cursors count bits from the start of the buffer.
//!
//! ```text
//!  byte 0            byte 1
//! [7 6 5 4 3 2 1 0] [7 6 5 4 3 2 1 0]
//!  ^ bit 0 of the stream       ^ bit 14
//! ```
//!
//! Whole-byte transfers at a byte-aligned cursor take a `copy_from_slice`
//! fast path. Everything else goes through the shifting loop, which splits
//! each source byte across two destination bytes when the cursor sits
//! mid-byte.

use std::fmt;

use crate::{BitStreamError, GrowthPolicy, StreamConfig};

/// Number of bytes needed to hold `bits` bits.
pub(crate) const fn bits_to_bytes(bits: usize) -> usize {
    bits.div_ceil(8)
}

// ---------------------------------------------------------------------------
// BitStream
// ---------------------------------------------------------------------------

/// A growable bit buffer with a write cursor and a read cursor.
///
/// A stream is built empty for an outbound packet, or loaded from received
/// bytes for an inbound one:
///
/// ```rust
/// use rakwire_bitstream::BitStream;
///
/// let mut out = BitStream::new();
/// out.write_u8(0x84);
/// out.write_bit(true);
/// out.write_u16_compressed(300);
///
/// let mut inbound = BitStream::from_bytes(out.into_bytes());
/// assert_eq!(inbound.read_u8().unwrap(), 0x84);
/// assert!(inbound.read_bit().unwrap());
/// assert_eq!(inbound.read_u16_compressed().unwrap(), 300);
/// ```
///
/// The stream is a plain single-owner value. Every mutation takes
/// `&mut self`, so sharing one across threads needs an external lock.
#[derive(Debug, Clone)]
pub struct BitStream {
    data: Vec<u8>,
    write_pos: usize,
    read_pos: usize,
    growth: GrowthPolicy,
}

impl BitStream {
    /// Creates an empty stream without allocating.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            write_pos: 0,
            read_pos: 0,
            growth: GrowthPolicy::default(),
        }
    }

    /// Creates an empty stream with `bytes` of allocation reserved up front.
    ///
    /// The reservation is not logical capacity: [`capacity`](Self::capacity)
    /// still reports 0 until bits are written or
    /// [`set_capacity`](Self::set_capacity) is called.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
            ..Self::new()
        }
    }

    /// Creates an empty stream from a [`StreamConfig`].
    pub fn with_config(config: &StreamConfig) -> Self {
        Self {
            data: Vec::with_capacity(config.initial_capacity),
            growth: config.growth,
            ..Self::new()
        }
    }

    /// Wraps received bytes for parsing.
    ///
    /// The write cursor is placed after the last bit of `data` and the
    /// read cursor at zero, so the whole buffer is readable.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let write_pos = data.len() * 8;
        Self {
            data,
            write_pos,
            ..Self::new()
        }
    }

    // -- Observables --

    /// Number of bits written so far (the write cursor).
    pub fn bit_count(&self) -> usize {
        self.write_pos
    }

    /// Number of bits read so far (the read cursor).
    pub fn read_position(&self) -> usize {
        self.read_pos
    }

    /// Bits left between the read cursor and the write cursor.
    pub fn unread_bits(&self) -> usize {
        self.write_pos.saturating_sub(self.read_pos)
    }

    /// Returns `true` once every written bit has been read.
    pub fn all_read(&self) -> bool {
        self.read_pos >= self.write_pos
    }

    /// Bytes occupied by written bits: `ceil(bit_count / 8)`.
    pub fn bytes_used(&self) -> usize {
        bits_to_bytes(self.write_pos)
    }

    /// Logical size of the buffer in bytes. This is the zero-filled length
    /// the stream may write into, not the allocation reserved behind it.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The written bytes, ready to hand to a socket. A trailing partial
    /// byte is zero-padded in its low bits.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.bytes_used()]
    }

    /// Consumes the stream and returns the written bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let used = self.bytes_used();
        self.data.truncate(used);
        self.data
    }

    // -- Buffer management --

    /// Resizes the buffer to `bytes`.
    ///
    /// Growing zero-fills the new bytes. Shrinking is allowed down to
    /// [`bytes_used`](Self::bytes_used); below that it would discard
    /// written data and is rejected.
    ///
    /// # Errors
    /// Returns [`BitStreamError::CapacityBelowWritten`] when `bytes` is
    /// smaller than the written data.
    pub fn set_capacity(&mut self, bytes: usize) -> Result<(), BitStreamError> {
        let required = self.bytes_used();
        if bytes < required {
            return Err(BitStreamError::CapacityBelowWritten {
                requested: bytes,
                required,
            });
        }
        tracing::debug!(
            from = self.data.len(),
            to = bytes,
            "bit stream capacity set"
        );
        self.data.resize(bytes, 0);
        Ok(())
    }

    /// Discards all data and rewinds both cursors.
    pub fn reset(&mut self) {
        self.data.clear();
        self.write_pos = 0;
        self.read_pos = 0;
    }

    /// Rewinds the read cursor to the start of the stream.
    pub fn reset_read(&mut self) {
        self.read_pos = 0;
    }

    /// Moves the read cursor to `position` bits.
    ///
    /// # Errors
    /// Returns [`BitStreamError::InvalidPosition`] past the write cursor.
    pub fn set_read_position(
        &mut self,
        position: usize,
    ) -> Result<(), BitStreamError> {
        if position > self.write_pos {
            return Err(BitStreamError::InvalidPosition {
                position,
                limit: self.write_pos,
            });
        }
        self.read_pos = position;
        Ok(())
    }

    /// Runs a multi-step read, restoring the read cursor if any step
    /// fails.
    pub(crate) fn rewind_on_error<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, BitStreamError>,
    ) -> Result<T, BitStreamError> {
        let start = self.read_pos;
        let result = read(self);
        if result.is_err() {
            self.read_pos = start;
        }
        result
    }

    /// Skips `bit_count` unread bits.
    pub fn ignore_bits(&mut self, bit_count: usize) -> Result<(), BitStreamError> {
        self.ensure_readable(bit_count)?;
        self.read_pos += bit_count;
        Ok(())
    }

    /// Skips `byte_count` unread bytes.
    pub fn ignore_bytes(
        &mut self,
        byte_count: usize,
    ) -> Result<(), BitStreamError> {
        let bits = self.bytes_to_bits(byte_count)?;
        self.ignore_bits(bits)
    }

    /// Makes the buffer hold at least `extra_bits` bits past the write cursor.
    fn grow(&mut self, extra_bits: usize) {
        let required = bits_to_bytes(self.write_pos + extra_bits);
        if required <= self.data.len() {
            return;
        }
        let additional = required - self.data.len();
        let before = self.data.capacity();
        match self.growth {
            GrowthPolicy::Exact => self.data.reserve_exact(additional),
            GrowthPolicy::Amortized => self.data.reserve(additional),
        }
        if self.data.capacity() != before {
            tracing::trace!(
                from = before,
                to = self.data.capacity(),
                "bit stream reallocated"
            );
        }
        self.data.resize(required, 0);
    }

    /// Converts a byte count from the caller into bits. A count whose bit
    /// length does not fit in `usize` can never be readable.
    fn bytes_to_bits(&self, byte_count: usize) -> Result<usize, BitStreamError> {
        byte_count
            .checked_mul(8)
            .ok_or(BitStreamError::OutOfRange {
                requested: usize::MAX,
                available: self.unread_bits(),
            })
    }

    pub(crate) fn ensure_readable(
        &self,
        bit_count: usize,
    ) -> Result<(), BitStreamError> {
        let available = self.unread_bits();
        if bit_count > available {
            return Err(BitStreamError::OutOfRange {
                requested: bit_count,
                available,
            });
        }
        Ok(())
    }

    // -- Raw bits --

    /// Appends `bit_count` bits from `input` at the write cursor.
    ///
    /// Source bytes are consumed MSB-first. When `bit_count` is not a
    /// multiple of 8, the last source byte is partial: with
    /// `right_aligned` its meaningful bits are its low bits (`0b101` for
    /// three bits), otherwise its high bits (`0b1010_0000`).
    ///
    /// # Errors
    /// Returns [`BitStreamError::InvalidArgument`] when `bit_count` is
    /// zero or `input` is shorter than `ceil(bit_count / 8)` bytes.
    pub fn write_bits(
        &mut self,
        input: &[u8],
        bit_count: usize,
        right_aligned: bool,
    ) -> Result<(), BitStreamError> {
        if bit_count == 0 {
            return Err(BitStreamError::invalid("write_bits: bit count is zero"));
        }
        if input.len() < bits_to_bytes(bit_count) {
            return Err(BitStreamError::invalid(format!(
                "write_bits: {bit_count} bits requested from {} bytes",
                input.len()
            )));
        }
        self.put_bits(input, bit_count, right_aligned);
        Ok(())
    }

    /// Unchecked core of [`write_bits`](Self::write_bits). Callers
    /// guarantee `input` holds `ceil(bit_count / 8)` bytes.
    pub(crate) fn put_bits(
        &mut self,
        input: &[u8],
        bit_count: usize,
        right_aligned: bool,
    ) {
        self.grow(bit_count);
        let offset = self.write_pos & 7;

        if offset == 0 && bit_count & 7 == 0 {
            let start = self.write_pos >> 3;
            let len = bit_count >> 3;
            self.data[start..start + len].copy_from_slice(&input[..len]);
            self.write_pos += bit_count;
            return;
        }

        let mut remaining = bit_count;
        for &source in input {
            if remaining == 0 {
                break;
            }
            let step = remaining.min(8);
            let mut byte = source;
            // Normalise a partial last byte to its high `step` bits, with
            // everything below them cleared, so it can be spliced like a
            // full byte.
            if step < 8 {
                if right_aligned {
                    byte <<= 8 - step;
                }
                byte &= 0xFFu8 << (8 - step);
            }

            // A mid-byte cursor splits `byte`: its high `8 - offset` bits
            // finish the current byte, and the rest (if `step` reaches
            // that far) start the next one.
            let index = self.write_pos >> 3;
            if offset == 0 {
                self.data[index] = byte;
            } else {
                // Keep the `offset` bits already written in this byte.
                self.data[index] =
                    (self.data[index] & !(0xFFu8 >> offset)) | (byte >> offset);
                if step > 8 - offset {
                    self.data[index + 1] = byte << (8 - offset);
                }
            }

            self.write_pos += step;
            remaining -= step;
        }
    }

    /// Reads `bit_count` bits into a new `ceil(bit_count / 8)` byte vector.
    ///
    /// With `right_aligned`, a partial last byte is shifted down so its
    /// meaningful bits are the low bits; otherwise they stay high.
    ///
    /// # Errors
    /// - [`BitStreamError::InvalidArgument`] when `bit_count` is zero.
    /// - [`BitStreamError::OutOfRange`] when fewer than `bit_count` bits
    ///   remain. The read cursor does not move.
    pub fn read_bits(
        &mut self,
        bit_count: usize,
        right_aligned: bool,
    ) -> Result<Vec<u8>, BitStreamError> {
        if bit_count == 0 {
            return Err(BitStreamError::invalid("read_bits: bit count is zero"));
        }
        // Checked before the buffer is allocated: `bit_count` may come
        // from a corrupt length field.
        self.ensure_readable(bit_count)?;
        let mut out = vec![0u8; bits_to_bytes(bit_count)];
        self.take_bits(&mut out, bit_count, right_aligned)?;
        Ok(out)
    }

    /// Like [`read_bits`](Self::read_bits), but `None` on any failure.
    pub fn try_read_bits(
        &mut self,
        bit_count: usize,
        right_aligned: bool,
    ) -> Option<Vec<u8>> {
        self.read_bits(bit_count, right_aligned).ok()
    }

    /// Core of every read. `out` must hold `ceil(bit_count / 8)` bytes.
    pub(crate) fn take_bits(
        &mut self,
        out: &mut [u8],
        bit_count: usize,
        right_aligned: bool,
    ) -> Result<(), BitStreamError> {
        self.ensure_readable(bit_count)?;
        let offset = self.read_pos & 7;
        let byte_len = bits_to_bytes(bit_count);

        if offset == 0 && bit_count & 7 == 0 {
            let start = self.read_pos >> 3;
            out[..byte_len]
                .copy_from_slice(&self.data[start..start + byte_len]);
            self.read_pos += bit_count;
            return Ok(());
        }

        let mut remaining = bit_count;
        for slot in out.iter_mut().take(byte_len) {
            let step = remaining.min(8);
            // Reassemble one output byte from the tail of the current
            // buffer byte and, when the read straddles, the head of the
            // next. `ensure_readable` already guarantees `index + 1`
            // exists in that case.
            let index = self.read_pos >> 3;
            let mut byte = self.data[index] << offset;
            if offset > 0 && step > 8 - offset {
                byte |= self.data[index + 1] >> (8 - offset);
            }
            if step < 8 {
                byte &= 0xFFu8 << (8 - step);
                if right_aligned {
                    byte >>= 8 - step;
                }
            }
            *slot = byte;
            self.read_pos += step;
            remaining -= step;
        }
        Ok(())
    }

    /// Appends one bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.grow(1);
        let index = self.write_pos >> 3;
        let mask = 0x80u8 >> (self.write_pos & 7);
        if bit {
            self.data[index] |= mask;
        } else {
            self.data[index] &= !mask;
        }
        self.write_pos += 1;
    }

    /// Reads one bit.
    pub fn read_bit(&mut self) -> Result<bool, BitStreamError> {
        self.ensure_readable(1)?;
        let mask = 0x80u8 >> (self.read_pos & 7);
        let bit = (self.data[self.read_pos >> 3] & mask) != 0;
        self.read_pos += 1;
        Ok(bit)
    }

    /// Reads one bit, or `None` when the stream is exhausted.
    pub fn try_read_bit(&mut self) -> Option<bool> {
        self.read_bit().ok()
    }

    // -- Alignment --

    /// Moves the write cursor to the next byte boundary. The skipped bits
    /// already belong to the last allocated byte and read back as zero.
    /// A no-op on a boundary.
    pub fn align_write(&mut self) {
        self.write_pos = (self.write_pos + 7) & !7;
    }

    /// Moves the read cursor to the next byte boundary, stopping at the
    /// write cursor if that comes first. A no-op on a boundary.
    pub fn align_read(&mut self) {
        self.read_pos = ((self.read_pos + 7) & !7).min(self.write_pos);
    }

    // -- Bulk bytes --

    /// Appends whole bytes.
    ///
    /// At a byte-aligned write cursor this is a single block copy;
    /// otherwise every byte is shifted in through the bit path.
    ///
    /// # Errors
    /// Returns [`BitStreamError::InvalidArgument`] for an empty slice.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BitStreamError> {
        if bytes.is_empty() {
            return Err(BitStreamError::invalid("write: no bytes given"));
        }
        self.put_bytes(bytes);
        Ok(())
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_bits(bytes, bytes.len() * 8, true);
    }

    /// Reads `byte_count` whole bytes.
    ///
    /// # Errors
    /// - [`BitStreamError::InvalidArgument`] when `byte_count` is zero.
    /// - [`BitStreamError::OutOfRange`] when fewer bytes remain.
    pub fn read(&mut self, byte_count: usize) -> Result<Vec<u8>, BitStreamError> {
        if byte_count == 0 {
            return Err(BitStreamError::invalid("read: byte count is zero"));
        }
        let bits = self.bytes_to_bits(byte_count)?;
        self.ensure_readable(bits)?;
        let mut out = vec![0u8; byte_count];
        self.take_bits(&mut out, bits, true)?;
        Ok(out)
    }

    /// Fills `out` with the next `out.len()` bytes without allocating.
    ///
    /// # Errors
    /// Same as [`read`](Self::read): an empty `out` is
    /// [`BitStreamError::InvalidArgument`].
    pub fn read_into(&mut self, out: &mut [u8]) -> Result<(), BitStreamError> {
        if out.is_empty() {
            return Err(BitStreamError::invalid("read_into: empty output slice"));
        }
        let bits = self.bytes_to_bits(out.len())?;
        self.take_bits(out, bits, true)
    }

    /// Like [`read`](Self::read), but `None` on any failure.
    pub fn try_read(&mut self, byte_count: usize) -> Option<Vec<u8>> {
        self.read(byte_count).ok()
    }

    /// Aligns the write cursor, then appends `bytes` with the block copy.
    pub fn write_aligned_bytes(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), BitStreamError> {
        self.align_write();
        self.write(bytes)
    }

    /// Aligns the read cursor, then reads `byte_count` bytes.
    pub fn read_aligned_bytes(
        &mut self,
        byte_count: usize,
    ) -> Result<Vec<u8>, BitStreamError> {
        self.align_read();
        self.read(byte_count)
    }

    /// Moves `bit_count` unread bits from `source` to the end of this
    /// stream, advancing `source`'s read cursor.
    ///
    /// # Errors
    /// Fails like [`read_bits`](Self::read_bits) on `source`; nothing is
    /// written in that case.
    pub fn write_from(
        &mut self,
        source: &mut BitStream,
        bit_count: usize,
    ) -> Result<(), BitStreamError> {
        let bits = source.read_bits(bit_count, false)?;
        self.put_bits(&bits, bit_count, false);
        Ok(())
    }
}

impl Default for BitStream {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for BitStream {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}

impl From<&[u8]> for BitStream {
    fn from(data: &[u8]) -> Self {
        Self::from_bytes(data.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Debug dumps
// ---------------------------------------------------------------------------

/// `{:b}` prints the written bits, grouped by byte: `11111111 110000`.
impl fmt::Binary for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in 0..self.write_pos {
            if bit > 0 && bit % 8 == 0 {
                f.write_str(" ")?;
            }
            let set = self.data[bit >> 3] & (0x80u8 >> (bit & 7)) != 0;
            f.write_str(if set { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// `{:x}` prints the written bytes as space-separated hex: `ff c3`.
impl fmt::LowerHex for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
