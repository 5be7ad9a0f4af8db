//! RakNet's compressed integer encoding.
//!
//! A multi-byte value is written from its most significant byte down.
//! Each leading byte equal to the fill pattern (0x00 for unsigned values,
//! 0xFF for signed ones) is replaced by a single `1` flag bit. The first
//! byte that differs gets a `0` flag, and it is written verbatim together
//! with every less significant byte.
//!
//! If the scan reaches the least significant byte, that byte gets one more
//! chance: when its upper nibble matches the fill nibble, a `1` flag and the
//! lower 4 bits are enough.
//!
//! ```text
//! u32 300 = 2C 01 00 00 (little-endian image)
//!   byte 3 == 00 → 1
//!   byte 2 == 00 → 1
//!   byte 1 == 01 → 0, then 2C 01          = 19 bits
//!
//! i16 -3  = FD FF
//!   byte 1 == FF → 1
//!   byte 0 upper nibble F → 1, then 1101  = 6 bits
//! ```
//!
//! Inputs are little-endian byte images: index `len - 1` is the most
//! significant byte.

use crate::{BitStream, BitStreamError};

/// The byte a compressed value may elide.
fn fill_byte(unsigned: bool) -> u8 {
    if unsigned { 0x00 } else { 0xFF }
}

fn check_width(op: &str, bit_count: usize) -> Result<usize, BitStreamError> {
    if bit_count == 0 || bit_count % 8 != 0 {
        return Err(BitStreamError::invalid(format!(
            "{op}: bit count {bit_count} is not a positive multiple of 8"
        )));
    }
    Ok(bit_count / 8)
}

impl BitStream {
    /// Writes the `bit_count / 8` byte little-endian image in `input`
    /// with redundant high bytes elided.
    ///
    /// # Errors
    /// Returns [`BitStreamError::InvalidArgument`] when `bit_count` is
    /// not a positive multiple of 8 or `input` is too short.
    pub fn write_compressed(
        &mut self,
        input: &[u8],
        bit_count: usize,
        unsigned: bool,
    ) -> Result<(), BitStreamError> {
        let len = check_width("write_compressed", bit_count)?;
        if input.len() < len {
            return Err(BitStreamError::invalid(format!(
                "write_compressed: {bit_count} bits requested from {} bytes",
                input.len()
            )));
        }
        self.put_compressed(&input[..len], unsigned);
        Ok(())
    }

    /// Unchecked core of [`write_compressed`](Self::write_compressed).
    /// `image` is the whole value, at least one byte.
    pub(crate) fn put_compressed(&mut self, image: &[u8], unsigned: bool) {
        let fill = fill_byte(unsigned);

        for current in (1..image.len()).rev() {
            if image[current] == fill {
                self.write_bit(true);
            } else {
                self.write_bit(false);
                self.put_bits(&image[..=current], (current + 1) * 8, true);
                return;
            }
        }

        let low = image[0];
        if low & 0xF0 == fill & 0xF0 {
            self.write_bit(true);
            self.put_bits(&[low], 4, true);
        } else {
            self.write_bit(false);
            self.put_bits(&[low], 8, true);
        }
    }

    /// Reads a value written by [`write_compressed`](Self::write_compressed)
    /// and returns its `bit_count / 8` byte little-endian image.
    ///
    /// Elided bytes come back as the fill byte. If the stream ends right
    /// before the final flag bit, the all-fill image is returned without
    /// reading further.
    ///
    /// # Errors
    /// - [`BitStreamError::InvalidArgument`] for a bad `bit_count`.
    /// - [`BitStreamError::OutOfRange`] when the stream ends inside the
    ///   encoding.
    pub fn read_compressed(
        &mut self,
        bit_count: usize,
        unsigned: bool,
    ) -> Result<Vec<u8>, BitStreamError> {
        let len = check_width("read_compressed", bit_count)?;
        // The shortest encoding of a `len` byte value is one flag bit per
        // elided byte above byte 0. Reject widths the stream cannot hold
        // before allocating the image.
        self.ensure_readable(len - 1)?;
        let mut out = vec![0u8; len];
        self.take_compressed(&mut out, unsigned)?;
        Ok(out)
    }

    /// Like [`read_compressed`](Self::read_compressed), but `None` on any
    /// failure.
    pub fn try_read_compressed(
        &mut self,
        bit_count: usize,
        unsigned: bool,
    ) -> Option<Vec<u8>> {
        self.read_compressed(bit_count, unsigned).ok()
    }

    /// Core of every compressed read. `out` is the full value image.
    /// On failure the read cursor is restored.
    pub(crate) fn take_compressed(
        &mut self,
        out: &mut [u8],
        unsigned: bool,
    ) -> Result<(), BitStreamError> {
        self.rewind_on_error(|stream| stream.scan_compressed(out, unsigned))
    }

    fn scan_compressed(
        &mut self,
        out: &mut [u8],
        unsigned: bool,
    ) -> Result<(), BitStreamError> {
        let fill = fill_byte(unsigned);
        out.fill(fill);

        for current in (1..out.len()).rev() {
            if !self.read_bit()? {
                let bits = (current + 1) * 8;
                return self.take_bits(&mut out[..=current], bits, true);
            }
        }

        if self.all_read() {
            return Ok(());
        }

        if self.read_bit()? {
            let mut nibble = [0u8; 1];
            self.take_bits(&mut nibble, 4, true)?;
            out[0] = nibble[0] | (fill & 0xF0);
        } else {
            self.take_bits(&mut out[..1], 8, true)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_300_takes_19_bits() {
        let mut s = BitStream::new();
        s.write_compressed(&300u32.to_le_bytes(), 32, true).unwrap();
        assert_eq!(s.bit_count(), 19);
        // 1 1 0 | 00101100 00000001
        assert_eq!(format!("{s:b}"), "11000101 10000000 001");

        let image = s.read_compressed(32, true).unwrap();
        assert_eq!(image, 300u32.to_le_bytes());
    }

    #[test]
    fn test_small_unsigned_byte_uses_nibble() {
        let mut s = BitStream::new();
        s.write_compressed(&[5], 8, true).unwrap();
        assert_eq!(s.bit_count(), 5);
        assert_eq!(format!("{s:b}"), "10101");
    }

    #[test]
    fn test_small_unsigned_u32_counts_flag_per_elided_byte() {
        let mut s = BitStream::new();
        s.write_compressed(&5u32.to_le_bytes(), 32, true).unwrap();
        // three elided bytes, one nibble flag, four data bits
        assert_eq!(s.bit_count(), 8);
        assert_eq!(s.read_compressed(32, true).unwrap(), vec![5, 0, 0, 0]);
    }

    #[test]
    fn test_negative_signed_uses_sign_fill() {
        let mut s = BitStream::new();
        s.write_compressed(&(-3i16).to_le_bytes(), 16, false).unwrap();
        assert_eq!(s.bit_count(), 6);
        assert_eq!(format!("{s:b}"), "111101");
        assert_eq!(
            s.read_compressed(16, false).unwrap(),
            (-3i16).to_le_bytes()
        );
    }

    #[test]
    fn test_low_byte_without_matching_nibble_is_written_whole() {
        let mut s = BitStream::new();
        s.write_compressed(&0x80u16.to_le_bytes(), 16, true).unwrap();
        // 1 (high byte elided), 0 (nibble mismatch), 10000000
        assert_eq!(s.bit_count(), 10);
        assert_eq!(s.read_compressed(16, true).unwrap(), vec![0x80, 0x00]);
    }

    #[test]
    fn test_non_redundant_top_byte_writes_everything() {
        let mut s = BitStream::new();
        let image = 0x0102_0304u32.to_le_bytes();
        s.write_compressed(&image, 32, true).unwrap();
        assert_eq!(s.bit_count(), 33);
        assert_eq!(s.read_compressed(32, true).unwrap(), image);
    }

    #[test]
    fn test_exhausted_before_final_flag_returns_fill() {
        let mut s = BitStream::new();
        s.write_bit(true);
        s.write_bit(true);
        s.write_bit(true);
        let image = s.read_compressed(32, false).unwrap();
        assert_eq!(image, vec![0xFF; 4]);
        assert!(s.all_read());
    }

    #[test]
    fn test_truncated_body_is_out_of_range() {
        let mut s = BitStream::new();
        s.write_bit(false);
        s.write_u8(1);
        let err = s.read_compressed(16, true).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(s.read_position(), 0);
        assert_eq!(s.try_read_compressed(16, true), None);
        assert_eq!(s.read_position(), 0);
    }

    #[test]
    fn test_bad_width_is_invalid() {
        let mut s = BitStream::new();
        assert!(matches!(
            s.write_compressed(&[1, 2], 12, true),
            Err(BitStreamError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.write_compressed(&[1], 16, true),
            Err(BitStreamError::InvalidArgument(_))
        ));
        assert!(matches!(
            s.read_compressed(0, true),
            Err(BitStreamError::InvalidArgument(_))
        ));
        assert_eq!(s.bit_count(), 0);
    }

    #[test]
    fn test_wide_images_round_trip() {
        let image = 1u128.to_le_bytes();
        let mut s = BitStream::new();
        s.write_compressed(&image, 128, true).unwrap();
        // fifteen elided bytes, nibble flag, nibble
        assert_eq!(s.bit_count(), 20);
        assert_eq!(s.read_compressed(128, true).unwrap(), image);
    }

    #[test]
    fn test_huge_width_is_out_of_range_without_allocating() {
        let mut s = BitStream::from_bytes(vec![0xFF, 0xFF]);
        let err = s.read_compressed(usize::MAX - 7, true).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(s.read_position(), 0);

        // Sixteen flag bits still fit a 17 byte image that is all fill.
        assert_eq!(s.read_compressed(17 * 8, true).unwrap(), vec![0u8; 17]);
    }
}
