//! Typed accessors built on the bit core.
//!
//! Every multi-byte value is serialized in little-endian byte order, no
//! matter the host. Each numeric type has a plain pair (`write_u32` /
//! `read_u32`) and a compressed pair (`write_u32_compressed` /
//! `read_u32_compressed`) that goes through the redundant-byte codec.
//!
//! Signed integers are compressed against the 0xFF sign fill. Floats are
//! compressed the same way as signed integers: their bit pattern is not
//! two's complement, so this rarely saves space. It is kept because that
//! is how the RakNet wire format treats them.

use std::mem::size_of;

use crate::{BitStream, BitStreamError};

macro_rules! numeric_accessors {
    ($(
        $ty:ty, unsigned = $unsigned:expr =>
            $write:ident, $read:ident, $write_c:ident, $read_c:ident;
    )*) => {
        impl BitStream {
            $(
                #[doc = concat!("Writes a `", stringify!($ty), "` in little-endian byte order.")]
                pub fn $write(&mut self, value: $ty) {
                    self.put_bytes(&value.to_le_bytes());
                }

                #[doc = concat!("Reads a `", stringify!($ty), "` written by [`", stringify!($write), "`](Self::", stringify!($write), ").")]
                pub fn $read(&mut self) -> Result<$ty, BitStreamError> {
                    let mut image = [0u8; size_of::<$ty>()];
                    self.take_bits(&mut image, size_of::<$ty>() * 8, true)?;
                    Ok(<$ty>::from_le_bytes(image))
                }

                #[doc = concat!("Writes a `", stringify!($ty), "` with redundant high bytes elided.")]
                pub fn $write_c(&mut self, value: $ty) {
                    self.put_compressed(&value.to_le_bytes(), $unsigned);
                }

                #[doc = concat!("Reads a `", stringify!($ty), "` written by [`", stringify!($write_c), "`](Self::", stringify!($write_c), ").")]
                pub fn $read_c(&mut self) -> Result<$ty, BitStreamError> {
                    let mut image = [0u8; size_of::<$ty>()];
                    self.take_compressed(&mut image, $unsigned)?;
                    Ok(<$ty>::from_le_bytes(image))
                }
            )*
        }
    };
}

numeric_accessors! {
    u8, unsigned = true => write_u8, read_u8, write_u8_compressed, read_u8_compressed;
    i8, unsigned = false => write_i8, read_i8, write_i8_compressed, read_i8_compressed;
    u16, unsigned = true => write_u16, read_u16, write_u16_compressed, read_u16_compressed;
    i16, unsigned = false => write_i16, read_i16, write_i16_compressed, read_i16_compressed;
    u32, unsigned = true => write_u32, read_u32, write_u32_compressed, read_u32_compressed;
    i32, unsigned = false => write_i32, read_i32, write_i32_compressed, read_i32_compressed;
    u64, unsigned = true => write_u64, read_u64, write_u64_compressed, read_u64_compressed;
    i64, unsigned = false => write_i64, read_i64, write_i64_compressed, read_i64_compressed;
    f32, unsigned = false => write_f32, read_f32, write_f32_compressed, read_f32_compressed;
    f64, unsigned = false => write_f64, read_f64, write_f64_compressed, read_f64_compressed;
}

/// Smallest magnitude [`BitStream::write_vector`] still encodes a direction for.
const VECTOR_EPSILON: f32 = 0.000_000_01;

impl BitStream {
    /// Writes a packet ID or other single byte. Same as [`write_u8`](Self::write_u8).
    pub fn write_byte(&mut self, value: u8) {
        self.write_u8(value);
    }

    /// Reads a single byte. Same as [`read_u8`](Self::read_u8).
    pub fn read_byte(&mut self) -> Result<u8, BitStreamError> {
        self.read_u8()
    }

    /// Writes a `bool` as one bit.
    pub fn write_bool(&mut self, value: bool) {
        self.write_bit(value);
    }

    /// Reads a `bool` written by [`write_bool`](Self::write_bool).
    pub fn read_bool(&mut self) -> Result<bool, BitStreamError> {
        self.read_bit()
    }

    // -- Strings --

    /// Writes a u16 byte-length prefix followed by the UTF-8 bytes.
    ///
    /// # Errors
    /// Returns [`BitStreamError::StringTooLong`] above 65535 bytes.
    pub fn write_str(&mut self, value: &str) -> Result<(), BitStreamError> {
        let len = u16::try_from(value.len())
            .map_err(|_| BitStreamError::StringTooLong { len: value.len() })?;
        self.write_u16(len);
        if len > 0 {
            self.put_bytes(value.as_bytes());
        }
        Ok(())
    }

    /// Reads a string written by [`write_str`](Self::write_str).
    ///
    /// The read cursor is left untouched on failure.
    pub fn read_string(&mut self) -> Result<String, BitStreamError> {
        self.rewind_on_error(Self::take_string)
    }

    fn take_string(&mut self) -> Result<String, BitStreamError> {
        let len = usize::from(self.read_u16()?);
        if len == 0 {
            return Ok(String::new());
        }
        let bytes = self.read(len)?;
        String::from_utf8(bytes).map_err(|_| BitStreamError::InvalidUtf8)
    }

    // -- Quantized floats --

    /// Writes `value` as 16 bits, quantized over `min..=max`.
    ///
    /// Values outside the range are clamped. `max` must be greater than
    /// `min`.
    pub fn write_float16(&mut self, value: f32, min: f32, max: f32) {
        let scaled = (value - min) / (max - min) * f32::from(u16::MAX);
        let quantized = scaled.round().clamp(0.0, f32::from(u16::MAX)) as u16;
        self.write_u16(quantized);
    }

    /// Reads a value written by [`write_float16`](Self::write_float16)
    /// with the same range.
    pub fn read_float16(
        &mut self,
        min: f32,
        max: f32,
    ) -> Result<f32, BitStreamError> {
        let quantized = self.read_u16()?;
        Ok(min + f32::from(quantized) / f32::from(u16::MAX) * (max - min))
    }

    /// Writes a unit vector as three float16 components in `[-1, 1]`.
    pub fn write_norm_vector(&mut self, vector: [f32; 3]) {
        for component in vector {
            self.write_float16(component, -1.0, 1.0);
        }
    }

    /// Reads a vector written by [`write_norm_vector`](Self::write_norm_vector).
    pub fn read_norm_vector(&mut self) -> Result<[f32; 3], BitStreamError> {
        Ok([
            self.read_float16(-1.0, 1.0)?,
            self.read_float16(-1.0, 1.0)?,
            self.read_float16(-1.0, 1.0)?,
        ])
    }

    /// Writes an arbitrary vector as an `f32` magnitude plus a quantized
    /// direction. A near-zero vector is written as its magnitude alone.
    pub fn write_vector(&mut self, vector: [f32; 3]) {
        let [x, y, z] = vector;
        let magnitude = (x * x + y * y + z * z).sqrt();
        self.write_f32(magnitude);
        if magnitude > VECTOR_EPSILON {
            self.write_norm_vector([x / magnitude, y / magnitude, z / magnitude]);
        }
    }

    /// Reads a vector written by [`write_vector`](Self::write_vector).
    pub fn read_vector(&mut self) -> Result<[f32; 3], BitStreamError> {
        let magnitude = self.read_f32()?;
        if magnitude <= VECTOR_EPSILON {
            return Ok([0.0; 3]);
        }
        let [x, y, z] = self.read_norm_vector()?;
        Ok([x * magnitude, y * magnitude, z * magnitude])
    }
}
