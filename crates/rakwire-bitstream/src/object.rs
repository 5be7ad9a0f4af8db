//! Self-serializing objects.
//!
//! The stream does not know the layout of any packet or game type. A type
//! that wants to travel through a [`BitStream`] implements
//! [`BitSerializable`] and writes its own fields in order:
//!
//! ```rust
//! use rakwire_bitstream::{BitSerializable, BitStream, BitStreamError};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct PlayerMoved {
//!     player: u32,
//!     x: f32,
//!     y: f32,
//!     crouching: bool,
//! }
//!
//! impl BitSerializable for PlayerMoved {
//!     fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
//!         stream.write_u32_compressed(self.player);
//!         stream.write_f32(self.x);
//!         stream.write_f32(self.y);
//!         stream.write_bool(self.crouching);
//!         Ok(())
//!     }
//!
//!     fn deserialize(&mut self, stream: &mut BitStream) -> Result<(), BitStreamError> {
//!         self.player = stream.read_u32_compressed()?;
//!         self.x = stream.read_f32()?;
//!         self.y = stream.read_f32()?;
//!         self.crouching = stream.read_bool()?;
//!         Ok(())
//!     }
//! }
//!
//! let sent = PlayerMoved { player: 7, x: 1.5, y: -2.0, crouching: true };
//! let mut stream = BitStream::new();
//! stream.write_object(&sent).unwrap();
//!
//! let mut received = PlayerMoved::default();
//! stream.read_object(&mut received).unwrap();
//! assert_eq!(sent, received);
//! ```

use crate::{BitStream, BitStreamError};

/// A type that can write itself into a [`BitStream`] and read itself back.
///
/// `deserialize` fills `self` in place, so a receiver can reuse one value
/// across packets.
pub trait BitSerializable {
    /// Writes `self` at the stream's write cursor.
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError>;

    /// Overwrites `self` with a value read at the stream's read cursor.
    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError>;
}

impl BitStream {
    /// Writes `value` through its own [`BitSerializable::serialize`].
    pub fn write_object<T: BitSerializable + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), BitStreamError> {
        value.serialize(self)
    }

    /// Fills `value` through its own [`BitSerializable::deserialize`].
    pub fn read_object<T: BitSerializable + ?Sized>(
        &mut self,
        value: &mut T,
    ) -> Result<(), BitStreamError> {
        value.deserialize(self)
    }
}

// ---------------------------------------------------------------------------
// Standard implementations
// ---------------------------------------------------------------------------

// Numbers use the plain fixed-width encoding. Types that want compressed
// fields write them explicitly in their own impl.
macro_rules! serializable_numbers {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl BitSerializable for $ty {
                fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
                    stream.$write(*self);
                    Ok(())
                }

                fn deserialize(&mut self, stream: &mut BitStream) -> Result<(), BitStreamError> {
                    *self = stream.$read()?;
                    Ok(())
                }
            }
        )*
    };
}

serializable_numbers! {
    bool => write_bool, read_bool;
    u8 => write_u8, read_u8;
    i8 => write_i8, read_i8;
    u16 => write_u16, read_u16;
    i16 => write_i16, read_i16;
    u32 => write_u32, read_u32;
    i32 => write_i32, read_i32;
    u64 => write_u64, read_u64;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl BitSerializable for String {
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
        stream.write_str(self)
    }

    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError> {
        *self = stream.read_string()?;
        Ok(())
    }
}

/// A presence bit, then the value when present.
///
/// On failure the read cursor is restored and `self` is left unchanged.
impl<T: BitSerializable + Default> BitSerializable for Option<T> {
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
        stream.write_bit(self.is_some());
        match self {
            Some(value) => value.serialize(stream),
            None => Ok(()),
        }
    }

    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError> {
        *self = stream.rewind_on_error(|stream| {
            if !stream.read_bit()? {
                return Ok(None);
            }
            let mut value = T::default();
            value.deserialize(stream)?;
            Ok(Some(value))
        })?;
        Ok(())
    }
}

/// A compressed u32 element count, then each element.
///
/// On failure the read cursor is restored and `self` is left unchanged.
/// Element types must encode to at least one bit: a length prefix is only
/// trusted as far as the unread bits can back it, and an element that
/// reads zero bits fails with [`BitStreamError::InvalidArgument`].
impl<T: BitSerializable + Default> BitSerializable for Vec<T> {
    fn serialize(&self, stream: &mut BitStream) -> Result<(), BitStreamError> {
        let len = u32::try_from(self.len()).map_err(|_| {
            BitStreamError::invalid(format!(
                "sequence of {} elements exceeds u32 length prefix",
                self.len()
            ))
        })?;
        stream.write_u32_compressed(len);
        self.iter().try_for_each(|item| item.serialize(stream))
    }

    fn deserialize(
        &mut self,
        stream: &mut BitStream,
    ) -> Result<(), BitStreamError> {
        *self = stream.rewind_on_error(|stream| {
            let len = stream.read_u32_compressed()? as usize;
            // Each element needs at least one bit, so a corrupt length
            // fails here instead of driving a long loop.
            stream.ensure_readable(len)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                let before = stream.read_position();
                let mut item = T::default();
                item.deserialize(stream)?;
                if stream.read_position() == before {
                    return Err(BitStreamError::invalid(
                        "sequence element decoded from zero bits",
                    ));
                }
                items.push(item);
            }
            Ok(items)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Header {
        id: u8,
        sequence: u32,
        name: String,
        tags: Vec<u16>,
        owner: Option<i64>,
    }

    impl BitSerializable for Header {
        fn serialize(
            &self,
            stream: &mut BitStream,
        ) -> Result<(), BitStreamError> {
            stream.write_object(&self.id)?;
            stream.write_u32_compressed(self.sequence);
            stream.write_object(&self.name)?;
            stream.write_object(&self.tags)?;
            stream.write_object(&self.owner)
        }

        fn deserialize(
            &mut self,
            stream: &mut BitStream,
        ) -> Result<(), BitStreamError> {
            stream.read_object(&mut self.id)?;
            self.sequence = stream.read_u32_compressed()?;
            stream.read_object(&mut self.name)?;
            stream.read_object(&mut self.tags)?;
            stream.read_object(&mut self.owner)
        }
    }

    #[test]
    fn test_object_round_trip() {
        let header = Header {
            id: 0x84,
            sequence: 12,
            name: "lobby".into(),
            tags: vec![1, 500, 65535],
            owner: Some(-9),
        };
        let mut stream = BitStream::new();
        stream.write_object(&header).unwrap();

        let mut decoded = Header::default();
        stream.read_object(&mut decoded).unwrap();
        assert_eq!(decoded, header);
        assert!(stream.all_read());
    }

    #[test]
    fn test_deserialize_overwrites_in_place() {
        let mut stream = BitStream::new();
        stream.write_object(&vec![3u8, 4]).unwrap();

        let mut values = vec![9u8, 9, 9, 9];
        stream.read_object(&mut values).unwrap();
        assert_eq!(values, vec![3, 4]);
    }

    #[test]
    fn test_option_none_is_one_bit() {
        let mut stream = BitStream::new();
        stream.write_object(&None::<u32>).unwrap();
        assert_eq!(stream.bit_count(), 1);

        let mut value = Some(5u32);
        stream.read_object(&mut value).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_corrupt_length_fails_without_huge_allocation() {
        let mut stream = BitStream::new();
        stream.write_u32_compressed(u32::MAX);
        stream.write_u8(1);

        let mut values: Vec<u64> = Vec::new();
        let err = stream.read_object(&mut values).unwrap_err();
        assert!(err.is_out_of_range());
    }

    #[test]
    fn test_failed_sequence_read_rewinds_and_keeps_value() {
        let mut stream = BitStream::new();
        stream.write_u32_compressed(3);
        stream.write_u16(10);
        stream.write_u16(20);
        // third element missing

        let mut values = vec![7u16];
        let err = stream.read_object(&mut values).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(values, vec![7]);
        assert_eq!(stream.read_position(), 0);
    }

    #[test]
    fn test_failed_option_read_rewinds_and_keeps_value() {
        let mut stream = BitStream::new();
        stream.write_bit(true);
        stream.write_u8(1);

        let mut value = Some(5u32);
        assert!(stream.read_object(&mut value).unwrap_err().is_out_of_range());
        assert_eq!(value, Some(5));
        assert_eq!(stream.read_position(), 0);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Marker;

    impl BitSerializable for Marker {
        fn serialize(&self, _: &mut BitStream) -> Result<(), BitStreamError> {
            Ok(())
        }

        fn deserialize(&mut self, _: &mut BitStream) -> Result<(), BitStreamError> {
            Ok(())
        }
    }

    #[test]
    fn test_zero_bit_elements_are_rejected() {
        let mut stream = BitStream::new();
        stream.write_u32_compressed(2);
        stream.write_u8(0);

        let mut markers: Vec<Marker> = Vec::new();
        assert!(matches!(
            stream.read_object(&mut markers),
            Err(BitStreamError::InvalidArgument(_))
        ));
        assert!(markers.is_empty());
        assert_eq!(stream.read_position(), 0);
    }
}
