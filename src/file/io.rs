//! Byte order and safe reading utilities for HPROF decoding.
//!
//! HPROF stores every multi-byte value in network (big-endian) byte order, for the whole
//! file. This module provides the [`crate::file::io::HprofIO`] trait, implemented for all
//! primitive types a heap dump can contain, and bounds-checked helpers that decode those
//! types from byte slices.
//!
//! # Key Components
//!
//! - [`crate::file::io::HprofIO`] - Fixed-width big-endian decoding for primitive types
//! - [`crate::file::io::read_be`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_be_at`] - Read a value at an offset and advance the offset
//! - [`crate::file::io::read_id_at`] - Read an object id of the dump's declared width
//!
//! # Examples
//!
//! ```rust,ignore
//! use heapscope::file::io::read_be_at;
//!
//! let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02];
//! let mut offset = 0;
//!
//! let first: u16 = read_be_at(&data, &mut offset)?;
//! let second: u32 = read_be_at(&data, &mut offset)?;
//! assert_eq!((first, second, offset), (1, 2, 6));
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if the buffer holds fewer bytes than
//! the requested type needs. The reported offset is relative to the slice; callers that
//! know the absolute file position translate it.

use crate::{Error, Result};

/// Byte order mandated by the HPROF format for every field in the file.
pub const BYTE_ORDER: ByteOrder = ByteOrder::BigEndian;

/// Byte orders a binary value can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Most significant byte first
    BigEndian,
    /// Least significant byte first
    LittleEndian,
}

/// Trait for type-specific safe binary decoding.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that type (e.g., `[u8; 4]` for `u32`).
pub trait HprofIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode T from a big-endian byte array
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
    /// Decode T from a little-endian byte array
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Decode T in the given byte order
    fn from_bytes(bytes: Self::Bytes, order: ByteOrder) -> Self {
        match order {
            ByteOrder::BigEndian => Self::from_be_bytes(bytes),
            ByteOrder::LittleEndian => Self::from_le_bytes(bytes),
        }
    }
}

macro_rules! impl_hprof_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HprofIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_hprof_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Safely reads a value of type `T` in big-endian byte order from the start of a buffer.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be<T: HprofIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_be_at(data, &mut offset)
}

/// Safely reads a value of type `T` in big-endian byte order at `offset`, advancing the
/// offset by the size of `T`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: HprofIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(slice_out_of_bounds(data, *offset, type_len));
    };
    if end > data.len() {
        return Err(slice_out_of_bounds(data, *offset, type_len));
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(slice_out_of_bounds(data, *offset, type_len));
    };

    *offset = end;

    Ok(T::from_be_bytes(read))
}

/// Reads an unsigned big-endian integer of `width` bytes (1, 2, 4 or 8) at `offset`,
/// widened to `u64`, advancing the offset.
///
/// HPROF object ids are either 4 or 8 bytes wide, declared once in the file header.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes, or
/// [`crate::Error::Malformed`] for an unsupported width.
pub fn read_id_at(data: &[u8], offset: &mut usize, width: usize) -> Result<u64> {
    match width {
        1 => read_be_at::<u8>(data, offset).map(u64::from),
        2 => read_be_at::<u16>(data, offset).map(u64::from),
        4 => read_be_at::<u32>(data, offset).map(u64::from),
        8 => read_be_at::<u64>(data, offset),
        _ => Err(malformed_error!(
            *offset as u64,
            "Unsupported integer width - {}",
            width
        )),
    }
}

fn slice_out_of_bounds(data: &[u8], offset: usize, len: usize) -> Error {
    Error::OutOfBounds {
        offset: offset as u64,
        len: len as u64,
        size: data.len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_be_u8() {
        let result = read_be::<u8>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_be_u16() {
        let result = read_be::<u16>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102);
    }

    #[test]
    fn read_be_i32() {
        let result = read_be::<i32>(&[0xFF, 0xFF, 0xFF, 0xFE]).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_be_u64() {
        let result = read_be::<u64>(&TEST_BUFFER).unwrap();
        assert_eq!(result, 0x0102030405060708);
    }

    #[test]
    fn read_be_f32() {
        let result = read_be::<f32>(&1.5_f32.to_be_bytes()).unwrap();
        assert_eq!(result, 1.5);
    }

    #[test]
    fn read_be_f64() {
        let result = read_be::<f64>(&(-0.25_f64).to_be_bytes()).unwrap();
        assert_eq!(result, -0.25);
    }

    #[test]
    fn read_be_sequential() {
        let mut offset = 0;
        assert_eq!(read_be_at::<u16>(&TEST_BUFFER, &mut offset).unwrap(), 0x0102);
        assert_eq!(read_be_at::<u32>(&TEST_BUFFER, &mut offset).unwrap(), 0x03040506);
        assert_eq!(offset, 6);
    }

    #[test]
    fn from_bytes_order() {
        assert_eq!(u16::from_bytes([0x01, 0x02], ByteOrder::LittleEndian), 0x0201);
        assert_eq!(u16::from_bytes([0x01, 0x02], BYTE_ORDER), 0x0102);
    }

    #[test]
    fn read_ids() {
        let mut offset = 0;
        assert_eq!(read_id_at(&TEST_BUFFER, &mut offset, 4).unwrap(), 0x01020304);
        assert_eq!(offset, 4);

        let mut offset = 0;
        assert_eq!(
            read_id_at(&TEST_BUFFER, &mut offset, 8).unwrap(),
            0x0102030405060708
        );

        let mut offset = 0;
        assert!(matches!(
            read_id_at(&TEST_BUFFER, &mut offset, 3),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn errors() {
        let buffer = [0xFF, 0xFF, 0xFF];

        let result = read_be::<u32>(&buffer);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));

        let mut offset = 2;
        let result = read_be_at::<u16>(&buffer, &mut offset);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
        assert_eq!(offset, 2);

        let mut offset = usize::MAX;
        assert!(read_be_at::<u8>(&buffer, &mut offset).is_err());
    }
}
