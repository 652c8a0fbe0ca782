//! Endian-aware reading and writing of primitive values.
//!
//! Every fixed-size field of the PE image, the metadata root, the `#~` stream and the
//! Portable PDB tables is little-endian. This module provides bounds-checked helpers over
//! byte slices for those fields, plus the 2-or-4 byte "dynamic" index fields whose width
//! depends on heap and table sizes.
//!
//! # Key Components
//!
//! - [`CilIO`] - Trait implemented by every primitive that can be read or written
//! - [`read_le`] / [`read_le_at`] / [`read_le_at_dyn`] - Bounds-checked readers
//! - [`write_le_at`] / [`write_le_at_dyn`] - Bounds-checked writers into preallocated buffers
//! - [`push_le`] - Appends a value to a growing buffer
//!
//! # Examples
//!
//! ```rust
//! use pdbport::file::io::{read_le_at, read_le_at_dyn};
//!
//! let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00];
//! let mut offset = 0;
//!
//! let first: u32 = read_le_at(&data, &mut offset)?;
//! let index = read_le_at_dyn(&data, &mut offset, false)?;
//! assert_eq!((first, index, offset), (1, 2, 6));
//! # Ok::<(), pdbport::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// A primitive value with a fixed-size little-endian and big-endian byte representation.
pub trait CilIO: Sized {
    /// The byte array holding the encoded value.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_cil_io {
    ($($ty:ty),*) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_cil_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Read a value from the start of `data` in little-endian.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than the value.
pub fn read_le<T: CilIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value at `offset` in little-endian and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in `data`.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Read a 2 or 4 byte little-endian index, depending on `is_large`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the index does not fit in `data`.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}

/// Write a value at `offset` in little-endian and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in `data`.
pub fn write_le_at<T: CilIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    let bytes = value.to_le_bytes();
    let bytes = bytes.as_ref();
    let Some(end) = offset.checked_add(bytes.len()) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    data[*offset..end].copy_from_slice(bytes);
    *offset = end;

    Ok(())
}

/// Write a 2 or 4 byte little-endian index, depending on `is_large`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the index does not fit in `data`, and
/// [`crate::Error::Malformed`] if a small index is asked to hold a value above `u16::MAX`.
pub fn write_le_at_dyn(data: &mut [u8], offset: &mut usize, value: u32, is_large: bool) -> Result<()> {
    if is_large {
        write_le_at::<u32>(data, offset, value)
    } else {
        let Ok(small) = u16::try_from(value) else {
            return Err(malformed_error!(
                "Index {} does not fit into a 2 byte column",
                value
            ));
        };
        write_le_at::<u16>(data, offset, small)
    }
}

/// Append a value to `out` in little-endian.
pub fn push_le<T: CilIO>(out: &mut Vec<u8>, value: T) {
    out.extend_from_slice(value.to_le_bytes().as_ref());
}
