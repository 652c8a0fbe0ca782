//! ECMA-335 II.23.2 compressed integer encoding.
//!
//! Portable PDB blobs (sequence points, document names, signatures) store most of their
//! numbers in this variable-length form. Values outside the encodable ranges are programming
//! errors of the caller and panic.

/// Largest value [`write_compressed_uint`] can encode.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Smallest value [`write_compressed_int`] can encode.
pub const MIN_COMPRESSED_INT: i32 = -0x1000_0000;

/// Largest value [`write_compressed_int`] can encode.
pub const MAX_COMPRESSED_INT: i32 = 0x0FFF_FFFF;

const B6: i32 = (1 << 6) - 1;
const B13: i32 = (1 << 13) - 1;
const B28: i32 = (1 << 28) - 1;

/// Number of bytes [`write_compressed_uint`] emits for `value`.
#[must_use]
pub fn compressed_uint_size(value: u32) -> usize {
    if value < 0x80 {
        1
    } else if value < 0x4000 {
        2
    } else {
        4
    }
}

/// Append `value` as a compressed unsigned integer.
///
/// # Panics
/// If `value` exceeds [`MAX_COMPRESSED_UINT`].
///
/// # Examples
///
/// ```rust
/// use pdbport::utils::compressed::write_compressed_uint;
///
/// let mut out = Vec::new();
/// write_compressed_uint(0x2E57, &mut out);
/// assert_eq!(out, [0xAE, 0x57]);
/// ```
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_uint(value: u32, out: &mut Vec<u8>) {
    match compressed_uint_size(value) {
        1 => out.push(value as u8),
        2 => {
            out.push(0x80 | (value >> 8) as u8);
            out.push(value as u8);
        }
        _ => {
            assert!(
                value <= MAX_COMPRESSED_UINT,
                "value {value:#x} is too large for a compressed unsigned integer"
            );
            out.extend_from_slice(&(0xC000_0000 | value).to_be_bytes());
        }
    }
}

/// Append `value` as a compressed signed integer.
///
/// The value is rotated left by one bit within the smallest of the 6, 13 or 28 bit widths
/// that holds it, moving the sign into bit 0.
///
/// # Panics
/// If `value` is outside `MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT`.
///
/// # Examples
///
/// ```rust
/// use pdbport::utils::compressed::write_compressed_int;
///
/// let mut out = Vec::new();
/// write_compressed_int(-3, &mut out);
/// write_compressed_int(64, &mut out);
/// assert_eq!(out, [0x7B, 0x80, 0x80]);
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn write_compressed_int(value: i32, out: &mut Vec<u8>) {
    let sign = value >> 31;

    if (value & !B6) == (sign & !B6) {
        let n = ((value & B6) << 1) | (sign & 1);
        out.push(n as u8);
    } else if (value & !B13) == (sign & !B13) {
        let n = ((value & B13) << 1) | (sign & 1);
        out.extend_from_slice(&(0x8000 | n as u16).to_be_bytes());
    } else {
        assert!(
            (MIN_COMPRESSED_INT..=MAX_COMPRESSED_INT).contains(&value),
            "value {value} is out of range for a compressed signed integer"
        );
        let n = ((value & B28) << 1) | (sign & 1);
        out.extend_from_slice(&(0xC000_0000 | n as u32).to_be_bytes());
    }
}
