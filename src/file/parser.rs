//! Cursor-based byte stream parser.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over a
//! byte slice. It reads the little-endian fixed-size fields of PE and metadata structures and
//! the ECMA-335 compressed integers that make up Portable PDB blobs such as sequence points and
//! document names.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::seek`] - Move to specific position
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::remaining`] - Bytes left after the cursor
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_le`] - Read primitive types (little-endian)
//! - [`crate::file::parser::Parser::peek_byte`] - Peek at current byte without advancing
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a run of raw bytes
//! - [`crate::file::parser::Parser::read_string_utf8`] - Read a null-terminated UTF-8 string
//!
//! ## Compressed Integers
//! - [`crate::file::parser::Parser::read_compressed_uint`] - ECMA-335 II.23.2 unsigned form
//! - [`crate::file::parser::Parser::read_compressed_int`] - ECMA-335 II.23.2 signed form
//!
//! The write side of the compressed integer encoding lives in [`crate::utils::compressed`].
//!
//! # Examples
//!
//! ```rust
//! use pdbport::Parser;
//!
//! // A sequence-point style run: header, offset, line delta, signed column delta
//! let data = [0x00, 0x05, 0x01, 0x7F];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_compressed_uint()?, 0);
//! assert_eq!(parser.read_compressed_uint()?, 5);
//! assert_eq!(parser.read_compressed_uint()?, 1);
//! assert_eq!(parser.read_compressed_int()?, -1);
//! assert!(!parser.has_more_data());
//! # Ok::<(), pdbport::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, CilIO},
    Error::OutOfBounds,
    Result,
};

/// A generic binary data parser for reading metadata structures.
///
/// The parser keeps a position within the borrowed data. Every read validates that enough
/// bytes remain before touching the buffer and advances the position on success; a failed read
/// leaves the position unchanged.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of bytes left between the cursor and the end of the data.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the current position to the specified index.
    ///
    /// Seeking to exactly the end of the data is allowed; the next read fails.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is beyond the data length.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(OutOfBounds);
        }

        self.position = pos;
        Ok(())
    }

    /// Returns the current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the byte at the cursor without advancing.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        self.data.get(self.position).copied().ok_or(OutOfBounds)
    }

    /// Read a little-endian value of type `T` and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let Some(end) = self.position.checked_add(length) else {
            return Err(OutOfBounds);
        };
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a null-terminated UTF-8 string and advance past the terminator.
    ///
    /// A string that runs to the end of the data without a terminator is accepted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let rest = &self.data[self.position..];
        let length = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());

        let value = std::str::from_utf8(&rest[..length])
            .map_err(|_| malformed_error!("Invalid UTF-8 string at offset {}", self.position))?
            .to_string();

        self.position = (self.position + length + 1).min(self.data.len());
        Ok(value)
    }

    /// Read a compressed unsigned integer as defined in ECMA-335 II.23.2.
    ///
    /// - Values 0-127: 1 byte (0xxxxxxx)
    /// - Values 128-16383: 2 bytes (10xxxxxx xxxxxxxx)
    /// - Values 16384-536870911: 4 bytes (110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx)
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid compressed uint format.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        Ok(self.read_compressed_raw()?.0)
    }

    /// Read a compressed signed integer as defined in ECMA-335 II.23.2.
    ///
    /// The encoded value is the two's complement number rotated left by one bit within the
    /// width of its encoding (6, 13 or 28 bits), so the sign ends up in bit 0. Decoding rotates
    /// back and sign-extends from the width that was actually used.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length or
    /// [`crate::Error::Malformed`] for invalid encoding.
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let (value, width) = self.read_compressed_raw()?;

        let magnitude = value >> 1;
        if value & 1 == 0 {
            #[allow(clippy::cast_possible_wrap)]
            return Ok(magnitude as i32);
        }

        let extension = match width {
            1 => 0xFFFF_FFC0,
            2 => 0xFFFF_E000,
            _ => 0xF000_0000,
        };

        #[allow(clippy::cast_possible_wrap)]
        Ok((magnitude | extension) as i32)
    }

    fn read_compressed_raw(&mut self) -> Result<(u32, u8)> {
        let start = self.position;
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok((u32::from(first_byte), 1));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let Ok(second_byte) = self.read_le::<u8>() else {
                self.position = start;
                return Err(OutOfBounds);
            };
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok((value, 2));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let Ok(rest) = self.read_bytes(3) else {
                self.position = start;
                return Err(OutOfBounds);
            };
            let value = ((u32::from(first_byte) & 0x1F) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2]);
            return Ok((value, 4));
        }

        self.position = start;
        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_compressed_uint() {
        let test_cases = vec![
            (vec![0x03], 3),
            (vec![0x7F], 0x7F),
            (vec![0x80, 0x80], 0x80),
            (vec![0xAE, 0x57], 0x2E57),
            (vec![0xBF, 0xFF], 0x3FFF),
            (vec![0xC0, 0x00, 0x40, 0x00], 0x4000),
            (vec![0xDF, 0xFF, 0xFF, 0xFF], 0x1FFF_FFFF),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_compressed_uint().unwrap(), expected);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn read_compressed_int() {
        // ECMA-335 II.23.2 reference encodings
        let test_cases = vec![
            (vec![0x06], 3),
            (vec![0x7B], -3),
            (vec![0x80, 0x80], 64),
            (vec![0x01], -64),
            (vec![0xC0, 0x00, 0x40, 0x00], 8192),
            (vec![0x80, 0x01], -8192),
            (vec![0xDF, 0xFF, 0xFF, 0xFE], 268_435_455),
            (vec![0xC0, 0x00, 0x00, 0x01], -268_435_456),
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            assert_eq!(parser.read_compressed_int().unwrap(), expected, "{:02X?}", input);
        }
    }

    #[test]
    fn read_compressed_truncated() {
        let data = [0xC0, 0x00];
        let mut parser = Parser::new(&data);
        assert!(matches!(parser.read_compressed_uint(), Err(OutOfBounds)));
        assert_eq!(parser.pos(), 0);

        let data = [0xE0];
        let mut parser = Parser::new(&data);
        assert!(parser.read_compressed_uint().is_err());
    }

    #[test]
    fn read_string_utf8() {
        let data = b"test.pdb\0rest";
        let mut parser = Parser::new(data);
        assert_eq!(parser.read_string_utf8().unwrap(), "test.pdb");
        assert_eq!(parser.pos(), 9);
        assert_eq!(parser.read_string_utf8().unwrap(), "rest");
        assert!(!parser.has_more_data());
    }

    #[test]
    fn seek_and_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        parser.seek(1).unwrap();
        assert_eq!(parser.read_bytes(3).unwrap(), &[0x02, 0x03, 0x04]);
        assert_eq!(parser.remaining(), 1);
        assert_eq!(parser.peek_byte().unwrap(), 0x05);
        assert!(parser.read_bytes(2).is_err());
        assert!(parser.seek(6).is_err());
        parser.seek(5).unwrap();
        assert!(parser.peek_byte().is_err());
    }
}
