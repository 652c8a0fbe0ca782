//! `#Strings` heap reader.
//!
//! Null-terminated UTF-8 strings addressed by byte offset. Offset 0 is the empty string.

use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// A view over the bytes of a `#Strings` heap.
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Wrap the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap does not start with the empty string.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #String heap is empty"));
        }

        Ok(Strings { data })
    }

    /// The string starting at heap offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an offset past the heap and
    /// [`crate::Error::Malformed`] for an unterminated or non UTF-8 string.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }
}
