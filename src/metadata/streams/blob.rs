//! `#Blob` heap reader.
//!
//! Every entry is a compressed unsigned length followed by that many bytes. Index 0 is the
//! empty blob, so the heap always starts with a single `0x00` byte.

use crate::{file::parser::Parser, Error::OutOfBounds, Result};

/// A view over the bytes of a `#Blob` heap.
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Wrap the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap does not start with the empty blob.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// The blob at heap offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the offset or the blob's length runs past the
    /// heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let data_start = index + parser.pos();
        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };
        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the heap holds nothing but the empty blob.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x00,
            0x03, 0x2F, 0x01, 0x02,
            0x02, 0xAB, 0xCD,
            0x00,
        ];

        let blob = Blob::from(&data).unwrap();
        assert_eq!(blob.get(0).unwrap(), &[] as &[u8]);
        assert_eq!(blob.get(1).unwrap(), &[0x2F, 0x01, 0x02]);
        assert_eq!(blob.get(5).unwrap(), &[0xAB, 0xCD]);
        assert!(blob.get(9).is_err());
        assert_eq!(blob.len(), 9);
    }

    #[test]
    fn truncated() {
        let data = [0x00, 0x05, 0x01];
        let blob = Blob::from(&data).unwrap();
        assert!(matches!(blob.get(1), Err(OutOfBounds)));

        assert!(Blob::from(&[0x01]).is_err());
        assert!(Blob::from(&[]).is_err());
    }
}
