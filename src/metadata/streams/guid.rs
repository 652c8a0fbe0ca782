//! `#GUID` heap reader.
//!
//! A flat array of 16 byte GUIDs addressed by 1-based index; index 0 means "no GUID".

use crate::{Error::OutOfBounds, Result};

/// A view over the bytes of a `#GUID` heap.
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Wrap the heap bytes. An empty heap is valid.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is not a whole number of GUIDs.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "Size of #GUID heap is not a multiple of 16 - {}",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// The GUID at 1-based `index`. Index 0 resolves to the nil GUID.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the last GUID.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Ok(uguid::Guid::ZERO);
        }
        if index > self.len() {
            return Err(OutOfBounds);
        }

        let offset_start = (index - 1) * 16;
        let mut buffer = [0u8; 16];
        buffer.copy_from_slice(&self.data[offset_start..offset_start + 16]);
        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len() / 16
    }

    /// `true` if the heap holds no GUID.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
