//! Stream headers of the metadata root.
//!
//! Each header names one stream and locates it relative to the start of the metadata root:
//! a `u32` offset, a `u32` size and a null-terminated ASCII name padded to a multiple of 4.

use crate::{
    file::io::{push_le, read_le},
    Error::OutOfBounds,
    Result,
};

/// Stream names accepted in a metadata root, including the uncompressed tables stream `#-`
/// and the Portable PDB `#Pdb` stream.
pub const STREAM_NAMES: [&str; 7] = ["#Strings", "#US", "#Blob", "#GUID", "#~", "#-", "#Pdb"];

/// A single stream header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream
    pub name: String,
}

impl StreamHeader {
    /// Parse a stream header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too short and
    /// [`crate::Error::Malformed`] for an unknown stream name.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(OutOfBounds);
        }

        let name_bytes = &data[8..std::cmp::min(data.len(), 8 + 32)];
        let name_len = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name: String = name_bytes[..name_len].iter().map(|&b| char::from(b)).collect();

        if !STREAM_NAMES.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Size of this header once written, name padding included.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        8 + Self::aligned_name_len(&self.name)
    }

    /// Length of a stream name with its terminator, padded to 4.
    #[must_use]
    pub fn aligned_name_len(name: &str) -> usize {
        (name.len() + 1 + 3) & !3
    }

    /// Append this header to `out`.
    pub fn write(&self, out: &mut Vec<u8>) {
        push_le(out, self.offset);
        push_le(out, self.size);
        out.extend_from_slice(self.name.as_bytes());
        let padding = Self::aligned_name_len(&self.name) - self.name.len();
        out.extend(std::iter::repeat(0).take(padding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
    }

    #[test]
    fn pdb_stream() {
        let header = StreamHeader {
            offset: 0x6C,
            size: 0x20,
            name: "#Pdb".to_string(),
        };

        let mut out = Vec::new();
        header.write(&mut out);
        assert_eq!(out.len(), header.encoded_size());
        assert_eq!(
            out,
            [0x6C, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, b'#', b'P', b'd', b'b', 0, 0, 0, 0]
        );
        assert_eq!(StreamHeader::from(&out).unwrap(), header);
    }

    #[test]
    fn invalid_name() {
        let header_bytes = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, b'#', b'X', 0x00];
        assert!(StreamHeader::from(&header_bytes).is_err());
        assert!(StreamHeader::from(&header_bytes[..8]).is_err());
    }
}
