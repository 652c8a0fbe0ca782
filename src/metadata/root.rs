//! Metadata root header and stream directory.
//!
//! This module defines the [`Root`] struct, the `BSJB` header that starts both the metadata
//! of a .NET binary and a standalone Portable PDB. It carries the version string and the
//! directory of streams (`#~`, `#Strings`, `#Blob`, `#Pdb`, ...).
//!
//! [`Root::read`] parses a root from existing bytes; [`Root::write`] lays out a new root with
//! its streams, which is how the Portable PDB builder produces its output.
//!
//! # Example
//!
//! ```rust
//! use pdbport::metadata::root::Root;
//!
//! let bytes = Root::write("PDB v1.0", &[("#~", &[0u8; 8][..]), ("#Strings", &[0u8; 4][..])]);
//! let root = Root::read(&bytes)?;
//!
//! assert_eq!(root.version, "PDB v1.0");
//! assert_eq!(root.stream("#Strings", &bytes)?, &[0u8; 4]);
//! # Ok::<(), pdbport::Error>(())
//! ```
//!
//! # References
//!
//! - [ECMA-335 II.24.2.1: Metadata root](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf)

use crate::{
    file::io::{push_le, read_le, read_le_at},
    metadata::streams::StreamHeader,
    Error::OutOfBounds,
    Result,
};

/// The MAGIC value indicating the CIL header
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// The most streams a root may declare: the five ECMA-335 heaps plus `#Pdb`, with one spare
/// for binaries that carry both `#~` and `#-`.
const MAX_STREAMS: u16 = 7;

/// The header of a metadata blob, providing the version and the stream directory.
pub struct Root {
    /// Magic signature for physical metadata: 0x424A5342
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Number of bytes allocated to hold the version string, padding included
    pub length: u32,
    /// Version string, without trailing padding
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// Number of streams
    pub stream_number: u16,
    /// Stream headers, in directory order
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Parse a metadata root and validate its stream directory against `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if any structure runs past `data` and
    /// [`crate::Error::Malformed`] for a wrong signature or an invalid stream directory.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 32 {
            return Err(OutOfBounds);
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let version_string_length = read_le_at::<u32>(data, &mut 12)?;
        let Some(version_end) = (version_string_length as usize).checked_add(16) else {
            return Err(malformed_error!(
                "Version string length causing integer overflow - {}",
                version_string_length
            ));
        };
        if version_end + 4 > data.len() {
            return Err(OutOfBounds);
        }

        let version_bytes = &data[16..version_end];
        let version_len = version_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(version_bytes.len());
        let version: String = version_bytes[..version_len]
            .iter()
            .map(|&b| char::from(b))
            .collect();

        let mut cursor = version_end;
        let flags = read_le_at::<u16>(data, &mut cursor)?;
        let stream_count = read_le_at::<u16>(data, &mut cursor)?;
        if stream_count == 0
            || stream_count > MAX_STREAMS
            || (stream_count as usize * 9) > data.len()
        {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams: Vec<StreamHeader> = Vec::with_capacity(stream_count as usize);
        let mut stream_offset = cursor;
        for _ in 0..stream_count {
            if stream_offset > data.len() {
                return Err(OutOfBounds);
            }

            let new_stream = StreamHeader::from(&data[stream_offset..])?;
            match new_stream.offset.checked_add(new_stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(OutOfBounds);
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            if streams.iter().any(|stream| stream.name == new_stream.name) {
                return Err(malformed_error!("Duplicate stream - {}", new_stream.name));
            }

            stream_offset += new_stream.encoded_size();
            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_string_length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }

    /// Find the header of the stream called `name`.
    #[must_use]
    pub fn stream_header(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|stream| stream.name == name)
    }

    /// Borrow the content of the stream called `name` from the metadata bytes this root was
    /// read from.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream does not exist.
    pub fn stream<'a>(&self, name: &str, data: &'a [u8]) -> Result<&'a [u8]> {
        let Some(header) = self.stream_header(name) else {
            return Err(malformed_error!("Missing stream - {}", name));
        };

        let start = header.offset as usize;
        let end = start + header.size as usize;
        data.get(start..end).ok_or(OutOfBounds)
    }

    /// Lay out a metadata root with the given version string followed by `streams`, in order.
    ///
    /// The version string is null-padded to a multiple of 4, every stream is padded to a
    /// multiple of 4 and its header records the padded size.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn write(version: &str, streams: &[(&str, &[u8])]) -> Vec<u8> {
        let version_length = (version.len() + 1 + 3) & !3;
        let directory_size: usize = streams
            .iter()
            .map(|(name, _)| 8 + StreamHeader::aligned_name_len(name))
            .sum();

        let mut headers = Vec::with_capacity(streams.len());
        let mut offset = 16 + version_length + 4 + directory_size;
        for (name, content) in streams {
            let size = (content.len() + 3) & !3;
            headers.push(StreamHeader {
                offset: offset as u32,
                size: size as u32,
                name: (*name).to_string(),
            });
            offset += size;
        }

        let mut out = Vec::with_capacity(offset);
        push_le(&mut out, CIL_HEADER_MAGIC);
        push_le(&mut out, 1_u16);
        push_le(&mut out, 1_u16);
        push_le(&mut out, 0_u32);
        push_le(&mut out, version_length as u32);
        out.extend_from_slice(version.as_bytes());
        out.resize(16 + version_length, 0);
        push_le(&mut out, 0_u16);
        push_le(&mut out, streams.len() as u16);
        for header in &headers {
            header.write(&mut out);
        }

        for (_, content) in streams {
            out.extend_from_slice(content);
            out.resize((out.len() + 3) & !3, 0);
        }

        out
    }
}
