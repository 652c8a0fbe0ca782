//! Debug directory entries and the CodeView `RSDS` record.
//!
//! ```text
//! IMAGE_DEBUG_DIRECTORY (28 bytes)       RSDS record
//! 0   Characteristics   u32              0   "RSDS"
//! 4   TimeDateStamp     u32              4   GUID (16 bytes)
//! 8   MajorVersion      u16              20  Age u32
//! 10  MinorVersion      u16              24  Path, null terminated UTF-8
//! 12  Type              u32
//! 16  SizeOfData        u32
//! 20  AddressOfRawData  u32
//! 24  PointerToRawData  u32
//! ```

use uguid::Guid;

use crate::{file::parser::Parser, Result};

/// Size of one debug directory entry.
pub const DEBUG_DIRECTORY_ENTRY_SIZE: usize = 28;

/// `IMAGE_DEBUG_TYPE_CODEVIEW`.
pub const IMAGE_DEBUG_TYPE_CODEVIEW: u32 = 2;

/// Signature of a PDB 7.0 CodeView record.
pub const CODEVIEW_SIGNATURE: [u8; 4] = *b"RSDS";

/// The CodeView entry linking a binary to its PDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeViewEntry {
    /// The PDB GUID
    pub guid: Guid,
    /// The PDB age
    pub age: u32,
    /// `TimeDateStamp` of the debug directory entry
    pub stamp: u32,
    /// Path of the PDB as recorded by the compiler
    pub path: String,
}

/// A raw debug directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DebugDirectoryEntry {
    pub time_date_stamp: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub data_type: u32,
    pub size_of_data: u32,
    pub address_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
}

impl DebugDirectoryEntry {
    /// Parse the entries of a debug directory. Trailing bytes short of a full entry are ignored.
    pub fn read_all(data: &[u8]) -> Result<Vec<DebugDirectoryEntry>> {
        let mut parser = Parser::new(data);
        let mut entries = Vec::with_capacity(data.len() / DEBUG_DIRECTORY_ENTRY_SIZE);

        while parser.remaining() >= DEBUG_DIRECTORY_ENTRY_SIZE {
            let _characteristics = parser.read_le::<u32>()?;
            entries.push(DebugDirectoryEntry {
                time_date_stamp: parser.read_le::<u32>()?,
                major_version: parser.read_le::<u16>()?,
                minor_version: parser.read_le::<u16>()?,
                data_type: parser.read_le::<u32>()?,
                size_of_data: parser.read_le::<u32>()?,
                address_of_raw_data: parser.read_le::<u32>()?,
                pointer_to_raw_data: parser.read_le::<u32>()?,
            });
        }

        Ok(entries)
    }
}

impl CodeViewEntry {
    /// Parse an `RSDS` record. Returns `None` for other CodeView formats (`NB10`).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for a truncated record and
    /// [`crate::Error::Malformed`] if the path is not UTF-8.
    pub fn read(data: &[u8], stamp: u32) -> Result<Option<CodeViewEntry>> {
        let mut parser = Parser::new(data);
        if parser.read_bytes(4)? != CODEVIEW_SIGNATURE {
            return Ok(None);
        }

        let mut guid = [0_u8; 16];
        guid.copy_from_slice(parser.read_bytes(16)?);
        let age = parser.read_le::<u32>()?;
        let path = parser.read_string_utf8()?;

        Ok(Some(CodeViewEntry {
            guid: Guid::from_bytes(guid),
            age,
            stamp,
            path,
        }))
    }
}

#[cfg(test)]
mod tests {
    use uguid::guid;

    use super::*;

    #[test]
    fn rsds_record() {
        let mut data = b"RSDS".to_vec();
        data.extend_from_slice(&guid!("01020304-0506-0708-090a-0b0c0d0e0f10").to_bytes());
        data.extend_from_slice(&3_u32.to_le_bytes());
        data.extend_from_slice(b"C:\\obj\\App.pdb\0");

        let entry = CodeViewEntry::read(&data, 0xAABB_CCDD).unwrap().unwrap();
        assert_eq!(entry.guid, guid!("01020304-0506-0708-090a-0b0c0d0e0f10"));
        assert_eq!(entry.age, 3);
        assert_eq!(entry.stamp, 0xAABB_CCDD);
        assert_eq!(entry.path, "C:\\obj\\App.pdb");

        assert!(CodeViewEntry::read(b"NB10\0\0\0\0", 0).unwrap().is_none());
        assert!(CodeViewEntry::read(b"RSDS\0\0", 0).is_err());
    }

    #[test]
    fn directory_entries() {
        let mut data = vec![0_u8; DEBUG_DIRECTORY_ENTRY_SIZE * 2 + 5];
        data[4..8].copy_from_slice(&0x1122_3344_u32.to_le_bytes());
        data[12..16].copy_from_slice(&IMAGE_DEBUG_TYPE_CODEVIEW.to_le_bytes());
        data[16..20].copy_from_slice(&33_u32.to_le_bytes());
        data[28 + 12..28 + 16].copy_from_slice(&16_u32.to_le_bytes());

        let entries = DebugDirectoryEntry::read_all(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].time_date_stamp, 0x1122_3344);
        assert_eq!(entries[0].data_type, IMAGE_DEBUG_TYPE_CODEVIEW);
        assert_eq!(entries[0].size_of_data, 33);
        assert_eq!(entries[1].data_type, 16);
    }
}
