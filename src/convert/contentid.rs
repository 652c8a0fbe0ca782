//! The PDB id tying a Portable PDB to its binary.

use uguid::Guid;

use crate::binary::CodeViewEntry;

/// The 20 byte PDB id: the CodeView GUID followed by the little-endian stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentId {
    /// The GUID
    pub guid: Guid,
    /// The stamp
    pub stamp: u32,
}

impl ContentId {
    /// The id a debugger expects for the PDB referenced by `codeview`.
    #[must_use]
    pub fn from_codeview(codeview: &CodeViewEntry) -> Self {
        ContentId {
            guid: codeview.guid,
            stamp: codeview.stamp,
        }
    }

    /// The id as stored in the `#Pdb` stream.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut id = [0_u8; 20];
        id[..16].copy_from_slice(&self.guid.to_bytes());
        id[16..].copy_from_slice(&self.stamp.to_le_bytes());
        id
    }
}
