//! Read-only view over a Portable PDB metadata blob.
//!
//! [`PortablePdb`] parses the root, the `#Pdb` stream and the heaps of a produced PDB and opens
//! its debug tables, so a conversion result can be inspected without a .NET runtime.
//!
//! # Example
//!
//! ```rust,no_run
//! use pdbport::metadata::{pdb::PortablePdb, tables::DocumentRaw};
//!
//! let bytes = std::fs::read("program.pdb")?;
//! let pdb = PortablePdb::read(&bytes)?;
//!
//! for document in pdb.table::<DocumentRaw>()?.iter() {
//!     println!("{}", pdb.document_name(document.name)?);
//! }
//! # Ok::<(), pdbport::Error>(())
//! ```

use strum::IntoEnumIterator;

use crate::{
    file::parser::Parser,
    metadata::{
        builder::PDB_VERSION,
        root::Root,
        sequencepoints::{parse_sequence_points, SequencePoints},
        streams::{Blob, Guid, Strings, TablesHeader},
        tables::{MetadataTable, MethodDebugInformationRaw, RowReadable, TableId},
        token::Token,
    },
    Result,
};

/// A parsed Portable PDB.
pub struct PortablePdb<'a> {
    id: [u8; 20],
    entry_point: Option<Token>,
    external: Vec<(TableId, u32)>,
    tables: TablesHeader<'a>,
    strings: Strings<'a>,
    blobs: Blob<'a>,
    guids: Guid<'a>,
}

impl<'a> PortablePdb<'a> {
    /// Parse the metadata blob of a Portable PDB.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the root is not a Portable PDB root or a required
    /// stream is missing, and [`crate::Error::OutOfBounds`] for truncated streams.
    pub fn read(data: &'a [u8]) -> Result<PortablePdb<'a>> {
        let root = Root::read(data)?;
        if root.version != PDB_VERSION {
            return Err(malformed_error!("Unexpected metadata version - {}", root.version));
        }

        let mut parser = Parser::new(root.stream("#Pdb", data)?);
        let mut id = [0_u8; 20];
        id.copy_from_slice(parser.read_bytes(20)?);

        let entry_point = Token::new(parser.read_le::<u32>()?);
        let referenced = parser.read_le::<u64>()?;

        let mut external = Vec::with_capacity(referenced.count_ones() as usize);
        for bit in 0..64_u8 {
            if referenced & (1 << bit) == 0 {
                continue;
            }

            let rows = parser.read_le::<u32>()?;
            match TableId::from_index(bit) {
                Some(table) if !table.is_debug_table() => external.push((table, rows)),
                _ => {
                    return Err(malformed_error!(
                        "Referenced table {} is not a type-system table",
                        bit
                    ))
                }
            }
        }

        let tables = TablesHeader::with_external(root.stream("#~", data)?, &external)?;

        Ok(PortablePdb {
            id,
            entry_point: (!entry_point.is_null()).then_some(entry_point),
            external,
            tables,
            strings: Strings::from(root.stream("#Strings", data)?)?,
            blobs: Blob::from(root.stream("#Blob", data)?)?,
            guids: Guid::from(root.stream("#GUID", data)?)?,
        })
    }

    /// The 20 byte PDB id: GUID followed by the stamp.
    #[must_use]
    pub fn pdb_id(&self) -> &[u8; 20] {
        &self.id
    }

    /// The GUID part of the PDB id.
    #[must_use]
    pub fn guid(&self) -> uguid::Guid {
        let mut bytes = [0_u8; 16];
        bytes.copy_from_slice(&self.id[..16]);
        uguid::Guid::from_bytes(bytes)
    }

    /// The stamp part of the PDB id.
    #[must_use]
    pub fn stamp(&self) -> u32 {
        u32::from_le_bytes([self.id[16], self.id[17], self.id[18], self.id[19]])
    }

    /// The user entry point.
    #[must_use]
    pub fn entry_point(&self) -> Option<Token> {
        self.entry_point
    }

    /// Row count the PDB records for a type-system table of its binary.
    #[must_use]
    pub fn external_rows(&self, table: TableId) -> u32 {
        self.external
            .iter()
            .find(|(id, _)| *id == table)
            .map_or(0, |&(_, rows)| rows)
    }

    /// Row counts of every table kind, type-system tables from the `#Pdb` stream and debug
    /// tables from `#~`.
    #[must_use]
    pub fn row_counts(&self) -> Vec<(TableId, u32)> {
        TableId::iter()
            .map(|table| {
                let rows = if table.is_debug_table() {
                    self.tables.row_count(table)
                } else {
                    self.external_rows(table)
                };
                (table, rows)
            })
            .collect()
    }

    /// Open a debug table.
    ///
    /// # Errors
    /// Returns an error if the tables stream is malformed.
    pub fn table<T: RowReadable>(&self) -> Result<MetadataTable<'a, T>> {
        self.tables.table::<T>()
    }

    /// The tables stream header.
    #[must_use]
    pub fn tables(&self) -> &TablesHeader<'a> {
        &self.tables
    }

    /// The `#Strings` heap.
    #[must_use]
    pub fn strings(&self) -> &Strings<'a> {
        &self.strings
    }

    /// The `#Blob` heap.
    #[must_use]
    pub fn blobs(&self) -> &Blob<'a> {
        &self.blobs
    }

    /// The `#GUID` heap.
    #[must_use]
    pub fn guids(&self) -> &Guid<'a> {
        &self.guids
    }

    /// Reassemble a document name from its document-name blob.
    ///
    /// # Errors
    /// Returns an error if the blob or one of its parts is out of bounds or not UTF-8.
    pub fn document_name(&self, blob: u32) -> Result<String> {
        let mut parser = Parser::new(self.blobs.get(blob as usize)?);
        let separator = parser.read_le::<u8>()?;
        if !separator.is_ascii() {
            return Err(malformed_error!("Invalid document name separator - {}", separator));
        }

        let mut name = String::new();
        let mut first = true;
        while parser.has_more_data() {
            if !first && separator != 0 {
                name.push(char::from(separator));
            }
            first = false;

            let part = parser.read_compressed_uint()?;
            let bytes = self.blobs.get(part as usize)?;
            match std::str::from_utf8(bytes) {
                Ok(part) => name.push_str(part),
                Err(_) => return Err(malformed_error!("Invalid document name part - {}", part)),
            }
        }

        Ok(name)
    }

    /// Decode the sequence points of a `MethodDebugInformation` row, `None` if it has none.
    ///
    /// # Errors
    /// Returns an error if the blob is malformed.
    pub fn sequence_points(&self, row: &MethodDebugInformationRaw) -> Result<Option<SequencePoints>> {
        if row.sequence_points == 0 {
            return Ok(None);
        }

        let blob = self.blobs.get(row.sequence_points as usize)?;
        let document = (row.document != 0).then_some(row.document);
        parse_sequence_points(blob, document).map(Some)
    }

    /// The string at `index` of the `#Strings` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap.
    pub fn string(&self, index: u32) -> Result<&'a str> {
        self.strings.get(index as usize)
    }

    /// The blob at `index` of the `#Blob` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap.
    pub fn blob(&self, index: u32) -> Result<&'a [u8]> {
        self.blobs.get(index as usize)
    }
}

#[cfg(test)]
mod tests {
    use uguid::guid;

    use super::*;
    use crate::metadata::{
        builder::{PdbBuilder, PdbHeader},
        tables::{DocumentRaw, LocalVariableRaw},
    };

    fn sample() -> Vec<u8> {
        let mut builder = PdbBuilder::new();
        let name = builder.add_document_name("/src/lib/a.cs");
        let language = builder.add_guid(guid!("3f5162f8-07c6-11d3-9053-00c04fa302a1"));
        let hash = builder.add_blob(&[0xDE, 0xAD]);
        let document = builder.add_document(name, Default::default(), hash, language);

        let points = builder.add_blob(&[0x00, 0x01, 0x00, 0x05, 0x0A, 0x02]);
        builder.add_method_debug_information(Some(document), Some(points));
        builder.add_method_debug_information(None, None);

        let variable = builder.add_string("count");
        builder.add_local_variable(0, 2, variable);

        let mut id = [0_u8; 20];
        id[16..].copy_from_slice(&0x1234_5678_u32.to_le_bytes());
        let header = PdbHeader {
            id,
            entry_point: Some(Token::new(0x0600_0002)),
        };

        let mut out = Vec::new();
        builder
            .serialize(&header, &[(TableId::MethodDef, 2), (TableId::TypeDef, 1)], &mut out)
            .unwrap();
        out
    }

    #[test]
    fn read_back() {
        let bytes = sample();
        let pdb = PortablePdb::read(&bytes).unwrap();

        assert_eq!(pdb.stamp(), 0x1234_5678);
        assert_eq!(pdb.guid(), uguid::Guid::ZERO);
        assert_eq!(pdb.entry_point(), Some(Token::new(0x0600_0002)));
        assert_eq!(pdb.external_rows(TableId::MethodDef), 2);
        assert_eq!(pdb.external_rows(TableId::Field), 0);

        let counts = pdb.row_counts();
        assert_eq!(counts.len(), TableId::iter().count());
        assert!(counts.contains(&(TableId::TypeDef, 1)));
        assert!(counts.contains(&(TableId::MethodDebugInformation, 2)));

        let document = pdb.table::<DocumentRaw>().unwrap().get(1).unwrap();
        assert_eq!(pdb.document_name(document.name).unwrap(), "/src/lib/a.cs");
        assert_eq!(pdb.blob(document.hash).unwrap(), &[0xDE, 0xAD]);
        assert_eq!(
            pdb.guids().get(document.language as usize).unwrap(),
            guid!("3f5162f8-07c6-11d3-9053-00c04fa302a1")
        );

        let methods = pdb.table::<MethodDebugInformationRaw>().unwrap();
        let points = pdb.sequence_points(&methods.get(1).unwrap()).unwrap().unwrap();
        assert_eq!(points.points[0].document, 1);
        assert_eq!(points.points[0].start_line, 10);
        assert!(pdb.sequence_points(&methods.get(2).unwrap()).unwrap().is_none());

        let variable = pdb.table::<LocalVariableRaw>().unwrap().get(1).unwrap();
        assert_eq!(pdb.string(variable.name).unwrap(), "count");
        assert_eq!(variable.index, 2);
    }

    #[test]
    fn rejects_other_metadata() {
        let bytes = Root::write("v4.0.30319", &[("#~", &[0u8; 24][..])]);
        assert!(PortablePdb::read(&bytes).is_err());
    }
}
