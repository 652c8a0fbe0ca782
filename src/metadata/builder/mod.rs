//! Portable PDB builder.
//!
//! [`PdbBuilder`] collects heap entries and rows of the seven debug tables, then lays them out
//! as a complete Portable PDB metadata blob:
//!
//! ```text
//! BSJB root, version "PDB v1.0"
//! #Pdb      PDB id, entry point, referenced type-system tables and their row counts
//! #~        debug tables
//! #Strings  local variable and constant names
//! #US       always empty
//! #GUID     hash algorithms and languages
//! #Blob     document names, checksums, sequence points, constant signatures
//! ```
//!
//! The type-system tables of the binary the PDB is attached to are never written; they only
//! contribute their row counts, which size `MethodDef` indices in `LocalScope` and
//! `StateMachineMethod` rows.
//!
//! # Example
//!
//! ```rust
//! use pdbport::metadata::builder::{PdbBuilder, PdbHeader};
//! use pdbport::metadata::tables::TableId;
//!
//! let mut builder = PdbBuilder::new();
//! let name = builder.add_document_name("/src/Program.cs");
//! let document = builder.add_document(name, Default::default(), Default::default(), Default::default());
//! builder.add_method_debug_information(Some(document), None);
//!
//! let mut out = Vec::new();
//! builder.serialize(&PdbHeader::default(), &[(TableId::MethodDef, 1)], &mut out)?;
//! assert_eq!(&out[..4], b"BSJB");
//! # Ok::<(), pdbport::Error>(())
//! ```

mod heaps;

pub use heaps::{BlobHandle, BlobHeap, GuidHandle, GuidHeap, StringHandle, StringHeap};

use std::{io::Write, sync::Arc};

use strum::IntoEnumIterator;

use crate::{
    file::io::push_le,
    metadata::{
        root::Root,
        tables::{
            DocumentRaw, ImportScopeRaw, LocalConstantRaw, LocalScopeRaw, LocalVariableRaw,
            MethodDebugInformationRaw, RowWritable, StateMachineMethodRaw, TableId, TableInfo,
            TableInfoRef,
        },
        token::Token,
    },
    utils::compressed::write_compressed_uint,
    Result,
};

/// Version string of the metadata root of a Portable PDB.
pub const PDB_VERSION: &str = "PDB v1.0";

/// Row number of a `Document` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentHandle(pub u32);

impl DocumentHandle {
    /// The 1-based row number.
    #[must_use]
    pub fn row(self) -> u32 {
        self.0
    }
}

/// Row number of an `ImportScope` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportScopeHandle(pub u32);

/// Fixed fields of the `#Pdb` stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdbHeader {
    /// PDB id: the GUID and stamp that tie the PDB to its binary
    pub id: [u8; 20],
    /// The user entry point `MethodDef`, if any
    pub entry_point: Option<Token>,
}

/// Accumulates the heaps and debug table rows of a Portable PDB.
#[derive(Debug, Default)]
pub struct PdbBuilder {
    strings: StringHeap,
    blobs: BlobHeap,
    guids: GuidHeap,
    documents: Vec<DocumentRaw>,
    method_debug_information: Vec<MethodDebugInformationRaw>,
    local_scopes: Vec<LocalScopeRaw>,
    local_variables: Vec<LocalVariableRaw>,
    local_constants: Vec<LocalConstantRaw>,
    import_scopes: Vec<ImportScopeRaw>,
    state_machine_methods: Vec<StateMachineMethodRaw>,
}

/// Next 1-based row id and its token for a table currently holding `len` rows.
#[allow(clippy::cast_possible_truncation)]
fn next_id(table: TableId, len: usize) -> (u32, Token) {
    let rid = len as u32 + 1;
    (rid, Token::from_parts(table, rid))
}

impl PdbBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string to `#Strings`.
    pub fn add_string(&mut self, value: &str) -> StringHandle {
        self.strings.add(value)
    }

    /// Add a blob to `#Blob`.
    pub fn add_blob(&mut self, value: &[u8]) -> BlobHandle {
        self.blobs.add(value)
    }

    /// Add a GUID to `#GUID`.
    pub fn add_guid(&mut self, value: uguid::Guid) -> GuidHandle {
        self.guids.add(value)
    }

    /// Add a document name, encoded as a document-name blob.
    ///
    /// The blob starts with the separator (`/` or `\`, whichever the name uses more, `/` on a
    /// tie) followed by one compressed `#Blob` index per part between separators. Each part is
    /// stored as its own UTF-8 blob, so directories shared between documents are stored once.
    /// Empty parts, such as the one before a leading separator, use index 0.
    pub fn add_document_name(&mut self, name: &str) -> BlobHandle {
        let forward = name.matches('/').count();
        let backward = name.matches('\\').count();
        let separator = if forward >= backward { '/' } else { '\\' };

        let mut blob = Vec::with_capacity(1 + name.len() / 4);
        blob.push(separator as u8);
        for part in name.split(separator) {
            let handle = self.blobs.add(part.as_bytes());
            write_compressed_uint(handle.0, &mut blob);
        }

        self.blobs.add(&blob)
    }

    /// Append a `Document` row.
    pub fn add_document(
        &mut self,
        name: BlobHandle,
        hash_algorithm: GuidHandle,
        hash: BlobHandle,
        language: GuidHandle,
    ) -> DocumentHandle {
        let (rid, token) = next_id(TableId::Document, self.documents.len());
        self.documents.push(DocumentRaw {
            rid,
            token,
            offset: 0,
            name: name.0,
            hash_algorithm: hash_algorithm.0,
            hash: hash.0,
            language: language.0,
        });

        DocumentHandle(rid)
    }

    /// Append a `MethodDebugInformation` row. The row number must equal the `MethodDef` row it
    /// describes, so callers add one row per method, in order.
    pub fn add_method_debug_information(
        &mut self,
        document: Option<DocumentHandle>,
        sequence_points: Option<BlobHandle>,
    ) -> u32 {
        let (rid, token) = next_id(TableId::MethodDebugInformation, self.method_debug_information.len());
        self.method_debug_information.push(MethodDebugInformationRaw {
            rid,
            token,
            offset: 0,
            document: document.map_or(0, DocumentHandle::row),
            sequence_points: sequence_points.map_or(0, |handle| handle.0),
        });

        rid
    }

    /// Append a `LocalScope` row.
    ///
    /// `variable_list` and `constant_list` are the rows the scope's variables and constants
    /// will start at, see [`PdbBuilder::next_row`].
    pub fn add_local_scope(
        &mut self,
        method: u32,
        import_scope: ImportScopeHandle,
        variable_list: u32,
        constant_list: u32,
        start_offset: u32,
        length: u32,
    ) -> u32 {
        let (rid, token) = next_id(TableId::LocalScope, self.local_scopes.len());
        self.local_scopes.push(LocalScopeRaw {
            rid,
            token,
            offset: 0,
            method,
            import_scope: import_scope.0,
            variable_list,
            constant_list,
            start_offset,
            length,
        });

        rid
    }

    /// Append a `LocalVariable` row.
    pub fn add_local_variable(&mut self, attributes: u16, index: u16, name: StringHandle) -> u32 {
        let (rid, token) = next_id(TableId::LocalVariable, self.local_variables.len());
        self.local_variables.push(LocalVariableRaw {
            rid,
            token,
            offset: 0,
            attributes,
            index,
            name: name.0,
        });

        rid
    }

    /// Append a `LocalConstant` row.
    pub fn add_local_constant(&mut self, name: StringHandle, signature: BlobHandle) -> u32 {
        let (rid, token) = next_id(TableId::LocalConstant, self.local_constants.len());
        self.local_constants.push(LocalConstantRaw {
            rid,
            token,
            offset: 0,
            name: name.0,
            signature: signature.0,
        });

        rid
    }

    /// Append an `ImportScope` row.
    pub fn add_import_scope(
        &mut self,
        parent: Option<ImportScopeHandle>,
        imports: BlobHandle,
    ) -> ImportScopeHandle {
        let (rid, token) = next_id(TableId::ImportScope, self.import_scopes.len());
        self.import_scopes.push(ImportScopeRaw {
            rid,
            token,
            offset: 0,
            parent: parent.map_or(0, |handle| handle.0),
            imports: imports.0,
        });

        ImportScopeHandle(rid)
    }

    /// Append a `StateMachineMethod` row linking a `MoveNext` method to its kickoff method.
    pub fn add_state_machine_method(&mut self, move_next_method: u32, kickoff_method: u32) -> u32 {
        let (rid, token) = next_id(TableId::StateMachineMethod, self.state_machine_methods.len());
        self.state_machine_methods.push(StateMachineMethodRaw {
            rid,
            token,
            offset: 0,
            move_next_method,
            kickoff_method,
        });

        rid
    }

    /// Number of rows added to `table`; 0 for tables this builder does not write.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn row_count(&self, table: TableId) -> u32 {
        let rows = match table {
            TableId::Document => self.documents.len(),
            TableId::MethodDebugInformation => self.method_debug_information.len(),
            TableId::LocalScope => self.local_scopes.len(),
            TableId::LocalVariable => self.local_variables.len(),
            TableId::LocalConstant => self.local_constants.len(),
            TableId::ImportScope => self.import_scopes.len(),
            TableId::StateMachineMethod => self.state_machine_methods.len(),
            _ => 0,
        };

        rows as u32
    }

    /// The row number the next row added to `table` will get.
    #[must_use]
    pub fn next_row(&self, table: TableId) -> u32 {
        self.row_count(table) + 1
    }

    /// Lay out the Portable PDB and write it to `out`.
    ///
    /// `external` holds the row counts of the binary's type-system tables; entries for debug
    /// tables are ignored.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if writing to `out` fails.
    pub fn serialize<W: Write>(
        &self,
        header: &PdbHeader,
        external: &[(TableId, u32)],
        out: &mut W,
    ) -> Result<()> {
        let mut rows: Vec<(TableId, u32)> = external
            .iter()
            .copied()
            .filter(|(table, _)| !table.is_debug_table())
            .collect();
        rows.extend(
            TableId::iter()
                .filter(|table| table.is_debug_table())
                .map(|table| (table, self.row_count(table))),
        );

        let sizes: TableInfoRef = Arc::new(TableInfo::from_rows(
            &rows,
            self.strings.is_large(),
            self.guids.is_large(),
            self.blobs.is_large(),
        ));

        let pdb = self.pdb_stream(header, &sizes);
        let tables = self.tables_stream(&sizes)?;
        let guids = self.guids.to_bytes();

        let bytes = Root::write(
            PDB_VERSION,
            &[
                ("#Pdb", &pdb),
                ("#~", &tables),
                ("#Strings", self.strings.as_bytes()),
                ("#US", &[0, 0, 0, 0]),
                ("#GUID", &guids),
                ("#Blob", self.blobs.as_bytes()),
            ],
        );

        tracing::debug!(
            bytes = bytes.len(),
            documents = self.documents.len(),
            methods = self.method_debug_information.len(),
            scopes = self.local_scopes.len(),
            "serialized portable pdb"
        );

        out.write_all(&bytes)?;
        Ok(())
    }

    fn pdb_stream(&self, header: &PdbHeader, sizes: &TableInfo) -> Vec<u8> {
        let referenced: Vec<(TableId, u32)> = TableId::iter()
            .filter(|table| !table.is_debug_table())
            .map(|table| (table, sizes.rows(table)))
            .filter(|&(_, rows)| rows > 0)
            .collect();

        let mut out = Vec::with_capacity(32 + referenced.len() * 4);
        out.extend_from_slice(&header.id);
        push_le(&mut out, header.entry_point.map_or(0, |token| token.value()));
        push_le(
            &mut out,
            referenced.iter().fold(0_u64, |mask, (table, _)| mask | table.bit()),
        );
        for (_, rows) in &referenced {
            push_le(&mut out, *rows);
        }

        out
    }

    fn tables_stream(&self, sizes: &TableInfoRef) -> Result<Vec<u8>> {
        const SORTED: u64 = (1 << TableId::LocalScope as u8)
            | (1 << TableId::StateMachineMethod as u8)
            | (1 << TableId::CustomDebugInformation as u8);

        let present: Vec<TableId> = TableId::iter()
            .filter(|&table| table.is_debug_table() && self.row_count(table) > 0)
            .collect();

        let mut out = Vec::new();
        push_le(&mut out, 0_u32);
        push_le(&mut out, 2_u8);
        push_le(&mut out, 0_u8);
        push_le(&mut out, sizes.heap_size_flags());
        push_le(&mut out, 1_u8);
        push_le(&mut out, present.iter().fold(0_u64, |mask, table| mask | table.bit()));
        push_le(&mut out, SORTED);
        for &table in &present {
            push_le(&mut out, self.row_count(table));
        }

        write_rows(&self.documents, sizes, &mut out)?;
        write_rows(&self.method_debug_information, sizes, &mut out)?;
        write_rows(&self.local_scopes, sizes, &mut out)?;
        write_rows(&self.local_variables, sizes, &mut out)?;
        write_rows(&self.local_constants, sizes, &mut out)?;
        write_rows(&self.import_scopes, sizes, &mut out)?;
        write_rows(&self.state_machine_methods, sizes, &mut out)?;

        Ok(out)
    }
}

fn write_rows<T: RowWritable>(rows: &[T], sizes: &TableInfoRef, out: &mut Vec<u8>) -> Result<()> {
    let mut offset = out.len();
    out.resize(offset + rows.len() * T::row_size(sizes) as usize, 0);

    for (index, row) in rows.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        row.row_write(out, &mut offset, index as u32 + 1, sizes)?;
    }

    tracing::trace!(table = ?T::TABLE, rows = rows.len(), "wrote table rows");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::streams::{Blob, TablesHeader};

    #[test]
    fn document_name_blob() {
        let mut builder = PdbBuilder::new();
        let handle = builder.add_document_name("C:\\src\\a.cs");

        // parts "C:", "src" and "a.cs" take blobs 1, 4 and 8, the name blob follows at 13
        assert_eq!(handle, BlobHandle(13));
        assert_eq!(
            builder.blobs.as_bytes(),
            &[
                0x00, 0x02, b'C', b':', 0x03, b's', b'r', b'c', 0x04, b'a', b'.', b'c', b's',
                0x04, b'\\', 0x01, 0x04, 0x08,
            ]
        );

        // the shared directory is stored once
        let before = builder.blobs.as_bytes().len();
        builder.add_document_name("C:\\src\\b.cs");
        assert_eq!(builder.blobs.as_bytes().len(), before + 5 + 5);
    }

    #[test]
    fn document_name_edges() {
        let mut builder = PdbBuilder::new();

        let handle = builder.add_document_name("/a/");
        let blob = Blob::from(builder.blobs.as_bytes()).unwrap();
        assert_eq!(blob.get(handle.0 as usize).unwrap(), &[b'/', 0x00, 0x01, 0x00]);

        let handle = builder.add_document_name("a/b\\c\\d");
        let blob = Blob::from(builder.blobs.as_bytes()).unwrap();
        assert_eq!(blob.get(handle.0 as usize).unwrap()[0], b'\\');
    }

    #[test]
    fn row_numbers() {
        let mut builder = PdbBuilder::new();
        assert_eq!(builder.next_row(TableId::LocalVariable), 1);

        let name = builder.add_string("x");
        assert_eq!(builder.add_local_variable(0, 0, name), 1);
        assert_eq!(builder.add_local_variable(0, 1, name), 2);
        assert_eq!(builder.row_count(TableId::LocalVariable), 2);
        assert_eq!(builder.next_row(TableId::LocalVariable), 3);
        assert_eq!(builder.row_count(TableId::MethodDef), 0);

        let root = builder.add_import_scope(None, BlobHandle(0));
        assert_eq!(root, ImportScopeHandle(1));
        assert_eq!(builder.add_import_scope(Some(root), BlobHandle(0)), ImportScopeHandle(2));
    }

    #[test]
    fn serialize_layout() {
        let mut builder = PdbBuilder::new();
        let name = builder.add_document_name("/a.cs");
        let document = builder.add_document(name, GuidHandle(0), BlobHandle(0), GuidHandle(0));
        builder.add_method_debug_information(Some(document), None);
        builder.add_method_debug_information(None, None);
        builder.add_state_machine_method(2, 1);

        let header = PdbHeader {
            id: [0x11; 20],
            entry_point: Some(Token::new(0x0600_0001)),
        };
        let external = [
            (TableId::Module, 1),
            (TableId::TypeDef, 2),
            (TableId::MethodDef, 2),
            (TableId::Field, 0),
            (TableId::Document, 99),
        ];

        let mut out = Vec::new();
        builder.serialize(&header, &external, &mut out).unwrap();

        let root = Root::read(&out).unwrap();
        assert_eq!(root.version, PDB_VERSION);
        let names: Vec<&str> = root.stream_headers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["#Pdb", "#~", "#Strings", "#US", "#GUID", "#Blob"]);

        let pdb = root.stream("#Pdb", &out).unwrap();
        assert_eq!(&pdb[..20], &[0x11; 20]);
        assert_eq!(&pdb[20..24], &[0x01, 0x00, 0x00, 0x06]);
        assert_eq!(&pdb[24..32], &[0x45, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&pdb[32..44], &[1, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(pdb.len(), 44);

        let tables = root.stream("#~", &out).unwrap();
        let header = TablesHeader::with_external(tables, &external).unwrap();
        assert_eq!(header.major_version, 2);
        assert_eq!(header.table_count(), 3);
        assert_eq!(header.row_count(TableId::Document), 1);
        assert_eq!(header.row_count(TableId::MethodDebugInformation), 2);
        assert_eq!(header.row_count(TableId::StateMachineMethod), 1);
        assert_eq!(header.sorted, 0x00C4_0000_0000_0000);

        let table = header.table::<StateMachineMethodRaw>().unwrap();
        let row = table.get(1).unwrap();
        assert_eq!((row.move_next_method, row.kickoff_method), (2, 1));

        assert_eq!(root.stream("#US", &out).unwrap(), &[0, 0, 0, 0]);
        assert!(root.stream("#GUID", &out).unwrap().is_empty());
    }
}
