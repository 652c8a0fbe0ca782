//! Header of the tables stream (`#~`, or `#-` for the uncompressed variant).
//!
//! ```text
//! offset  size  field
//! 0       4     reserved, 0
//! 4       1     major version
//! 5       1     minor version
//! 6       1     heap-size flags
//! 7       1     reserved, 1
//! 8       8     valid: bit mask of present tables
//! 16      8     sorted: bit mask of sorted tables
//! 24      4*n   row count of each present table, ascending table number
//! ...           rows of each present table, same order
//! ```
//!
//! For the external binary only the row counts matter. For a Portable PDB the debug tables
//! can be opened as [`MetadataTable`]s; their `MethodDef` columns are sized from the row
//! counts recorded in the `#Pdb` stream, which are passed in as `external`.

use std::sync::Arc;

use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{
        debug_row_size, MetadataTable, RowReadable, TableId, TableInfo, TableInfoRef,
    },
    Error::OutOfBounds,
    Result,
};

/// Parsed header of a tables stream.
pub struct TablesHeader<'a> {
    /// Major version of the table schema
    pub major_version: u8,
    /// Minor version of the table schema
    pub minor_version: u8,
    /// Bit mask of present tables
    pub valid: u64,
    /// Bit mask of sorted tables
    pub sorted: u64,
    /// Row counts and index widths
    pub info: TableInfoRef,
    data: &'a [u8],
    tables_offset: usize,
}

impl<'a> TablesHeader<'a> {
    /// Parse the header of a tables stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header or row counts run past `data`.
    pub fn from(data: &'a [u8]) -> Result<TablesHeader<'a>> {
        Self::with_external(data, &[])
    }

    /// Parse the header of a tables stream whose rows reference tables stored elsewhere.
    ///
    /// Row counts in `external` apply only to tables that are absent from this stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the header or row counts run past `data`.
    pub fn with_external(data: &'a [u8], external: &[(TableId, u32)]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let valid = read_le::<u64>(&data[8..])?;
        let mut info = TableInfo::new(data, valid)?;
        for &(table, rows) in external {
            if valid & table.bit() == 0 {
                info.set_rows(table, rows);
            }
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info: Arc::new(info),
            data,
            tables_offset: 24 + valid.count_ones() as usize * 4,
        })
    }

    /// Number of tables present in this stream.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// `true` if `table` is present in this stream.
    #[must_use]
    pub fn has_table(&self, table: TableId) -> bool {
        self.valid & table.bit() != 0
    }

    /// Row count of `table`, 0 when absent.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        if self.has_table(table) {
            self.info.rows(table)
        } else {
            0
        }
    }

    /// Open one of the debug tables of this stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] if a table stored before `T::TABLE` has an unknown
    /// row layout, and [`crate::Error::OutOfBounds`] if the table runs past the stream.
    pub fn table<T: RowReadable>(&self) -> Result<MetadataTable<'a, T>> {
        let mut offset = self.tables_offset;
        for table in TableId::iter() {
            if !self.has_table(table) {
                continue;
            }

            let Some(row_size) = debug_row_size(table, &self.info) else {
                return Err(crate::Error::NotSupported);
            };
            let size = row_size as usize * self.info.rows(table) as usize;

            if table == T::TABLE {
                let Some(bytes) = self.data.get(offset..offset + size) else {
                    return Err(OutOfBounds);
                };
                return Ok(MetadataTable::new(bytes, self.info.rows(table), self.info.clone()));
            }

            offset += size;
        }

        Ok(MetadataTable::new(&[], 0, self.info.clone()))
    }
}
