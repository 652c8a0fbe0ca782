use std::sync::Arc;

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::types::TableId,
    Error::OutOfBounds,
    Result,
};

/// Row count of a single table, with the derived index width.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// Number of rows
    pub rows: u32,
    /// Bits needed to address every row
    pub bits: u8,
    /// `true` if indices into this table take 4 bytes
    pub is_large: bool,
}

impl TableRowInfo {
    /// Derive the index width of a table with `rows` rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts of all 64 possible tables plus the heap index widths.
///
/// This determines the byte width of every index column: a table index takes 4 bytes once
/// the target table exceeds `0xFFFF` rows, a heap index takes 4 bytes when the matching
/// heap-size flag is set.
#[derive(Clone, Debug, PartialEq)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

/// Shared [`TableInfo`]
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Read the row counts and heap-size flags of a tables (`#~`) stream header.
    ///
    /// Row counts follow the 24 byte header, one `u32` per bit set in `valid_bitvec`, in
    /// ascending table number. Bits of tables unknown to [`TableId`] still consume their
    /// count so the following counts line up.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row counts run past `data`.
    pub fn new(data: &[u8], valid_bitvec: u64) -> Result<Self> {
        if data.len() < 24 {
            return Err(OutOfBounds);
        }

        let mut rows = vec![TableRowInfo::default(); 64];
        let mut next_row_offset = 24;

        for (table, row) in rows.iter_mut().enumerate() {
            if (valid_bitvec & (1 << table)) == 0 {
                continue;
            }

            *row = TableRowInfo::new(read_le_at::<u32>(data, &mut next_row_offset)?);
        }

        let heap_size_flags = read_le::<u8>(&data[6..])?;
        Ok(TableInfo {
            rows,
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        })
    }

    /// Build a [`TableInfo`] from known row counts and heap widths.
    #[must_use]
    pub fn from_rows(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_guid: bool,
        large_blob: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); 64],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for &(table, rows) in valid_tables {
            table_info.set_rows(table, rows);
        }

        table_info
    }

    /// Override the row count of `table`.
    pub fn set_rows(&mut self, table: TableId, rows: u32) {
        self.rows[table as usize] = TableRowInfo::new(rows);
    }

    /// Row count of `table`.
    #[must_use]
    pub fn rows(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// Row count by raw table number, including tables unknown to [`TableId`].
    #[must_use]
    pub fn rows_by_index(&self, index: u8) -> u32 {
        self.rows.get(index as usize).map_or(0, |row| row.rows)
    }

    /// `true` if indices into `table` take 4 bytes.
    #[must_use]
    pub fn is_large(&self, table: TableId) -> bool {
        self.rows[table as usize].is_large
    }

    /// `true` if `#Strings` indices take 4 bytes.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// `true` if `#GUID` indices take 4 bytes.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// `true` if `#Blob` indices take 4 bytes.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Byte width of a `#Strings` index.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#GUID` index.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Byte width of a `#Blob` index.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Byte width of an index into `table`.
    #[must_use]
    pub fn table_index_bytes(&self, table: TableId) -> u8 {
        if self.rows[table as usize].is_large {
            4
        } else {
            2
        }
    }

    /// The heap-size flags byte of a tables stream header.
    #[must_use]
    pub fn heap_size_flags(&self) -> u8 {
        u8::from(self.is_large_index_str)
            | (u8::from(self.is_large_index_guid) << 1)
            | (u8::from(self.is_large_index_blob) << 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_info() {
        assert_eq!(TableRowInfo::new(0).bits, 1);
        assert_eq!(TableRowInfo::new(0xFFFF).bits, 16);
        assert!(!TableRowInfo::new(0xFFFF).is_large);
        assert!(TableRowInfo::new(0x1_0000).is_large);
    }

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // major, minor
            0x05,                   // heap sizes: large strings and blobs
            0x01,                   // reserved
            0x41, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, // valid: Module, MethodDef, bit 46
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // Module
            0x00, 0x00, 0x01, 0x00, // MethodDef
            0x07, 0x00, 0x00, 0x00, // unknown table 0x2E
        ];

        let info = TableInfo::new(&data, read_le::<u64>(&data[8..]).unwrap()).unwrap();
        assert_eq!(info.rows(TableId::Module), 1);
        assert_eq!(info.rows(TableId::MethodDef), 0x1_0000);
        assert_eq!(info.rows_by_index(0x2E), 7);
        assert!(info.is_large(TableId::MethodDef));
        assert_eq!(info.table_index_bytes(TableId::MethodDef), 4);
        assert_eq!(info.table_index_bytes(TableId::Module), 2);
        assert_eq!((info.str_bytes(), info.guid_bytes(), info.blob_bytes()), (4, 2, 4));
        assert_eq!(info.heap_size_flags(), 0x05);
    }

    #[test]
    fn truncated() {
        let data = [0u8; 24];
        assert!(matches!(TableInfo::new(&data, 1), Err(OutOfBounds)));
        assert!(TableInfo::new(&data[..10], 0).is_err());
    }

    #[test]
    fn from_rows() {
        let info = TableInfo::from_rows(&[(TableId::Document, 3)], false, true, false);
        assert_eq!(info.rows(TableId::Document), 3);
        assert_eq!(info.rows(TableId::LocalScope), 0);
        assert_eq!(info.guid_bytes(), 4);
        assert_eq!(info.heap_size_flags(), 0x02);
    }
}
