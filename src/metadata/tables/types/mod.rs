//! # Metadata Table Types Module
//!
//! Core infrastructure shared by all Portable PDB debug tables.
//!
//! ## Key Components
//!
//! - [`TableId`]: Enumeration of all metadata table types
//! - [`TableInfo`] and [`TableInfoRef`]: Row counts and index widths
//! - [`TableRow`]: Size of a row and the table it belongs to
//! - [`RowReadable`]: Parses a row out of a tables stream
//! - [`RowWritable`]: Serializes a row into a tables stream
//! - [`MetadataTable`]: Typed, lazily parsed view over the rows of one table
//!
//! ## Usage Example
//!
//! ```rust
//! use pdbport::metadata::tables::{MetadataTable, StateMachineMethodRaw, TableId, TableInfo};
//! use std::sync::Arc;
//!
//! let sizes = Arc::new(TableInfo::from_rows(&[(TableId::MethodDef, 10)], false, false, false));
//! let data = [0x02, 0x00, 0x01, 0x00];
//! let table: MetadataTable<StateMachineMethodRaw> = MetadataTable::new(&data, 1, sizes);
//!
//! let row = table.get(1).unwrap();
//! assert_eq!((row.move_next_method, row.kickoff_method), (2, 1));
//! ```

mod tableid;
mod tableinfo;

use std::marker::PhantomData;

use crate::Result;

pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

/// A row of a specific metadata table.
pub trait TableRow: Sized {
    /// The table this row belongs to.
    const TABLE: TableId;

    /// Size of one row in bytes, given the index widths in `sizes`.
    fn row_size(sizes: &TableInfoRef) -> u32;
}

/// A row that can be parsed out of a tables stream.
pub trait RowReadable: TableRow {
    /// Read the row with id `rid` at `offset` and advance `offset` past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row runs past `data`.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// A row that can be serialized into a tables stream.
pub trait RowWritable: TableRow {
    /// Write this row at `offset` and advance `offset` past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is too small for the row and
    /// [`crate::Error::Malformed`] if an index does not fit its column.
    fn row_write(
        &self,
        data: &mut [u8],
        offset: &mut usize,
        rid: u32,
        sizes: &TableInfoRef,
    ) -> Result<()>;
}

/// A typed view over the rows of one table.
///
/// Rows are parsed on access; the table itself only borrows the stream bytes.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: TableInfoRef,
    _phantom: PhantomData<T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Create a view over `row_count` rows starting at the beginning of `data`.
    #[must_use]
    pub fn new(data: &'a [u8], row_count: u32, sizes: TableInfoRef) -> Self {
        MetadataTable {
            data,
            row_count,
            row_size: T::row_size(&sizes),
            sizes,
            _phantom: PhantomData,
        }
    }

    /// Total size of the table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Parse the row with 1-based id `index`, `None` if it does not exist or is truncated.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<T> {
        if index == 0 || self.row_count < index {
            return None;
        }

        T::row_read(
            self.data,
            &mut ((index as usize - 1) * self.row_size as usize),
            index,
            &self.sizes,
        )
        .ok()
    }

    /// Iterate over all rows in order.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            current_row: 0,
        }
    }
}

impl<'t, 'a, T: RowReadable> IntoIterator for &'t MetadataTable<'a, T> {
    type Item = T;
    type IntoIter = TableIterator<'t, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Sequential iterator over the rows of a [`MetadataTable`].
///
/// Stops at the first row that cannot be parsed.
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a, T>,
    current_row: u32,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row >= self.table.row_count {
            return None;
        }

        self.current_row += 1;
        self.table.get(self.current_row)
    }
}
