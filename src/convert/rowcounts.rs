//! Snapshot of the type-system table sizes of the binary.

use strum::{EnumCount, IntoEnumIterator};

use crate::{binary::BinarySource, metadata::tables::TableId, Result};

/// One row count per [`TableId`], in table number order.
///
/// Type-system tables carry the binary's counts; debug tables are always 0, since their rows
/// are produced by the conversion itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCounts {
    counts: [u32; TableId::COUNT],
}

impl RowCounts {
    /// Query `binary` for the row count of every type-system table.
    ///
    /// # Errors
    /// Propagates the errors of [`BinarySource::row_count`].
    pub fn harvest<B: BinarySource + ?Sized>(binary: &B) -> Result<RowCounts> {
        let mut counts = [0_u32; TableId::COUNT];
        for (slot, table) in counts.iter_mut().zip(TableId::iter()) {
            if !table.is_debug_table() {
                *slot = binary.row_count(table)?;
            }
        }

        Ok(RowCounts { counts })
    }

    /// The row count of `table`.
    #[must_use]
    pub fn get(&self, table: TableId) -> u32 {
        self.counts[table.ordinal()]
    }

    /// All counts, indexed by [`TableId::ordinal`].
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }

    /// `(table, rows)` pairs for every table kind.
    #[must_use]
    pub fn entries(&self) -> Vec<(TableId, u32)> {
        TableId::iter().zip(self.counts.iter().copied()).collect()
    }

    /// Number of methods of the binary.
    #[must_use]
    pub fn methods(&self) -> u32 {
        self.get(TableId::MethodDef)
    }
}
