//! The .NET binary a Portable PDB is produced for.
//!
//! The converter needs three things from the binary: the CodeView entry of its debug directory
//! (whose GUID and stamp become the PDB id), the row count of every type-system table (which
//! the PDB records and uses to size `MethodDef` indices) and, as a last resort, its managed
//! entry point. [`BinarySource`] abstracts over where they come from; [`PeBinary`] reads them
//! from a PE image.

mod codeview;
mod pe;

pub use codeview::{CodeViewEntry, CODEVIEW_SIGNATURE, IMAGE_DEBUG_TYPE_CODEVIEW};
pub use pe::PeBinary;

use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// Provides the facts the converter needs about the binary.
pub trait BinarySource {
    /// The first `RSDS` CodeView entry of the debug directory, `None` if there is none.
    ///
    /// # Errors
    /// Returns an error if the debug directory is present but malformed.
    fn codeview(&self) -> Result<Option<CodeViewEntry>>;

    /// Row count of a type-system table, 0 for tables the binary does not have.
    ///
    /// # Errors
    /// Returns an error if the metadata of the binary cannot be read.
    fn row_count(&self, table: TableId) -> Result<u32>;

    /// The managed entry point declared by the CLR header.
    fn entry_point(&self) -> Option<Token> {
        None
    }
}
