//! Metadata tables.
//!
//! Identifiers and index sizing for every table number, plus row definitions for the seven
//! Portable PDB debug tables the converter writes. The type-system tables of the external
//! binary are only ever counted, never parsed row by row.

mod document;
mod importscope;
mod localconstant;
mod localscope;
mod localvariable;
mod methoddebuginformation;
mod statemachinemethod;
mod types;

pub use document::*;
pub use importscope::*;
pub use localconstant::*;
pub use localscope::*;
pub use localvariable::*;
pub use methoddebuginformation::*;
pub use statemachinemethod::*;
pub use types::*;

/// Row size of `table` if it is one of the debug tables this crate can lay out.
#[must_use]
pub fn debug_row_size(table: TableId, sizes: &TableInfoRef) -> Option<u32> {
    let size = match table {
        TableId::Document => DocumentRaw::row_size(sizes),
        TableId::MethodDebugInformation => MethodDebugInformationRaw::row_size(sizes),
        TableId::LocalScope => LocalScopeRaw::row_size(sizes),
        TableId::LocalVariable => LocalVariableRaw::row_size(sizes),
        TableId::LocalConstant => LocalConstantRaw::row_size(sizes),
        TableId::ImportScope => ImportScopeRaw::row_size(sizes),
        TableId::StateMachineMethod => StateMachineMethodRaw::row_size(sizes),
        _ => return None,
    };

    Some(size)
}
