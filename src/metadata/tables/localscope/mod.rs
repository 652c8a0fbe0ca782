//! `LocalScope` table (0x32) of the Portable PDB format.
//!
//! Each row is a lexical scope of one method: its IL range, the import scope in effect and
//! the first rows of the variables and constants it declares. A scope owns the variable rows
//! from its `variable_list` up to the next scope's `variable_list` (constants likewise).
//!
//! The table is sorted by method, then by start offset ascending, then by length descending,
//! which a depth-first pre-order walk of each method's scope tree produces.

mod raw;

pub use raw::*;
