//! `ImportScope` table (0x35) of the Portable PDB format.
//!
//! Import scopes form a tree through their parent column. The converter only emits a single
//! root scope with an empty imports blob, which every local scope references.

mod raw;

pub use raw::*;
