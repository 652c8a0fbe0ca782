//! `MethodDebugInformation` table (0x31) of the Portable PDB format.
//!
//! Exactly one row per `MethodDef` row of the binary, in the same order. A row with a nil
//! document and a nil blob marks a method without sequence points.

mod raw;

pub use raw::*;
