//! Shared helpers for encoding Portable PDB data.

pub mod compressed;
