//! `Document` table (0x30) of the Portable PDB format.
//!
//! One row per source file. The name is a document-name blob (see
//! [`crate::metadata::pdb::PortablePdb::document_name`]), the hash is the raw checksum bytes
//! and the hash algorithm and language are GUIDs.

mod raw;

pub use raw::*;
