//! Metadata structures shared by .NET binaries and Portable PDBs.
//!
//! Both formats use the ECMA-335 physical metadata layout: a `BSJB` root, a directory of
//! streams, heaps addressed by offset or index and a tables stream. This module reads the
//! parts of a binary's metadata the converter needs (the CLR header and the row counts of the
//! type-system tables) and writes and reads back the Portable PDB debug tables.
//!
//! # Key Components
//!
//! - [`cor20header`] - The CLR header locating the metadata of a binary
//! - [`root`] - Metadata root and stream directory, read and write
//! - [`streams`] - Heap readers and the tables stream header
//! - [`tables`] - Table identifiers, index sizing and the seven debug table rows
//! - [`builder`] - Produces a Portable PDB from heap entries and rows
//! - [`pdb`] - Read-only view over a produced Portable PDB
//! - [`sequencepoints`] - Decoder for sequence-point blobs
//! - [`token`] - Metadata tokens

/// Portable PDB builder
pub mod builder;
/// Implementation of the Header of CIL
pub mod cor20header;
/// Read-only Portable PDB view
pub mod pdb;
/// Implementation of the root metadata structure
pub mod root;
/// Sequence-point blob decoding
pub mod sequencepoints;
/// Implementation of all metadata streams (tables, heaps, etc.)
pub mod streams;
/// Implementation of the .NET metadata tables
pub mod tables;
/// Commonly used metadata token type
pub mod token;
