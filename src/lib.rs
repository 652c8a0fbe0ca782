// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! # pdbport
//!
//! [![Crates.io](https://img.shields.io/crates/v/pdbport.svg)](https://crates.io/crates/pdbport)
//! [![Documentation](https://docs.rs/pdbport/badge.svg)](https://docs.rs/pdbport)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/pdbport/blob/main/LICENSE-APACHE)
//!
//! Converts the debug information of a .NET assembly from the legacy Windows PDB model into a
//! Portable PDB, the ECMA-335 metadata based format read by cross-platform debuggers.
//!
//! ## Features
//!
//! - **📦 Memory-mapped input** - The binary is mapped, only its headers and metadata root are read
//! - **🧭 Sequence points** - Single and multi-document methods, hidden points, compressed deltas
//! - **🌳 Lexical scopes** - Nested scopes with their local variables and constants
//! - **🔗 Binary matching** - The PDB id is taken from the CodeView entry of the binary
//! - **🛡️ All or nothing** - Invalid symbol data aborts the conversion before anything is written
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdbport::prelude::*;
//! use std::path::Path;
//!
//! let binary = PeBinary::from_file(Path::new("App.dll"))?;
//!
//! let mut symbols = SymbolData::new();
//! symbols.add_document(Document::new("/src/App/Program.cs").with_language(LANGUAGE_CSHARP));
//! symbols.add_method(
//!     Token::new(0x0600_0001),
//!     MethodSymbols::with_sequence_points(vec![SequencePoint::new(
//!         "/src/App/Program.cs",
//!         0,
//!         10,
//!         9,
//!         10,
//!         30,
//!     )]),
//! );
//!
//! let (pdb, report) = convert_to_vec(&binary, &symbols, ConversionOptions::new())?;
//! std::fs::write("App.pdb", pdb)?;
//! println!("{} of {} methods had symbols", report.methods_with_symbols, report.methods);
//! # Ok::<(), pdbport::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`binary`] - Reads the CodeView entry and table row counts of the .NET binary
//! - [`symbols`] - The legacy symbol model and the [`symbols::SymbolSource`] trait
//! - [`convert`] - Discovery, translation and serialization of a conversion
//! - [`metadata`] - Portable PDB tables, heaps, the writer and a reader used for verification
//! - [`file`] - PE image loading on top of `goblin`
//! - [`Error`] and [`Result`] - Error handling
//!
//! Unsupported symbol data (async stepping information, Edit-and-Continue maps, imported
//! namespaces, constants without a primitive encoding) is either rejected or replaced by a
//! placeholder recorded in the [`convert::ConversionReport`], see
//! [`convert::UnsupportedPolicy`].

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use pdbport::prelude::*;
///
/// let binary = PeBinary::from_file("App.dll".as_ref())?;
/// let (_pdb, report) = convert_to_vec(&binary, &SymbolData::new(), ConversionOptions::strict())?;
/// assert!(report.is_lossless());
/// # Ok::<(), pdbport::Error>(())
/// ```
pub mod prelude;

/// The .NET binary a Portable PDB is produced for.
pub mod binary;

/// Conversion of legacy symbol data into a Portable PDB.
pub mod convert;

/// Loading of PE images.
pub mod file;

/// Portable PDB metadata: tokens, tables, heaps, the writer and a reader.
///
/// # Key Components
///
/// - [`metadata::builder::PdbBuilder`] - Accumulates heaps and debug table rows and lays out
///   the metadata blob
/// - [`metadata::pdb::PortablePdb`] - Parses a Portable PDB back
/// - [`metadata::cor20header`] - CLR 2.0 header of the binary
/// - [`metadata::root`] - Metadata root and stream directory
/// - [`metadata::token`] - Metadata tokens
pub mod metadata;

/// Legacy symbol data.
pub mod symbols;

/// Encoding helpers shared by the reader and the writer.
pub mod utils;

/// `pdbport` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `pdbport` Error type
///
/// Every fallible operation of this crate reports through it.
pub use error::Error;

/// A loaded PE image, see [`file::File`].
pub use file::File;

/// Low level byte parser, see [`file::parser::Parser`].
pub use file::parser::Parser;

/// Metadata token, see [`metadata::token::Token`].
pub use metadata::token::Token;
