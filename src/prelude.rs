//! Convenient re-exports of the most commonly used types and traits.
//!
//! ```rust,no_run
//! use pdbport::prelude::*;
//! ```

pub use crate::{Error, File, Parser, Result, Token};

pub use crate::binary::{BinarySource, CodeViewEntry, PeBinary};

pub use crate::convert::{
    convert, convert_to_vec, ContentId, ConversionOptions, ConversionReport, Converter,
    Placeholder, UnsupportedFeature, UnsupportedPolicy,
};

pub use crate::symbols::{
    AsyncMethodInfo, AsyncStep, ConstantValue, Document, EditAndContinueData, LocalConstant,
    LocalScope, LocalVariable, LocalVariableAttributes, MethodSymbols, RangeConvention,
    SequencePoint, SymbolData, SymbolSource, HASH_ALGORITHM_SHA1, HASH_ALGORITHM_SHA256,
    LANGUAGE_CSHARP, LANGUAGE_FSHARP, LANGUAGE_VISUAL_BASIC,
};

pub use crate::metadata::{builder::PdbBuilder, pdb::PortablePdb, tables::TableId};
