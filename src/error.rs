use thiserror::Error;

use crate::{convert::UnsupportedFeature, metadata::token::Token};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! sequence_point_error {
    ($method:expr, $fmt:expr, $($arg:tt)*) => {
        crate::Error::SequencePoints {
            method: $method,
            message: format!($fmt, $($arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Reading the input binary, validating the symbol data and writing the Portable PDB all report
/// through this type. Format errors abort the whole conversion: nothing is written to the output
/// until every method has been translated successfully.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Malformed`] - Corrupted or invalid file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond file boundaries
/// - [`Error::NotSupported`] - Unsupported file format or feature
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::MissingDebugDirectory`] - The binary carries no CodeView debug entry
///
/// ## Symbol Data Errors
/// - [`Error::SequencePoints`] - Sequence points of a method violate the encoding rules
/// - [`Error::ScopeNesting`] - A lexical scope escapes its parent or overlaps a sibling
/// - [`Error::ScopeRange`] - A lexical scope ends before it starts
/// - [`Error::RootScope`] - The root scope of a method carries locals or imports
/// - [`Error::Unsupported`] - A rejected extension point was encountered
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem or output stream I/O errors
/// - [`Error::GoblinErr`] - PE parsing errors from goblin crate
///
/// # Examples
///
/// ```rust,no_run
/// use pdbport::{binary::PeBinary, convert::convert_to_vec, symbols::SymbolData, Error};
/// use std::path::Path;
///
/// let binary = PeBinary::from_file(Path::new("assembly.dll"))?;
/// let symbols = SymbolData::default();
///
/// match convert_to_vec(&binary, &symbols, Default::default()) {
///     Ok((bytes, _report)) => println!("Wrote {} bytes", bytes.len()),
///     Err(Error::MissingDebugDirectory) => eprintln!("Binary has no CodeView entry"),
///     Err(Error::ScopeNesting { method, .. }) => eprintln!("Bad scopes in {}", method),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok::<(), pdbport::Error>(())
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the file.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// This file type is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The binary has no CodeView entry in its debug directory.
    ///
    /// A Portable PDB is matched to its binary through the GUID and stamp of that entry, so
    /// conversion cannot proceed without it.
    #[error("The binary does not contain a CodeView debug directory entry")]
    MissingDebugDirectory,

    /// The sequence points of a method cannot be encoded.
    ///
    /// Raised for decreasing IL offsets, zero-width non-hidden points, ranges that end before
    /// they start and sequence points naming documents the symbol source never listed.
    #[error("Invalid sequence points in method {method}: {message}")]
    SequencePoints {
        /// The method whose sequence points were rejected
        method: Token,
        /// What exactly was wrong
        message: String,
    },

    /// A lexical scope escapes its parent or overlaps the previous sibling.
    ///
    /// `bound_start..bound_end` is the range that was violated: the parent scope when the child
    /// extends past it, or the previous sibling when the two overlap.
    #[error(
        "Scope [{start}, {end}) of method {method} conflicts with scope [{bound_start}, {bound_end})"
    )]
    ScopeNesting {
        /// The method owning the scope tree
        method: Token,
        /// Start offset of the offending scope
        start: u32,
        /// End offset of the offending scope
        end: u32,
        /// Start offset of the violated scope
        bound_start: u32,
        /// End offset of the violated scope
        bound_end: u32,
    },

    /// A lexical scope ends before it starts.
    #[error("Scope [{start}, {end}) of method {method} has a negative length")]
    ScopeRange {
        /// The method owning the scope tree
        method: Token,
        /// Start offset of the offending scope
        start: u32,
        /// End offset of the offending scope
        end: u32,
    },

    /// The root scope of a method carries variables, constants or imported namespaces.
    ///
    /// The root only spans the method body; anything declared in it must live in a child scope.
    #[error("The root scope of method {0} must not declare locals or imports")]
    RootScope(Token),

    /// An extension point that has no Portable PDB encoding was encountered and the conversion
    /// was configured to reject it.
    #[error("Unsupported feature {feature:?} (method: {method:?})")]
    Unsupported {
        /// The feature that was encountered
        feature: UnsupportedFeature,
        /// The method it was attached to, if any
        method: Option<Token>,
    },

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Other errors that don't fit specific categories.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),
}
