//! Symbol data consumed by the converter.
//!
//! A [`SymbolSource`] answers two questions: which source documents the binary was compiled
//! from, and what debug information a given method has. Readers of legacy PDB files implement
//! the trait; [`SymbolData`] is an owned, in-memory implementation that such readers (or tests)
//! can fill directly.
//!
//! # Example
//!
//! ```rust
//! use pdbport::metadata::{tables::TableId, token::Token};
//! use pdbport::symbols::{Document, LocalScope, LocalVariable, MethodSymbols, SequencePoint, SymbolData};
//!
//! let mut symbols = SymbolData::new();
//! symbols.add_document(Document::new("/src/Program.cs"));
//! symbols.add_method(
//!     Token::from_parts(TableId::MethodDef, 1),
//!     MethodSymbols {
//!         sequence_points: vec![SequencePoint::new("/src/Program.cs", 0, 5, 9, 5, 30)],
//!         root_scope: Some(
//!             LocalScope::new(0, 12).with_child(
//!                 LocalScope::new(0, 12).with_variable(LocalVariable::new("count", 0)),
//!             ),
//!         ),
//!         ..MethodSymbols::default()
//!     },
//! );
//! ```

mod constant;
mod types;

pub use constant::ConstantValue;
pub use types::*;

use std::collections::BTreeMap;

use crate::{metadata::token::Token, Result};

/// Source of the legacy debug information of one binary.
pub trait SymbolSource {
    /// All source documents, in the order they should be numbered.
    ///
    /// # Errors
    /// Returns an error if the underlying symbol store cannot be read.
    fn documents(&self) -> Result<Vec<Document>>;

    /// The debug information of `method`, `Ok(None)` if the method has none.
    ///
    /// # Errors
    /// Returns an error if the underlying symbol store cannot be read. The conversion aborts on
    /// any error; only `Ok(None)` means "no debug information".
    fn method(&self, method: Token) -> Result<Option<MethodSymbols>>;

    /// The user entry point (`Main`, not a compiler generated wrapper), if the symbols name one.
    fn user_entry_point(&self) -> Option<Token> {
        None
    }

    /// How scope end offsets are expressed.
    fn range_convention(&self) -> RangeConvention {
        RangeConvention::Exclusive
    }
}

/// Owned symbol data, keyed by method token.
#[derive(Debug, Clone, Default)]
pub struct SymbolData {
    documents: Vec<Document>,
    methods: BTreeMap<Token, MethodSymbols>,
    entry_point: Option<Token>,
    range_convention: RangeConvention,
}

impl SymbolData {
    /// Create empty symbol data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document. Documents keep the order they were added in.
    pub fn add_document(&mut self, document: Document) -> &mut Self {
        self.documents.push(document);
        self
    }

    /// Attach symbols to `method`, replacing what was recorded before.
    pub fn add_method(&mut self, method: Token, symbols: MethodSymbols) -> &mut Self {
        self.methods.insert(method, symbols);
        self
    }

    /// Set the user entry point.
    pub fn set_entry_point(&mut self, method: Token) -> &mut Self {
        self.entry_point = Some(method);
        self
    }

    /// Set the scope range convention.
    pub fn set_range_convention(&mut self, convention: RangeConvention) -> &mut Self {
        self.range_convention = convention;
        self
    }

    /// Number of methods with symbols.
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }
}

impl SymbolSource for SymbolData {
    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.clone())
    }

    fn method(&self, method: Token) -> Result<Option<MethodSymbols>> {
        Ok(self.methods.get(&method).cloned())
    }

    fn user_entry_point(&self) -> Option<Token> {
        self.entry_point
    }

    fn range_convention(&self) -> RangeConvention {
        self.range_convention
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::TableId;

    #[test]
    fn symbol_data() {
        let method = Token::from_parts(TableId::MethodDef, 2);

        let mut symbols = SymbolData::new();
        symbols
            .add_document(Document::new("/src/a.cs").with_language(LANGUAGE_CSHARP))
            .add_document(Document::new("/src/b.cs"))
            .add_method(
                method,
                MethodSymbols::with_sequence_points(vec![SequencePoint::hidden("/src/a.cs", 0)]),
            )
            .set_entry_point(method);

        let documents = symbols.documents().unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].language, LANGUAGE_CSHARP);
        assert_eq!(documents[1].name, "/src/b.cs");

        assert_eq!(symbols.method_count(), 1);
        assert!(symbols.method(method).unwrap().is_some());
        assert!(symbols
            .method(Token::from_parts(TableId::MethodDef, 1))
            .unwrap()
            .is_none());

        assert_eq!(symbols.user_entry_point(), Some(method));
        assert_eq!(symbols.range_convention(), RangeConvention::Exclusive);
    }

    #[test]
    fn method_symbols() {
        assert!(MethodSymbols::default().is_empty());

        let kickoff = Token::from_parts(TableId::MethodDef, 1);
        let mut info = AsyncMethodInfo::new(kickoff);
        assert!(!info.has_stepping_information());

        info.catch_handler_offset = Some(0x40);
        assert!(info.has_stepping_information());

        let symbols = MethodSymbols {
            async_info: Some(info),
            ..MethodSymbols::default()
        };
        assert!(!symbols.is_empty());
    }
}
