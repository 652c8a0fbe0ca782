//! Plain data the symbol source hands to the converter.
//!
//! All offsets are IL offsets within the method body. Lines are 1-based, columns are 1-based
//! and `end_column` points one past the last character of a span.

use bitflags::bitflags;
use uguid::{guid, Guid};

use crate::{metadata::token::Token, symbols::ConstantValue};

/// SHA-1 checksum algorithm.
pub const HASH_ALGORITHM_SHA1: Guid = guid!("ff1816ec-aa5e-4d10-87f7-6f4963833460");
/// SHA-256 checksum algorithm.
pub const HASH_ALGORITHM_SHA256: Guid = guid!("8829d00f-11b8-4213-878b-770e8597ac16");

/// C# source language.
pub const LANGUAGE_CSHARP: Guid = guid!("3f5162f8-07c6-11d3-9053-00c04fa302a1");
/// Visual Basic source language.
pub const LANGUAGE_VISUAL_BASIC: Guid = guid!("3a12d0b8-c26c-11d0-b442-00a0244a1dd2");
/// F# source language.
pub const LANGUAGE_FSHARP: Guid = guid!("ab4f38c9-b6e6-43ba-be3b-58080b2ccce3");

/// A source document referenced by sequence points.
///
/// Documents are identified by their full name; two documents with the same name are the same
/// document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Full path of the document as recorded at compile time
    pub name: String,
    /// Checksum algorithm, [`Guid::ZERO`] if the document has no checksum
    pub hash_algorithm: Guid,
    /// The checksum bytes
    pub checksum: Vec<u8>,
    /// Source language, [`Guid::ZERO`] if unknown
    pub language: Guid,
}

impl Document {
    /// A document without checksum or language.
    pub fn new(name: impl Into<String>) -> Self {
        Document {
            name: name.into(),
            hash_algorithm: Guid::ZERO,
            checksum: Vec::new(),
            language: Guid::ZERO,
        }
    }

    /// Attach a checksum computed with `algorithm`.
    #[must_use]
    pub fn with_checksum(mut self, algorithm: Guid, checksum: impl Into<Vec<u8>>) -> Self {
        self.hash_algorithm = algorithm;
        self.checksum = checksum.into();
        self
    }

    /// Set the source language.
    #[must_use]
    pub fn with_language(mut self, language: Guid) -> Self {
        self.language = language;
        self
    }
}

/// Maps an IL offset to a span in a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePoint {
    /// Name of the document, must match a [`Document::name`]
    pub document: String,
    /// IL offset of the first instruction covered
    pub il_offset: u32,
    /// First line of the span
    pub start_line: u32,
    /// First column of the span
    pub start_column: u16,
    /// Last line of the span
    pub end_line: u32,
    /// Column one past the end of the span
    pub end_column: u16,
    /// Hidden points carry no span and make the debugger step over the covered IL
    pub hidden: bool,
}

impl SequencePoint {
    /// A visible sequence point.
    pub fn new(
        document: impl Into<String>,
        il_offset: u32,
        start_line: u32,
        start_column: u16,
        end_line: u32,
        end_column: u16,
    ) -> Self {
        SequencePoint {
            document: document.into(),
            il_offset,
            start_line,
            start_column,
            end_line,
            end_column,
            hidden: false,
        }
    }

    /// A hidden sequence point.
    pub fn hidden(document: impl Into<String>, il_offset: u32) -> Self {
        SequencePoint {
            document: document.into(),
            il_offset,
            start_line: 0,
            start_column: 0,
            end_line: 0,
            end_column: 0,
            hidden: true,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Attributes of a local variable
    pub struct LocalVariableAttributes: u16 {
        /// The variable is compiler generated and hidden from the debugger
        const DEBUGGER_HIDDEN = 0x0001;
    }
}

/// A named local variable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariable {
    /// Name shown by the debugger
    pub name: String,
    /// Slot index in the method's local signature
    pub index: u16,
    /// Variable attributes
    pub attributes: LocalVariableAttributes,
}

impl LocalVariable {
    /// A visible variable in slot `index`.
    pub fn new(name: impl Into<String>, index: u16) -> Self {
        LocalVariable {
            name: name.into(),
            index,
            attributes: LocalVariableAttributes::empty(),
        }
    }
}

/// A named compile-time constant.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalConstant {
    /// Name shown by the debugger
    pub name: String,
    /// The value
    pub value: ConstantValue,
}

impl LocalConstant {
    /// A constant called `name`.
    pub fn new(name: impl Into<String>, value: ConstantValue) -> Self {
        LocalConstant {
            name: name.into(),
            value,
        }
    }
}

/// A lexical scope of a method body, covering the IL range `[start, end)`.
///
/// Children must be ordered by start offset, lie within their parent and must not overlap
/// each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalScope {
    /// First IL offset of the scope
    pub start: u32,
    /// IL offset one past the end of the scope
    pub end: u32,
    /// Variables declared in this scope
    pub variables: Vec<LocalVariable>,
    /// Constants declared in this scope
    pub constants: Vec<LocalConstant>,
    /// Namespaces imported by this scope (`using` directives)
    pub namespaces: Vec<String>,
    /// Nested scopes
    pub children: Vec<LocalScope>,
}

impl LocalScope {
    /// An empty scope covering `[start, end)`.
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        LocalScope {
            start,
            end,
            ..LocalScope::default()
        }
    }

    /// Declare a variable.
    #[must_use]
    pub fn with_variable(mut self, variable: LocalVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Declare a constant.
    #[must_use]
    pub fn with_constant(mut self, constant: LocalConstant) -> Self {
        self.constants.push(constant);
        self
    }

    /// Import a namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    /// Nest a scope.
    #[must_use]
    pub fn with_child(mut self, child: LocalScope) -> Self {
        self.children.push(child);
        self
    }
}

/// How a symbol source reports the end offset of scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeConvention {
    /// `end` is one past the last IL byte (C#)
    #[default]
    Exclusive,
    /// `end` is the offset of the last instruction (Visual Basic)
    Inclusive,
}

/// One `await` of an async method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncStep {
    /// IL offset of the suspension
    pub yield_offset: u32,
    /// IL offset execution resumes at
    pub resume_offset: u32,
    /// Method containing the resume offset
    pub resume_method: Token,
}

/// State machine information of an async `MoveNext` method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncMethodInfo {
    /// The user method that creates the state machine
    pub kickoff_method: Token,
    /// IL offset of the compiler generated catch handler, if any
    pub catch_handler_offset: Option<u32>,
    /// Suspension points, for stepping over `await`
    pub steps: Vec<AsyncStep>,
}

impl AsyncMethodInfo {
    /// State machine info without stepping information.
    #[must_use]
    pub fn new(kickoff_method: Token) -> Self {
        AsyncMethodInfo {
            kickoff_method,
            catch_handler_offset: None,
            steps: Vec::new(),
        }
    }

    /// `true` if the info carries a catch handler or suspension points.
    #[must_use]
    pub fn has_stepping_information(&self) -> bool {
        self.catch_handler_offset.is_some() || !self.steps.is_empty()
    }
}

/// Edit-and-Continue data recorded by the compiler, kept as opaque blobs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditAndContinueData {
    /// Local slot map
    pub local_slots: Vec<u8>,
    /// Lambda and closure map
    pub lambdas: Vec<u8>,
}

/// Everything the symbol source knows about one method.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodSymbols {
    /// `StandAloneSig` row of the local signature, `None` if the method has no locals
    pub local_signature: Option<u32>,
    /// Sequence points in ascending IL offset order
    pub sequence_points: Vec<SequencePoint>,
    /// The scope spanning the whole method body
    pub root_scope: Option<LocalScope>,
    /// Present if the method is the `MoveNext` of an async state machine
    pub async_info: Option<AsyncMethodInfo>,
    /// Present if the compiler recorded Edit-and-Continue data
    pub edit_and_continue: Option<EditAndContinueData>,
}

impl MethodSymbols {
    /// Symbols consisting of sequence points only.
    #[must_use]
    pub fn with_sequence_points(sequence_points: Vec<SequencePoint>) -> Self {
        MethodSymbols {
            sequence_points,
            ..MethodSymbols::default()
        }
    }

    /// `true` if nothing is known about the method beyond its existence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence_points.is_empty()
            && self.root_scope.is_none()
            && self.async_info.is_none()
            && self.edit_and_continue.is_none()
    }
}
