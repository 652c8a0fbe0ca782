//! Conversion options and the handling of features without a Portable PDB encoding.
//!
//! Legacy symbol data can carry information this converter does not translate: async stepping
//! information, Edit-and-Continue maps, imported namespaces and constants of non-primitive
//! types. Each is an [`UnsupportedFeature`]. The configured [`UnsupportedPolicy`] either aborts
//! the conversion on the first one or records a [`Placeholder`] in the [`ConversionReport`]
//! and carries on.

use crate::{metadata::token::Token, Error, Result};

/// Features of legacy symbol data that are not translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedFeature {
    /// Catch handler and `await` suspension points of an async method
    AsyncSteppingInformation,
    /// Edit-and-Continue local slot and lambda maps
    EditAndContinue,
    /// Namespaces imported by a lexical scope
    ImportScopes,
    /// A constant whose value has no primitive encoding
    ConstantValue,
    /// Scope ranges whose end offset is inclusive
    InclusiveScopeRanges,
}

/// What to do when an [`UnsupportedFeature`] is encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Fail with [`crate::Error::Unsupported`]
    Reject,
    /// Record a [`Placeholder`], log a warning and continue
    #[default]
    Placeholder,
}

/// A dropped piece of symbol data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    /// The method the data belonged to, `None` for data of the whole binary
    pub method: Option<Token>,
    /// What was dropped
    pub feature: UnsupportedFeature,
}

/// Configuration of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConversionOptions {
    /// Handling of unsupported features (default: [`UnsupportedPolicy::Placeholder`])
    pub unsupported: UnsupportedPolicy,
    /// User entry point; overrides the symbol source and the CLR header when set
    pub entry_point: Option<Token>,
}

impl ConversionOptions {
    /// Default options: placeholders for unsupported features, entry point from the symbols.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that fail on any unsupported feature.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            unsupported: UnsupportedPolicy::Reject,
            entry_point: None,
        }
    }

    /// Set the unsupported feature policy.
    #[must_use]
    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }

    /// Set the user entry point.
    #[must_use]
    pub fn with_entry_point(mut self, method: Token) -> Self {
        self.entry_point = Some(method);
        self
    }
}

/// Summary of a finished conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// The PDB id written to the `#Pdb` stream
    pub pdb_id: [u8; 20],
    /// The user entry point written to the `#Pdb` stream
    pub entry_point: Option<Token>,
    /// Number of `Document` rows
    pub documents: u32,
    /// Number of `MethodDebugInformation` rows, one per `MethodDef`
    pub methods: u32,
    /// Methods for which the symbol source had data
    pub methods_with_symbols: u32,
    /// Number of `LocalScope` rows
    pub scopes: u32,
    /// Size of the produced Portable PDB
    pub bytes: usize,
    /// Data that was dropped under [`UnsupportedPolicy::Placeholder`], in encounter order
    pub placeholders: Vec<Placeholder>,
}

impl ConversionReport {
    /// `true` if no symbol data was dropped.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// Applies an [`UnsupportedPolicy`] and collects the resulting placeholders.
#[derive(Debug, Default)]
pub struct FeatureGate {
    policy: UnsupportedPolicy,
    placeholders: Vec<Placeholder>,
}

impl FeatureGate {
    /// Create a gate applying `policy`.
    #[must_use]
    pub fn new(policy: UnsupportedPolicy) -> Self {
        FeatureGate {
            policy,
            placeholders: Vec::new(),
        }
    }

    /// Report an occurrence of `feature`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unsupported`] under [`UnsupportedPolicy::Reject`].
    pub fn encounter(&mut self, feature: UnsupportedFeature, method: Option<Token>) -> Result<()> {
        match self.policy {
            UnsupportedPolicy::Reject => Err(Error::Unsupported { feature, method }),
            UnsupportedPolicy::Placeholder => {
                tracing::warn!(?feature, ?method, "unsupported symbol data replaced by placeholder");
                self.placeholders.push(Placeholder { method, feature });
                Ok(())
            }
        }
    }

    /// The placeholders recorded so far.
    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Consume the gate, returning its placeholders.
    #[must_use]
    pub fn into_placeholders(self) -> Vec<Placeholder> {
        self.placeholders
    }
}
