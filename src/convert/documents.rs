//! Numbering of source documents.

use std::collections::HashMap;

use uguid::Guid;

use crate::metadata::builder::{DocumentHandle, PdbBuilder};

/// Maps document names to their `Document` rows.
///
/// Rows are numbered from 1 in first-seen order. Adding a name again returns the existing
/// handle without touching the builder, so checksum and language of a document are taken from
/// its first occurrence.
#[derive(Debug, Default)]
pub struct DocumentTable {
    handles: HashMap<String, DocumentHandle>,
}

impl DocumentTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The handle of `name`, adding a `Document` row to `builder` the first time it is seen.
    pub fn get_or_add(
        &mut self,
        builder: &mut PdbBuilder,
        name: &str,
        hash_algorithm: Guid,
        checksum: &[u8],
        language: Guid,
    ) -> DocumentHandle {
        if let Some(handle) = self.handles.get(name) {
            return *handle;
        }

        let name_blob = builder.add_document_name(name);
        let hash_algorithm = builder.add_guid(hash_algorithm);
        let hash = builder.add_blob(checksum);
        let language = builder.add_guid(language);
        let handle = builder.add_document(name_blob, hash_algorithm, hash, language);

        tracing::trace!(document = name, row = handle.row(), "added document");
        self.handles.insert(name.to_string(), handle);
        handle
    }

    /// The handle of a known document.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<DocumentHandle> {
        self.handles.get(name).copied()
    }

    /// Number of distinct documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// `true` if no document was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
