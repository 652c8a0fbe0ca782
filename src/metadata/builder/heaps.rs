//! De-duplicating heap builders for `#Strings`, `#Blob` and `#GUID`.
//!
//! All three heaps reserve index 0 for the "nothing" entry: the empty string, the empty blob
//! and the nil GUID. Adding the same content twice returns the same handle.

use std::collections::HashMap;

use uguid::Guid;

use crate::utils::compressed::write_compressed_uint;

/// Byte offset of an entry in the `#Strings` heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringHandle(pub u32);

/// Byte offset of an entry in the `#Blob` heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlobHandle(pub u32);

/// 1-based index of an entry in the `#GUID` heap, 0 for the nil GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GuidHandle(pub u32);

/// Heaps whose indices need 4 bytes once the heap grows past this size.
const SMALL_HEAP_LIMIT: usize = 0xFFFF;

/// Builder for the `#Strings` heap: null-terminated UTF-8.
#[derive(Debug, Clone)]
pub struct StringHeap {
    data: Vec<u8>,
    lookup: HashMap<String, u32>,
}

impl Default for StringHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl StringHeap {
    /// Create a heap holding only the empty string.
    #[must_use]
    pub fn new() -> Self {
        StringHeap {
            data: vec![0],
            lookup: HashMap::new(),
        }
    }

    /// Add `value`, returning the offset of its existing copy if it was added before.
    ///
    /// # Panics
    /// Panics if the heap outgrows a `u32` offset.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, value: &str) -> StringHandle {
        if value.is_empty() {
            return StringHandle(0);
        }
        if let Some(&offset) = self.lookup.get(value) {
            return StringHandle(offset);
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.lookup.insert(value.to_string(), offset);
        StringHandle(offset)
    }

    /// The heap bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// `true` if indices into this heap take 4 bytes.
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.data.len() > SMALL_HEAP_LIMIT
    }
}

/// Builder for the `#Blob` heap: compressed length followed by the bytes.
#[derive(Debug, Clone)]
pub struct BlobHeap {
    data: Vec<u8>,
    lookup: HashMap<Vec<u8>, u32>,
}

impl Default for BlobHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobHeap {
    /// Create a heap holding only the empty blob.
    #[must_use]
    pub fn new() -> Self {
        BlobHeap {
            data: vec![0],
            lookup: HashMap::new(),
        }
    }

    /// Add `value`, returning the offset of its existing copy if it was added before.
    ///
    /// # Panics
    /// Panics if the blob is longer than a compressed length can express.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, value: &[u8]) -> BlobHandle {
        if value.is_empty() {
            return BlobHandle(0);
        }
        if let Some(&offset) = self.lookup.get(value) {
            return BlobHandle(offset);
        }

        let offset = self.data.len() as u32;
        write_compressed_uint(value.len() as u32, &mut self.data);
        self.data.extend_from_slice(value);
        self.lookup.insert(value.to_vec(), offset);
        BlobHandle(offset)
    }

    /// The heap bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// `true` if indices into this heap take 4 bytes.
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.data.len() > SMALL_HEAP_LIMIT
    }
}

/// Builder for the `#GUID` heap: a plain array of 16 byte GUIDs.
#[derive(Debug, Clone, Default)]
pub struct GuidHeap {
    guids: Vec<Guid>,
    lookup: HashMap<Guid, u32>,
}

impl GuidHeap {
    /// Create an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value`. The nil GUID is never stored and maps to index 0.
    #[allow(clippy::cast_possible_truncation)]
    pub fn add(&mut self, value: Guid) -> GuidHandle {
        if value == Guid::ZERO {
            return GuidHandle(0);
        }
        if let Some(&index) = self.lookup.get(&value) {
            return GuidHandle(index);
        }

        self.guids.push(value);
        let index = self.guids.len() as u32;
        self.lookup.insert(value, index);
        GuidHandle(index)
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guids.len()
    }

    /// `true` if no GUID was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guids.is_empty()
    }

    /// The heap bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.guids.iter().flat_map(|guid| guid.to_bytes()).collect()
    }

    /// `true` if indices into this heap take 4 bytes.
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.guids.len() > SMALL_HEAP_LIMIT
    }
}
