//! Per-call buffer arena for the encoder.
//!
//! The encoder builds every nested document bottom-up: a sub-document or
//! sub-array is finished first, then the parent appends a view of it. Those
//! views, along with views of serialized extension payloads and of values
//! produced by coercion, borrow from a [`BufferArena`]. Allocation goes through
//! `&self`, so the arena keeps growing while earlier views stay valid, and the
//! borrow checker ties every view to the arena's lifetime.
//!
//! One arena is created per top-level encode call and dropped once the
//! finished document has been copied out.

use bson::{RawArray, RawArrayBuf, RawDocument, RawDocumentBuf};
use typed_arena::Arena;
use variant_core::DynamicValue;

/// Append-only owner of the buffers referenced during one encode pass.
pub struct BufferArena {
    buffers: Arena<Vec<u8>>,
    values: Arena<DynamicValue>,
    documents: Arena<RawDocumentBuf>,
    arrays: Arena<RawArrayBuf>,
}

/// Number of allocations held by an arena, per storage class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub buffers: usize,
    pub values: usize,
    pub documents: usize,
    pub arrays: usize,
}

impl BufferArena {
    /// Create a new, empty arena.
    pub fn new() -> Self {
        Self {
            buffers: Arena::new(),
            values: Arena::new(),
            documents: Arena::new(),
            arrays: Arena::new(),
        }
    }

    /// Take ownership of a byte buffer and return a view of it.
    pub fn alloc_bytes(&self, bytes: Vec<u8>) -> &[u8] {
        self.buffers.alloc(bytes).as_slice()
    }

    /// Take ownership of an intermediate value, such as the result of a
    /// coercion, and return a reference to it.
    pub fn alloc_value(&self, value: DynamicValue) -> &DynamicValue {
        self.values.alloc(value)
    }

    /// Take ownership of a finished sub-document and return a view of it.
    pub fn alloc_document(&self, document: RawDocumentBuf) -> &RawDocument {
        let document: &RawDocumentBuf = self.documents.alloc(document);
        document
    }

    /// Take ownership of a finished sub-array and return a view of it.
    pub fn alloc_array(&self, array: RawArrayBuf) -> &RawArray {
        let array: &RawArrayBuf = self.arrays.alloc(array);
        array
    }

    /// Allocation counts, for diagnostics.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            buffers: self.buffers.len(),
            values: self.values.len(),
            documents: self.documents.len(),
            arrays: self.arrays.len(),
        }
    }
}

impl Default for BufferArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::RawBsonRef;

    #[test]
    fn test_views_survive_later_allocations() {
        let arena = BufferArena::new();
        let first = arena.alloc_bytes(vec![1, 2, 3]);
        for i in 0..1000u32 {
            arena.alloc_bytes(i.to_le_bytes().to_vec());
        }
        assert_eq!(first, &[1, 2, 3]);
        assert_eq!(arena.stats().buffers, 1001);
    }

    #[test]
    fn test_document_view() {
        let arena = BufferArena::new();
        let mut doc = RawDocumentBuf::new();
        doc.append("a", 1i32);
        let view = arena.alloc_document(doc);
        assert_eq!(view.get_i32("a").unwrap(), 1);

        let mut arr = RawArrayBuf::new();
        arr.push("x");
        let arr_view = arena.alloc_array(arr);
        let first = arr_view.into_iter().next().unwrap().unwrap();
        assert!(matches!(first, RawBsonRef::String("x")));

        assert_eq!(
            arena.stats(),
            ArenaStats {
                buffers: 0,
                values: 0,
                documents: 1,
                arrays: 1
            }
        );
    }

    #[test]
    fn test_value_allocation() {
        let arena = BufferArena::new();
        let v = arena.alloc_value(DynamicValue::Int64(9));
        assert_eq!(v, &DynamicValue::Int64(9));
        assert_eq!(arena.stats().values, 1);
    }
}
