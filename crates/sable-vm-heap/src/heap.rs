//! Arena heap
//!
//! Objects live in a flat arena and are identified by index. Ids stay
//! valid for the life of the heap: nothing moves and nothing is freed.
//! Every allocating operation takes `&mut self`, so a shared borrow of
//! the heap freezes allocation for as long as it is held.

use crate::object::{HeapObject, LengthWord, ObjectBody, flags};
use crate::value::{Value, WORD_SIZE};

/// Stable arena index of a heap object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(u32);

impl ObjId {
    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize);
        ObjId(index as u32)
    }

    /// The arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Managed heap: a grow-only object arena.
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    /// Create an empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty heap sized for roughly `objects` allocations.
    pub fn with_capacity(objects: usize) -> Self {
        Heap {
            objects: Vec::with_capacity(objects),
        }
    }

    /// Number of objects allocated so far.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Is the heap empty?
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this heap.
    pub fn get(&self, id: ObjId) -> &HeapObject {
        &self.objects[id.index()]
    }

    /// Allocate a cell object with the given slots.
    pub fn alloc_cells(&mut self, slots: Vec<Value>) -> Value {
        let header = LengthWord::new(slots.len(), 0);
        self.push(header, ObjectBody::Cells(slots))
    }

    /// Allocate a byte object holding `data`, padded to a whole number
    /// of words.
    pub fn alloc_bytes(&mut self, data: &[u8]) -> Value {
        let (words, padded) = pad_to_words(data);
        self.push(LengthWord::new(words, flags::BYTES), ObjectBody::Bytes(padded))
    }

    /// Allocate a code object. Code is opaque to everything but the
    /// execution engine.
    pub fn alloc_code(&mut self, code: &[u8]) -> Value {
        let (words, padded) = pad_to_words(code);
        self.push(LengthWord::new(words, flags::CODE), ObjectBody::Code(padded))
    }

    /// Allocate a closure capturing the given values.
    pub fn alloc_closure(&mut self, captures: Vec<Value>) -> Value {
        let header = LengthWord::new(captures.len(), flags::CLOSURE);
        self.push(header, ObjectBody::Closure(captures))
    }

    /// Overwrite one slot of a cell object. This is how reference
    /// cycles are tied: allocate first, then point a slot back.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a cell object or `slot` is out of range.
    pub fn set_cell(&mut self, id: ObjId, slot: usize, value: Value) {
        let ObjectBody::Cells(cells) = self.objects[id.index()].body_mut() else {
            panic!("set_cell on a non-cell object");
        };
        cells[slot] = value;
    }

    fn push(&mut self, header: LengthWord, body: ObjectBody) -> Value {
        let id = ObjId::from_index(self.objects.len());
        self.objects.push(HeapObject::new(header, body));
        Value::object(id)
    }
}

fn pad_to_words(data: &[u8]) -> (usize, Box<[u8]>) {
    let words = data.len().div_ceil(WORD_SIZE);
    let mut padded = vec![0u8; words * WORD_SIZE];
    padded[..data.len()].copy_from_slice(data);
    (words, padded.into_boxed_slice())
}
