//! Heap graph traversal and encoding
//!
//! Walks the subgraph reachable from a root value depth-first on an
//! explicit stack, assigns each distinct object a handle in completion
//! order, and emits length-prefixed object bodies with every internal
//! reference rewritten to a handle.
//!
//! ## Buffer layout
//!
//! Objects are emitted children-first: a finished object's length word
//! is copied verbatim, then its body: raw bytes for byte objects, one
//! word per slot for cell objects. The final word of the buffer is the
//! root's handle, or the root itself when it is an immediate.
//!
//! ## Cycles
//!
//! A reference to an object still on the active path is a back edge.
//! Its target cannot have a handle yet, so the referencing object is
//! finalized with raw identity words in the unresolved slots, each
//! recorded on a rewrite list. After the stack drains, every reachable
//! object is finished and the fix-up pass patches the recorded slots
//! through the index. Handles step by 2: they share the even
//! (reference) tag class, so a decoder can never mistake one for an
//! immediate.

use rustc_hash::FxHashMap;
use sable_vm_heap::{Heap, HeapObject, ObjId, ObjectBody, ObjectKind, Value, Word};

use crate::buffer::OutputBuffer;
use crate::error::{ExportError, Result};

const HANDLE_STEP: Word = 2;

/// Visitation state of one object id. Absent from the index = unseen.
enum Mark {
    /// An ancestor on the active traversal path; a revisit is a back
    /// edge.
    InProgress,
    /// Encoded, with its assigned handle word.
    Finished(Word),
}

#[derive(Clone, Copy)]
struct WorkItem {
    id: ObjId,
    /// Set when this entry was pushed for a back edge: the object is
    /// part of a cycle and is finalized without re-scanning.
    back_edge: bool,
}

/// A raw identity word awaiting its target's handle.
struct Patch {
    offset: usize,
    target: ObjId,
}

struct GraphEncoder<'heap> {
    heap: &'heap Heap,
    index: FxHashMap<ObjId, Mark>,
    stack: Vec<WorkItem>,
    buffer: OutputBuffer,
    patches: Vec<Patch>,
    next_handle: Word,
}

impl<'heap> GraphEncoder<'heap> {
    fn new(heap: &'heap Heap) -> Self {
        GraphEncoder {
            heap,
            index: FxHashMap::default(),
            stack: Vec::new(),
            buffer: OutputBuffer::new(),
            patches: Vec::new(),
            next_handle: 0,
        }
    }

    fn export(mut self, root: Value) -> Result<Vec<u8>> {
        let Some(root_id) = root.as_obj() else {
            // Immediate root: its word encoding is the whole buffer.
            self.buffer.write_word(root.bits());
            return Ok(self.buffer.into_bytes());
        };

        self.stack.push(WorkItem {
            id: root_id,
            back_edge: false,
        });

        while let Some(&WorkItem { id, back_edge }) = self.stack.last() {
            if let Some(Mark::Finished(_)) = self.index.get(&id) {
                // Duplicate reference reached via another path.
                self.stack.pop();
                continue;
            }

            let obj = self.heap.get(id);
            match obj.kind() {
                ObjectKind::Code => return Err(ExportError::CodeObject),
                ObjectKind::Closure => return Err(ExportError::ClosureObject),
                ObjectKind::Cells | ObjectKind::Bytes => {}
            }

            if !back_edge && self.scan(obj) {
                // Children were pushed; this entry stays beneath them
                // and finalizes once they are done.
                self.index.insert(id, Mark::InProgress);
                continue;
            }

            self.finalize(id, obj, back_edge);
        }

        self.patch_cycles();
        let root_handle = self.finished_handle(root_id);
        self.buffer.write_word(root_handle);

        #[cfg(feature = "export_logging")]
        tracing::debug!(
            target: "sable::export",
            objects = self.index.len(),
            bytes = self.buffer.len(),
            patched = self.patches.len(),
            "export complete"
        );

        Ok(self.buffer.into_bytes())
    }

    /// Scan a cell object's slots in order, pushing entries for
    /// children that still need work. Returns whether anything was
    /// pushed.
    fn scan(&mut self, obj: &HeapObject) -> bool {
        let Some(cells) = obj.cells() else {
            // Byte objects have no reference slots.
            return false;
        };
        let before = self.stack.len();
        for slot in cells {
            let Some(child) = slot.as_obj() else { continue };
            match self.index.get(&child) {
                None => self.stack.push(WorkItem {
                    id: child,
                    back_edge: false,
                }),
                Some(Mark::InProgress) => self.stack.push(WorkItem {
                    id: child,
                    back_edge: true,
                }),
                Some(Mark::Finished(_)) => {}
            }
        }
        self.stack.len() != before
    }

    /// Emit one finished object: length word verbatim, then the body,
    /// then assign its handle and pop it from the stack.
    fn finalize(&mut self, id: ObjId, obj: &HeapObject, back_edge: bool) {
        self.next_handle += HANDLE_STEP;
        let handle = self.next_handle;

        self.buffer.write_word(obj.header().bits());
        match obj.body() {
            ObjectBody::Bytes(bytes) => self.buffer.write_bytes(bytes),
            ObjectBody::Cells(cells) => {
                for slot in cells {
                    let Some(child) = slot.as_obj() else {
                        self.buffer.write_word(slot.bits());
                        continue;
                    };
                    match self.index.get(&child) {
                        Some(Mark::Finished(child_handle)) => {
                            self.buffer.write_word(*child_handle);
                        }
                        _ => {
                            // Only a cycle participant may hold an
                            // unresolved child at this point.
                            debug_assert!(back_edge, "unresolved child outside a back edge");
                            self.patches.push(Patch {
                                offset: self.buffer.len(),
                                target: child,
                            });
                            self.buffer.write_word(slot.bits());
                        }
                    }
                }
            }
            ObjectBody::Code(_) | ObjectBody::Closure(_) => {
                unreachable!("excluded kinds are rejected before finalizing")
            }
        }

        self.index.insert(id, Mark::Finished(handle));
        self.stack.pop();
    }

    /// Rewrite the raw identity placeholders left for cycle edges.
    /// Runs once, after the stack has drained; touches only the
    /// recorded offsets.
    fn patch_cycles(&mut self) {
        for patch in &self.patches {
            let handle = match self.index.get(&patch.target) {
                Some(Mark::Finished(handle)) => *handle,
                // Traversal finishes every id it ever pushes, so a
                // recorded target cannot be unfinished here.
                _ => unreachable!("cycle target never finished"),
            };
            self.buffer.overwrite_word(patch.offset, handle);
        }
    }

    fn finished_handle(&self, id: ObjId) -> Word {
        match self.index.get(&id) {
            Some(Mark::Finished(handle)) => *handle,
            _ => unreachable!("object not finished after traversal"),
        }
    }
}

/// Encode the subgraph reachable from `root` into a relocatable byte
/// buffer.
///
/// The buffer holds each reachable object exactly once, children
/// before parents, with every reference slot rewritten to the target's
/// handle; the trailing word is the root's handle (or the root itself
/// when it is an immediate). Fails without producing output if a code
/// object or closure is reachable.
pub fn export_value(heap: &Heap, root: Value) -> Result<Vec<u8>> {
    GraphEncoder::new(heap).export(root)
}

/// Encode `root` and package the finished buffer as a byte object on
/// the heap.
///
/// Allocation happens strictly after the buffer is complete, so the
/// traversal itself runs against a frozen heap.
pub fn export_to_heap(heap: &mut Heap, root: Value) -> Result<Value> {
    let buffer = export_value(heap, root)?;
    Ok(heap.alloc_bytes(&buffer))
}
