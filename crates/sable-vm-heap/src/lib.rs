//! # Sable VM Heap
//!
//! Value and object model for the Sable VM: tagged word values, length
//! word headers, and an arena heap indexed by object id.
//!
//! ## Design
//!
//! - **Tagged words**: a value is one machine word; the low bit
//!   distinguishes immediates (odd) from object references (even)
//! - **Arena identity**: objects never move and are identified by a
//!   stable integer id, never by a live address
//! - **Allocation freeze**: every allocating operation takes `&mut
//!   Heap`, so holding a shared borrow of the heap (as the exporter
//!   does for a full traversal) rules out allocation for its duration

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod heap;
pub mod object;
pub mod value;

pub use heap::{Heap, ObjId};
pub use object::{HeapObject, LengthWord, ObjectBody, ObjectKind, flags};
pub use value::{Value, WORD_SIZE, Word};
