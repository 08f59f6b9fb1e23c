//! # Sable VM Export
//!
//! Flattens the subgraph of the heap reachable from a root value into
//! a single relocatable byte buffer.
//!
//! ## Design Principles
//!
//! - **Relocatable**: no object id survives in the finished buffer;
//!   every reference slot holds an immediate or a small handle
//! - **Iterative**: the walk runs on an explicit work stack, so deep
//!   and cyclic graphs cannot overflow the call stack
//! - **Cycle-safe**: back edges are written as transient placeholders
//!   and patched by a single deferred fix-up pass
//! - **Atomic**: an export either returns a complete buffer or an
//!   error; no partial output escapes
//!
//! Code and closure objects are not exportable: reaching one anywhere
//! in the subgraph fails the whole export.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod buffer;
mod error;
mod graph;

pub use error::{ExportError, Result};
pub use graph::{export_to_heap, export_value};
