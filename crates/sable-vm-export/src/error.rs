//! Export errors

use thiserror::Error;

/// Errors that can occur while exporting a heap graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExportError {
    /// A code object is reachable from the root.
    #[error("can't export code objects")]
    CodeObject,

    /// A closure is reachable from the root.
    #[error("can't export closures")]
    ClosureObject,
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
