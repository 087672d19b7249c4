//! Error types for the production engine.

use hypergrammar_core::VertexId;
use thiserror::Error;

use crate::production::ProductionId;

/// Result type alias for grammar operations.
pub type GrammarResult<T> = Result<T, GrammarError>;

/// Errors that can occur while applying productions.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A `Q` candidate has the wrong number of vertices for the production.
    #[error("invalid topology in {production}: Q edge must connect exactly {expected} vertices, got {found} ({vertices:?})")]
    InvalidTopology {
        production: ProductionId,
        expected: usize,
        found: usize,
        vertices: Vec<VertexId>,
    },

    /// Configuration serialization/deserialization error.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error (config files).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
