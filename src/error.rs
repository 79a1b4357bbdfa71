use derive_more::Display;

use crate::types::VInt;

/// Errors reported by the detection core.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum GnError {
    /// A malformed edge or configuration value reached the core.
    #[display(fmt = "invalid input: {}", _0)]
    InvalidInput(String),
    /// The graph holds no nodes at all.
    #[display(fmt = "graph is empty")]
    EmptyGraph,
    /// A query named a node that is not in the graph.
    #[display(fmt = "node {} not found", _0)]
    NotFound(VInt),
}

impl std::error::Error for GnError {}

pub type GnResult<T> = Result<T, GnError>;
