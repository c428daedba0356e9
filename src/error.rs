use crate::types::NodeId;

/// Failures reported by the flow network and the max-flow engine.
///
/// All of them are sequencing or input errors on the caller's side, except
/// `MissingEdge`, which means an augmenting path refers to a node pair that
/// has no structural edge in either direction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),
    #[error("No graph loaded")]
    NoGraphLoaded,
    #[error("Engine not initialized")]
    NotInitialized,
    #[error("No edge between {from} and {to} can carry the augmentation")]
    MissingEdge { from: NodeId, to: NodeId },
}
