use thiserror::Error;

use crate::types::NodeId;

/// errors raised while building or addressing an oracle
///
/// a query that finds no member of a label or no path is not an error, it returns an
/// unreachable result instead
#[derive(Debug, Error)]
pub enum OracleError {

    #[error("the graph has no vertices")]
    EmptyGraph,

    #[error("vertex {node} is out of range, the graph has {num_nodes} vertices")]
    NodeOutOfRange { node: NodeId, num_nodes: usize },

    #[error("edge {edge} ({source_node} -> {target_node}) references a vertex outside of 0..{num_nodes}")]
    EdgeOutOfRange { edge: usize, source_node: NodeId, target_node: NodeId, num_nodes: usize },

    #[error("edge {edge} has a negative weight {weight}")]
    NegativeWeight { edge: usize, weight: String },

    #[error("edge {edge} has weight {weight} which is not below the infinity sentinel")]
    WeightOutOfRange { edge: usize, weight: String },

    #[error("got {edges} edges but {weights} weights")]
    WeightCountMismatch { edges: usize, weights: usize },

    #[error("got {labels} labels for {num_nodes} vertices")]
    LabelCountMismatch { labels: usize, num_nodes: usize },

    #[error("portal count {portals} is not within 1..={num_nodes}")]
    InvalidPortalCount { portals: usize, num_nodes: usize },

    #[error("unable to read graph file: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, OracleError>;
