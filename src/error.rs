//! Error types for force-graph.

use thiserror::Error;

use crate::graph::NodeId;

/// Structural failures raised by the graph registry, the solver and the
/// Barnes-Hut tree.
///
/// Numeric degeneracies (coincident spring endpoints, zero-length
/// directions) are not represented here; they surface as non-finite
/// positions instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("node ids must be unique: {0} is already registered")]
    DuplicateNode(NodeId),

    #[error("cannot find {0}")]
    NodeNotFound(NodeId),

    #[error("every node id up to {} is taken", u32::MAX)]
    NodeIdsExhausted,

    #[error("{id} has mass {mass}, mass must be positive and finite")]
    InvalidMass { id: NodeId, mass: f64 },

    #[error("force '{0}' is already registered")]
    ForceAlreadyRegistered(String),

    #[error("can only visit forces from the root, tree node {0} has a parent")]
    NotRoot(usize),

    #[error("{0} lies outside the tree bounds")]
    OutOfBounds(NodeId),

    #[error("{first} and {second} cannot be separated by the tree (coincident positions)")]
    CoincidentBodies { first: NodeId, second: NodeId },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_id() {
        assert_eq!(
            LayoutError::NodeNotFound(NodeId(7)).to_string(),
            "cannot find Node(7)"
        );
        assert_eq!(
            LayoutError::ForceAlreadyRegistered("gravity".into()).to_string(),
            "force 'gravity' is already registered"
        );
        assert_eq!(
            LayoutError::InvalidMass { id: NodeId(2), mass: -1.0 }.to_string(),
            "Node(2) has mass -1, mass must be positive and finite"
        );
        assert_eq!(
            LayoutError::NodeIdsExhausted.to_string(),
            "every node id up to 4294967295 is taken"
        );
    }
}
