//! Node identifiers.
//!
//! Nodes are the vertices of the layout graph. Each node has:
//! - A stable unique identifier, chosen by the caller or assigned
//! - A position in layout space (see [`GraphEngine`](super::GraphEngine))

use std::fmt;

/// Stable node identifier.
///
/// Wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}
