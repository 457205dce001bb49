//! What the solver needs to know about a graph to lay it out.

use crate::error::Result;
use crate::math::VecN;

use super::NodeId;

/// A node as seen by the solver: identity and starting position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopologyNode<const D: usize> {
    pub id: NodeId,
    pub position: VecN<D>,
}

/// An outgoing dependency of a node, becoming one spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dependency {
    pub target: NodeId,
    pub length: Option<f64>,
    pub coefficient: Option<f64>,
}

/// Source of nodes and their outgoing dependencies.
pub trait Topology<const D: usize> {
    /// Every node, in a stable order.
    fn topology_nodes(&self) -> Vec<TopologyNode<D>>;

    /// Outgoing dependencies of `id`. Fails if `id` is unknown.
    fn dependencies_of(&self, id: NodeId) -> Result<Vec<Dependency>>;
}
