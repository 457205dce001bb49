//! GraphEngine - topology registry for the layout.
//!
//! The GraphEngine stores the graph topology using petgraph's StableGraph and
//! keeps node positions in a flat buffer indexed by petgraph's node index, so
//! they can be copied straight into a typed array for rendering.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use std::collections::HashMap;
use tracing::debug;

use super::edge::{EdgeId, Link};
use super::node::NodeId;
use super::topology::{Dependency, Topology, TopologyNode};
use crate::error::{LayoutError, Result};
use crate::math::VecN;

/// The graph being laid out.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Node positions
/// - ID mapping between stable IDs and internal indices
///
/// Nodes and links are only ever added; `clear` starts over.
pub struct GraphEngine<const D: usize> {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store spring parameters.
    graph: StableGraph<NodeId, Link, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Next auto-assigned node ID candidate. Wider than `u32` so that
    /// handing out `u32::MAX` leaves a value that reads as exhausted.
    next_node_id: u64,

    /// Positions, indexed by NodeIndex
    positions: Vec<VecN<D>>,
}

impl<const D: usize> GraphEngine<D> {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            node_id_to_index: HashMap::new(),
            next_node_id: 0,
            positions: Vec::new(),
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            next_node_id: 0,
            positions: Vec::with_capacity(node_capacity),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with a caller-chosen id.
    pub fn insert_node(&mut self, id: NodeId, position: VecN<D>) -> Result<()> {
        if self.node_id_to_index.contains_key(&id) {
            return Err(LayoutError::DuplicateNode(id));
        }

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);
        self.positions.push(position);
        debug!(%id, ?position, "inserted node");
        Ok(())
    }

    /// Add a node at the specified position under the next free id.
    ///
    /// Fails with [`LayoutError::NodeIdsExhausted`] once the id counter has
    /// passed `u32::MAX`.
    pub fn add_node(&mut self, position: VecN<D>) -> Result<NodeId> {
        let id = loop {
            let candidate =
                u32::try_from(self.next_node_id).map_err(|_| LayoutError::NodeIdsExhausted)?;
            self.next_node_id += 1;
            if !self.node_id_to_index.contains_key(&NodeId(candidate)) {
                break NodeId(candidate);
            }
        };

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);
        self.positions.push(position);
        Ok(id)
    }

    /// Add multiple nodes from a flat positions array `[x0, y0, x1, y1, ...]`
    /// (`D` values per node). A trailing partial chunk is ignored.
    pub fn add_nodes_from_positions(&mut self, positions: &[f64]) -> Result<u32> {
        let count = positions.len() / D;

        self.node_id_to_index.reserve(count);
        self.positions.reserve(count);

        for chunk in positions.chunks_exact(D) {
            let mut position = VecN::zeros();
            for (axis, &value) in chunk.iter().enumerate() {
                position[axis] = value;
            }
            self.add_node(position)?;
        }

        Ok(count as u32)
    }

    /// Check whether a node with this id exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// All node ids in insertion order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .map(|index| self.graph[index])
            .collect()
    }

    /// Get a node's position.
    pub fn node_position(&self, id: NodeId) -> Option<VecN<D>> {
        self.node_id_to_index
            .get(&id)
            .map(|index| self.positions[index.index()])
    }

    /// Set a node's position.
    pub fn set_node_position(&mut self, id: NodeId, position: VecN<D>) -> Result<()> {
        let index = self.index_of(id)?;
        self.positions[index.index()] = position;
        Ok(())
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Add a directed link. Both endpoints must exist; on failure nothing is
    /// added.
    pub fn add_link(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: Option<f64>,
        coefficient: Option<f64>,
    ) -> Result<EdgeId> {
        let source = self.index_of(from)?;
        let target = self.index_of(to)?;

        let index = self
            .graph
            .add_edge(source, target, Link::new(length, coefficient));
        debug!(%from, %to, ?length, ?coefficient, "added link");
        Ok(EdgeId(index.index() as u32))
    }

    /// Get the number of links.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Links leaving `id`, in the order they were added.
    pub fn links_from(&self, id: NodeId) -> Result<Vec<(NodeId, Link)>> {
        let index = self.index_of(id)?;
        let mut links: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.id(), self.graph[edge.target()], *edge.weight()))
            .collect();
        links.sort_by_key(|(edge, _, _)| *edge);
        Ok(links
            .into_iter()
            .map(|(_, target, link)| (target, link))
            .collect())
    }

    /// Nodes one link away from `id` in `direction`, in insertion order.
    pub fn neighbors(&self, id: NodeId, direction: Direction) -> Result<Vec<NodeId>> {
        let index = self.index_of(id)?;
        let mut neighbors: Vec<_> = self.graph.neighbors_directed(index, direction).collect();
        neighbors.sort();
        neighbors.dedup();
        Ok(neighbors.into_iter().map(|n| self.graph[n]).collect())
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Positions flattened as `[x0, y0, x1, y1, ...]` in insertion order.
    pub fn positions_flat(&self) -> Vec<f64> {
        self.positions
            .iter()
            .flat_map(|position| position.iter().copied())
            .collect()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the axis-aligned bounding box `(min, max)` of all nodes.
    pub fn bounds(&self) -> Option<(VecN<D>, VecN<D>)> {
        let first = *self.positions.first()?;
        let (mut min, mut max) = (first, first);
        for position in &self.positions[1..] {
            for axis in 0..D {
                min[axis] = min[axis].min(position[axis]);
                max[axis] = max[axis].max(position[axis]);
            }
        }
        Some((min, max))
    }

    /// Clear all nodes and links, resetting the engine to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.next_node_id = 0;
        self.positions.clear();
    }

    fn index_of(&self, id: NodeId) -> Result<NodeIndex> {
        self.node_id_to_index
            .get(&id)
            .copied()
            .ok_or(LayoutError::NodeNotFound(id))
    }

    pub(super) fn positions_mut(&mut self) -> &mut [VecN<D>] {
        &mut self.positions
    }
}

impl<const D: usize> Default for GraphEngine<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const D: usize> Topology<D> for GraphEngine<D> {
    fn topology_nodes(&self) -> Vec<TopologyNode<D>> {
        self.graph
            .node_indices()
            .map(|index| TopologyNode {
                id: self.graph[index],
                position: self.positions[index.index()],
            })
            .collect()
    }

    fn dependencies_of(&self, id: NodeId) -> Result<Vec<Dependency>> {
        Ok(self
            .links_from(id)?
            .into_iter()
            .map(|(target, link)| Dependency {
                target,
                length: link.length,
                coefficient: link.coefficient,
            })
            .collect())
    }
}
