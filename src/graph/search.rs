//! Reachability queries over the link structure.

use std::collections::{HashSet, VecDeque};

use petgraph::Direction;

use super::{GraphEngine, NodeId};
use crate::error::Result;

impl<const D: usize> GraphEngine<D> {
    /// Breadth-first search from `start` along outgoing links, and along
    /// incoming links too when `include_incoming` is set.
    ///
    /// Returns every reached node, `start` included, in insertion order.
    pub fn reachable_from(&self, start: NodeId, include_incoming: bool) -> Result<Vec<NodeId>> {
        let mut explored = HashSet::new();
        let mut queue = VecDeque::new();

        // Validates `start` before anything is explored.
        self.neighbors(start, Direction::Outgoing)?;
        explored.insert(start);
        queue.push_back(start);

        while let Some(id) = queue.pop_front() {
            let mut next = self.neighbors(id, Direction::Outgoing)?;
            if include_incoming {
                next.extend(self.neighbors(id, Direction::Incoming)?);
            }
            for neighbor in next {
                if explored.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(self
            .node_ids()
            .into_iter()
            .filter(|id| explored.contains(id))
            .collect())
    }
}
