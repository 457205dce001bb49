//! Graph data structures and operations.
//!
//! This module provides the layout graph using petgraph's StableGraph, plus
//! the [`Topology`] view the solver loads bodies and springs from.

mod edge;
mod engine;
mod jitter;
mod node;
mod search;
mod topology;

pub use edge::{EdgeId, Link};
pub use engine::GraphEngine;
pub use node::NodeId;
pub use topology::{Dependency, Topology, TopologyNode};
