//! Spatial partitioning for O(n log n) force approximation.
//!
//! This module provides the Barnes-Hut tree used by the gravity force and the
//! strategies that size and build it from the current bodies every step.

mod barnes_hut;
mod bounds;

pub use barnes_hut::{BarnesHutTree, NodeType, TreeBody, TreeNode, MAX_DEPTH, ROOT};
pub use bounds::{bounding_square, FittedBounds, FixedBounds, TreeBuilder};
