//! Force-directed layout for graph visualization.
//!
//! [`ForceLayout`] computes node positions for a [`GraphEngine`] by running
//! the physics solver until movement dies down; [`LayoutConfig`] holds its
//! tuning.
//!
//! [`GraphEngine`]: crate::graph::GraphEngine

mod config;
mod simulation;

pub use config::LayoutConfig;
pub use simulation::{ForceLayout, LayoutReport};
