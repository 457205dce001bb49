//! Force Graph - WASM Module
//!
//! This module computes force-directed layouts for graph visualization. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen.
//!
//! # Architecture
//!
//! - `math`: fixed-dimension vectors shared by 2D and 3D layouts
//! - `graph`: graph data structure using petgraph's StableGraph
//! - `physics`: bodies, springs, the Euler integrator and the solver
//! - `spatial`: Barnes-Hut tree for O(n log n) gravity
//! - `forces`: gravity, spring and drag force providers
//! - `layout`: configuration and the convergence loop

use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod forces;
pub mod graph;
pub mod layout;
pub mod math;
pub mod physics;
pub mod spatial;

pub use error::{LayoutError, Result};

use graph::{GraphEngine, NodeId};
use layout::{ForceLayout, LayoutConfig};
use math::Vec2;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point for 2D layouts.
///
/// This struct wraps a GraphEngine and the ForceLayout running over it, and
/// provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct ForceGraphWasm {
    engine: GraphEngine<2>,
    layout: ForceLayout<2>,
}

#[wasm_bindgen]
impl ForceGraphWasm {
    /// Create an empty graph.
    ///
    /// `config` is a partial `LayoutConfig` object (camelCase keys);
    /// `undefined` or `null` uses the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> std::result::Result<ForceGraphWasm, JsError> {
        let config: LayoutConfig = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        Ok(Self {
            engine: GraphEngine::new(),
            layout: ForceLayout::new(config)?,
        })
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f64, y: f64) -> std::result::Result<u32, JsError> {
        Ok(self.engine.add_node(Vec2::new(x, y))?.0)
    }

    /// Add a node under a caller-chosen ID. Fails if the ID is taken.
    #[wasm_bindgen(js_name = insertNode)]
    pub fn insert_node(&mut self, node_id: u32, x: f64, y: f64) -> std::result::Result<(), JsError> {
        self.engine.insert_node(NodeId(node_id), Vec2::new(x, y))?;
        Ok(())
    }

    /// Add multiple nodes from a Float64Array of positions.
    ///
    /// The positions array should be [x0, y0, x1, y1, ...].
    /// Returns the number of nodes added.
    #[wasm_bindgen(js_name = addNodesFromPositions)]
    pub fn add_nodes_from_positions(&mut self, positions: &[f64]) -> std::result::Result<u32, JsError> {
        Ok(self.engine.add_nodes_from_positions(positions)?)
    }

    /// Get the number of nodes.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.node_count() as u32
    }

    /// Get a node's X position.
    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f64> {
        self.engine.node_position(NodeId(node_id)).map(|p| p.x)
    }

    /// Get a node's Y position.
    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f64> {
        self.engine.node_position(NodeId(node_id)).map(|p| p.y)
    }

    /// Move a node. Takes effect on the next `start`.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f64, y: f64) -> std::result::Result<(), JsError> {
        self.engine.set_node_position(NodeId(node_id), Vec2::new(x, y))?;
        Ok(())
    }

    // =========================================================================
    // Link Operations
    // =========================================================================

    /// Add a directed link, optionally with its own rest length and
    /// stiffness. Returns the link ID.
    #[wasm_bindgen(js_name = addLink)]
    pub fn add_link(
        &mut self,
        source: u32,
        target: u32,
        length: Option<f64>,
        coefficient: Option<f64>,
    ) -> std::result::Result<u32, JsError> {
        let id = self
            .engine
            .add_link(NodeId(source), NodeId(target), length, coefficient)?;
        Ok(id.raw())
    }

    /// Get the number of links.
    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.engine.edge_count() as u32
    }

    /// IDs of every node reachable from `node_id` (itself included).
    #[wasm_bindgen(js_name = reachableFrom)]
    pub fn reachable_from(
        &self,
        node_id: u32,
        include_incoming: bool,
    ) -> std::result::Result<Vec<u32>, JsError> {
        let ids = self.engine.reachable_from(NodeId(node_id), include_incoming)?;
        Ok(ids.into_iter().map(u32::from).collect())
    }

    /// Nudge apart nodes that share a position. Returns how many moved.
    #[wasm_bindgen(js_name = separateCoincident)]
    pub fn separate_coincident(&mut self, seed: u32, magnitude: f64) -> std::result::Result<u32, JsError> {
        let moved = self.engine.separate_coincident(u64::from(seed), magnitude)?;
        Ok(moved as u32)
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// (Re)load the simulation from the current nodes and links, all at rest.
    pub fn start(&mut self) -> std::result::Result<(), JsError> {
        self.layout.load(&self.engine)?;
        Ok(())
    }

    /// Advance one time step and return the convergence metric.
    pub fn step(&mut self) -> std::result::Result<f64, JsError> {
        let delta = self.layout.step()?;
        self.layout.write_positions(&mut self.engine)?;
        Ok(delta)
    }

    /// Step until converged or `max_iterations` (default from the config).
    ///
    /// Returns `{ iterations, converged, lastDelta }`.
    pub fn run(&mut self, max_iterations: Option<usize>) -> std::result::Result<JsValue, JsError> {
        let max_iterations = max_iterations.unwrap_or(self.layout.config().max_iterations);
        let report = self.layout.run(max_iterations)?;
        self.layout.write_positions(&mut self.engine)?;

        if !report.converged {
            web_sys::console::warn_1(
                &format!(
                    "force-graph: no convergence after {} iterations (last delta {})",
                    report.iterations, report.last_delta
                )
                .into(),
            );
        }
        Ok(serde_wasm_bindgen::to_value(&report)?)
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Positions as a Float64Array [x0, y0, x1, y1, ...] in node insertion
    /// order.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float64Array {
        Float64Array::from(&self.engine.positions_flat()[..])
    }

    /// Get the bounding box as [min_x, min_y, max_x, max_y].
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f64>> {
        self.engine
            .bounds()
            .map(|(min, max)| vec![min.x, min.y, max.x, max.y])
    }

    /// Clear all nodes and links.
    pub fn clear(&mut self) -> std::result::Result<(), JsError> {
        self.engine.clear();
        self.layout.load(&self.engine)?;
        Ok(())
    }
}
