//! Force-directed layout driver.
//!
//! Wires the standard forces into a [`Solver`], loads a graph and steps until
//! the layout settles.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::forces::{Drag, Gravity, SpringForce};
use crate::graph::GraphEngine;
use crate::physics::Solver;
use crate::spatial::FittedBounds;

use super::LayoutConfig;

/// Outcome of [`ForceLayout::run`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReport {
    /// Steps taken.
    pub iterations: usize,
    /// Whether the last step fell below the convergence epsilon.
    pub converged: bool,
    /// Metric of the last step, infinite if no step ran.
    pub last_delta: f64,
}

/// Barnes-Hut gravity, drag and springs over a [`GraphEngine`].
///
/// Forces are registered as "gravity", "drag" and "spring" and applied in
/// that order.
pub struct ForceLayout<const D: usize> {
    config: LayoutConfig,
    solver: Solver<D>,
}

impl<const D: usize> ForceLayout<D> {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        config.validate()?;

        let mut solver = Solver::new();
        solver.add_body_force(
            "gravity",
            Gravity::new(
                config.theta,
                config.gravity,
                FittedBounds {
                    padding: config.bounds_padding,
                },
            ),
        )?;
        solver.add_body_force("drag", Drag::new(config.drag_coefficient))?;
        solver.add_spring_force(
            "spring",
            SpringForce::new(config.spring_coefficient, config.spring_length),
        )?;

        Ok(Self { config, solver })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn solver(&self) -> &Solver<D> {
        &self.solver
    }

    /// Replace the simulated bodies and springs with `graph`'s nodes and
    /// links, all at rest.
    pub fn load(&mut self, graph: &GraphEngine<D>) -> Result<()> {
        self.solver.load_graph(graph)
    }

    /// Advance by one configured time step.
    pub fn step(&mut self) -> Result<f64> {
        self.solver.step(self.config.time_step)
    }

    /// Step until the metric drops below the configured epsilon or
    /// `max_iterations` steps have run.
    pub fn run(&mut self, max_iterations: usize) -> Result<LayoutReport> {
        let mut report = LayoutReport {
            iterations: 0,
            converged: false,
            last_delta: f64::INFINITY,
        };

        while report.iterations < max_iterations {
            report.last_delta = self.step()?;
            report.iterations += 1;
            if report.last_delta < self.config.convergence_epsilon {
                report.converged = true;
                break;
            }
        }

        if report.converged {
            debug!(iterations = report.iterations, "layout converged");
        } else {
            warn!(
                iterations = report.iterations,
                last_delta = report.last_delta,
                "layout stopped before converging"
            );
        }
        Ok(report)
    }

    /// Copy solved positions back onto the graph's nodes.
    pub fn write_positions(&self, graph: &mut GraphEngine<D>) -> Result<()> {
        for body in self.solver.bodies() {
            graph.set_node_position(body.id, body.position)?;
        }
        Ok(())
    }
}
