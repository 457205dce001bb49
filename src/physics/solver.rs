//! Solver - owns the simulation state and runs one step at a time.
//!
//! A step always runs in the same order:
//! 1. reset every body's force accumulator
//! 2. for each body force, in registration order: `prepare`, then apply to
//!    every body
//! 3. for each spring force, in registration order: apply to every spring
//! 4. integrate and return the convergence metric
//!
//! The solver never loops on its own; callers step until the returned metric
//! drops below their epsilon.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{LayoutError, Result};
use crate::forces::{BodyForceProvider, SpringForceProvider};
use crate::graph::{NodeId, Topology};

use super::integrator::integrate;
use super::{PhysicsBody, Spring};

/// Insertion-ordered forces with unique names.
struct ForceRegistry<T> {
    names: HashSet<String>,
    entries: Vec<(String, T)>,
}

impl<T> ForceRegistry<T> {
    fn new() -> Self {
        Self {
            names: HashSet::new(),
            entries: Vec::new(),
        }
    }

    fn register(&mut self, name: &str, force: T) -> Result<()> {
        if !self.names.insert(name.to_owned()) {
            return Err(LayoutError::ForceAlreadyRegistered(name.to_owned()));
        }
        self.entries.push((name.to_owned(), force));
        Ok(())
    }

    fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Force-directed layout solver over `D`-dimensional bodies.
pub struct Solver<const D: usize> {
    /// Bodies in this simulation.
    bodies: Vec<PhysicsBody<D>>,

    /// Map from stable NodeId to index in `bodies`
    body_index: HashMap<NodeId, usize>,

    /// Springs in this simulation, indexing into `bodies`.
    springs: Vec<Spring>,

    body_forces: ForceRegistry<Box<dyn BodyForceProvider<D>>>,
    spring_forces: ForceRegistry<Box<dyn SpringForceProvider<D>>>,
}

impl<const D: usize> Solver<D> {
    /// Create an empty solver with no bodies and no forces.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            body_index: HashMap::new(),
            springs: Vec::new(),
            body_forces: ForceRegistry::new(),
            spring_forces: ForceRegistry::new(),
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Add a body. Fails if a body with the same id exists or its mass is
    /// not a positive finite number.
    pub fn add_body(&mut self, body: PhysicsBody<D>) -> Result<()> {
        if self.body_index.contains_key(&body.id) {
            return Err(LayoutError::DuplicateNode(body.id));
        }
        if !(body.mass.is_finite() && body.mass > 0.0) {
            return Err(LayoutError::InvalidMass {
                id: body.id,
                mass: body.mass,
            });
        }
        debug!(id = %body.id, position = ?body.position, "adding body");
        self.body_index.insert(body.id, self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Add a spring between two existing bodies.
    pub fn add_spring(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: Option<f64>,
        coefficient: Option<f64>,
    ) -> Result<()> {
        let from_index = self.index_of(from)?;
        let to_index = self.index_of(to)?;
        debug!(%from, %to, ?length, ?coefficient, "adding spring");
        self.springs
            .push(Spring::new(from_index, to_index, length, coefficient));
        Ok(())
    }

    /// Register a body force under a unique name.
    pub fn add_body_force<F>(&mut self, name: &str, force: F) -> Result<()>
    where
        F: BodyForceProvider<D> + 'static,
    {
        self.body_forces.register(name, Box::new(force))
    }

    /// Register a spring force under a unique name.
    pub fn add_spring_force<F>(&mut self, name: &str, force: F) -> Result<()>
    where
        F: SpringForceProvider<D> + 'static,
    {
        self.spring_forces.register(name, Box::new(force))
    }

    /// Replace all bodies and springs with those described by `topology`.
    ///
    /// Each node becomes a body at rest at the node's position; each outgoing
    /// dependency becomes a spring carrying the dependency's length and
    /// stiffness. On error the solver is left untouched.
    pub fn load_graph<T: Topology<D>>(&mut self, topology: &T) -> Result<()> {
        let nodes = topology.topology_nodes();

        let mut bodies = Vec::with_capacity(nodes.len());
        let mut body_index = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            if body_index.insert(node.id, bodies.len()).is_some() {
                return Err(LayoutError::DuplicateNode(node.id));
            }
            bodies.push(PhysicsBody::new(node.id, node.position));
        }

        let mut springs = Vec::new();
        for (from_index, node) in nodes.iter().enumerate() {
            for dependency in topology.dependencies_of(node.id)? {
                let to_index = *body_index
                    .get(&dependency.target)
                    .ok_or(LayoutError::NodeNotFound(dependency.target))?;
                springs.push(Spring::new(
                    from_index,
                    to_index,
                    dependency.length,
                    dependency.coefficient,
                ));
            }
        }

        debug!(bodies = bodies.len(), springs = springs.len(), "loaded graph");
        self.bodies = bodies;
        self.body_index = body_index;
        self.springs = springs;
        Ok(())
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by `time_step` and return the convergence
    /// metric (mean squared step displacement).
    ///
    /// If a force fails, positions and velocities are left as they were.
    pub fn step(&mut self, time_step: f64) -> Result<f64> {
        for body in self.bodies.iter_mut() {
            body.reset();
        }

        for (_, force) in self.body_forces.entries.iter_mut() {
            force.prepare(&self.bodies)?;
            for body in self.bodies.iter_mut() {
                force.apply_body_force(body)?;
            }
        }

        for (_, force) in self.spring_forces.entries.iter() {
            for spring in &self.springs {
                force.apply_spring_force(spring, &mut self.bodies);
            }
        }

        let delta = integrate(&mut self.bodies, time_step);
        trace!(delta, "step");
        Ok(delta)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn bodies(&self) -> &[PhysicsBody<D>] {
        &self.bodies
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Look up a body by node id.
    pub fn body(&self, id: NodeId) -> Option<&PhysicsBody<D>> {
        self.body_index.get(&id).map(|&i| &self.bodies[i])
    }

    /// Names of the registered body forces, in application order.
    pub fn body_force_names(&self) -> Vec<&str> {
        self.body_forces.names()
    }

    /// Names of the registered spring forces, in application order.
    pub fn spring_force_names(&self) -> Vec<&str> {
        self.spring_forces.names()
    }

    fn index_of(&self, id: NodeId) -> Result<usize> {
        self.body_index
            .get(&id)
            .copied()
            .ok_or(LayoutError::NodeNotFound(id))
    }
}

impl<const D: usize> Default for Solver<D> {
    fn default() -> Self {
        Self::new()
    }
}
