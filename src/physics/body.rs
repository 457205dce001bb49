//! Per-node simulation state.
//!
//! A body has:
//! - The stable identifier of the graph node it simulates
//! - Position, velocity and a per-step force accumulator
//! - Mass (defaults to 1)

use crate::graph::NodeId;
use crate::math::{VecN, VectorOps};

/// Mass given to bodies that do not specify one.
pub const DEFAULT_BODY_MASS: f64 = 1.0;

/// Simulation state of a single graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody<const D: usize> {
    pub id: NodeId,
    pub position: VecN<D>,
    pub velocity: VecN<D>,
    /// Zeroed at the start of every step, read by the integrator.
    pub force: VecN<D>,
    /// Positive and finite. [`Solver::add_body`](super::Solver::add_body)
    /// rejects anything else.
    pub mass: f64,
}

impl<const D: usize> PhysicsBody<D> {
    /// Create a body at rest at `position`.
    pub fn new(id: NodeId, position: VecN<D>) -> Self {
        Self {
            id,
            position,
            velocity: VecN::zeros(),
            force: VecN::zeros(),
            mass: DEFAULT_BODY_MASS,
        }
    }

    /// Builder-style mass override.
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Builder-style velocity override.
    pub fn with_velocity(mut self, velocity: VecN<D>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Clear the force accumulator.
    #[inline]
    pub fn reset(&mut self) {
        self.force.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;

    #[test]
    fn test_new_body_is_at_rest() {
        let body = PhysicsBody::new(NodeId(3), Vec2::new(1.0, 2.0));
        assert_eq!(body.velocity, Vec2::zeros());
        assert_eq!(body.force, Vec2::zeros());
        assert_eq!(body.mass, DEFAULT_BODY_MASS);
    }

    #[test]
    fn test_reset_only_clears_force() {
        let mut body = PhysicsBody::new(NodeId(1), Vec2::new(1.0, 1.0))
            .with_velocity(Vec2::new(0.5, 0.5))
            .with_mass(2.0);
        body.force = Vec2::new(3.0, -3.0);

        body.reset();

        assert_eq!(body.force, Vec2::zeros());
        assert_eq!(body.velocity, Vec2::new(0.5, 0.5));
        assert_eq!(body.position, Vec2::new(1.0, 1.0));
        assert_eq!(body.mass, 2.0);
    }
}
