//! Hooke's law springs.
//!
//! The separation is measured between velocity-projected endpoints
//! (`position + velocity`) rather than raw positions:
//!
//! ```text
//! d       = (to.pos + to.vel) - (from.pos + from.vel)
//! stretch = (|d| - rest_length) / |d|
//! from.force += coefficient · stretch · d
//! to.force   -= coefficient · stretch · d
//! ```
//!
//! Coincident projected endpoints (`|d| = 0`) produce non-finite forces.

use crate::physics::{PhysicsBody, Spring};

use super::SpringForceProvider;

/// Spring force with defaults for springs that carry no length/stiffness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringForce {
    /// Stiffness used when a spring has none. Higher is stiffer.
    pub default_coefficient: f64,
    /// Equilibrium length used when a spring has none.
    pub default_length: f64,
}

impl SpringForce {
    pub fn new(default_coefficient: f64, default_length: f64) -> Self {
        Self {
            default_coefficient,
            default_length,
        }
    }
}

impl<const D: usize> SpringForceProvider<D> for SpringForce {
    fn apply_spring_force(&self, spring: &Spring, bodies: &mut [PhysicsBody<D>]) {
        let source = &bodies[spring.from];
        let target = &bodies[spring.to];

        let delta = (target.position + target.velocity) - (source.position + source.velocity);

        let distance = delta.norm();
        let rest_length = spring.rest_length_or(self.default_length);
        let stretch = (distance - rest_length) / distance;
        let pull = delta * (spring.coefficient_or(self.default_coefficient) * stretch);

        bodies[spring.from].force += pull;
        bodies[spring.to].force -= pull;
    }
}
