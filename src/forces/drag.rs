//! Linear viscous drag, like air resistance.

use crate::error::Result;
use crate::physics::PhysicsBody;

use super::BodyForceProvider;

pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.1;

/// Opposes each body's current velocity: `force -= coefficient · velocity`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub coefficient: f64,
}

impl Drag {
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl Default for Drag {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_COEFFICIENT)
    }
}

impl<const D: usize> BodyForceProvider<D> for Drag {
    fn prepare(&mut self, _bodies: &[PhysicsBody<D>]) -> Result<()> {
        Ok(())
    }

    fn apply_body_force(&self, body: &mut PhysicsBody<D>) -> Result<()> {
        body.force -= body.velocity * self.coefficient;
        Ok(())
    }
}
