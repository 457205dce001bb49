//! Tree-approximated universal gravitation.
//!
//! `F = G · m₁ · m₂ / r²`, applied along the unit vector pointing from the
//! other mass toward the body. With that direction a positive `G` pushes
//! bodies apart (node separation in layouts) and a negative `G` pulls them
//! together.

use crate::error::Result;
use crate::math::VecN;
use crate::physics::PhysicsBody;
use crate::spatial::{BarnesHutTree, TreeBuilder};

use super::BodyForceProvider;

/// Gravity between every pair of bodies, approximated with a Barnes-Hut tree.
///
/// The tree is rebuilt by `builder` in every [`BodyForceProvider::prepare`];
/// a tree from a previous step is never reused.
pub struct Gravity<const D: usize, B: TreeBuilder<D>> {
    /// Barnes-Hut opening threshold. 0 is exact, larger is faster.
    pub theta: f64,
    /// Gravitational constant `G`.
    pub gravity: f64,
    builder: B,
    tree: Option<BarnesHutTree<D>>,
}

impl<const D: usize, B: TreeBuilder<D>> Gravity<D, B> {
    pub fn new(theta: f64, gravity: f64, builder: B) -> Self {
        Self {
            theta,
            gravity,
            builder,
            tree: None,
        }
    }

    /// The tree built by the last `prepare`.
    pub fn tree(&self) -> Option<&BarnesHutTree<D>> {
        self.tree.as_ref()
    }
}

impl<const D: usize, B: TreeBuilder<D>> BodyForceProvider<D> for Gravity<D, B> {
    fn prepare(&mut self, bodies: &[PhysicsBody<D>]) -> Result<()> {
        self.tree = Some(self.builder.build(bodies)?);
        Ok(())
    }

    fn apply_body_force(&self, body: &mut PhysicsBody<D>) -> Result<()> {
        let Some(tree) = &self.tree else {
            return Ok(());
        };

        let own_mass = body.mass;
        let mut force = VecN::<D>::zeros();
        tree.visit_forces_for_body(body, self.theta, |mass, direction, distance| {
            let magnitude = self.gravity * (own_mass * mass) / (distance * distance);
            force += direction * magnitude;
        })?;

        body.force += force;
        Ok(())
    }
}
