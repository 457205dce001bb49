//! Tree-construction strategies.
//!
//! A gravity force rebuilds its Barnes-Hut tree every step from the current
//! bodies. How big the root square is gets decided here:
//! - [`FixedBounds`]: a caller-chosen square, bodies outside it are an error
//! - [`FittedBounds`]: the smallest square around all bodies, grown by a
//!   padding factor
//! - any closure `Fn(&[PhysicsBody<D>]) -> Result<BarnesHutTree<D>>`

use crate::error::Result;
use crate::math::{VecN, VectorOps};
use crate::physics::PhysicsBody;

use super::BarnesHutTree;

/// Builds a fresh, fully populated tree from the current bodies.
pub trait TreeBuilder<const D: usize> {
    fn build(&self, bodies: &[PhysicsBody<D>]) -> Result<BarnesHutTree<D>>;
}

impl<const D: usize, F> TreeBuilder<D> for F
where
    F: Fn(&[PhysicsBody<D>]) -> Result<BarnesHutTree<D>>,
{
    fn build(&self, bodies: &[PhysicsBody<D>]) -> Result<BarnesHutTree<D>> {
        self(bodies)
    }
}

/// Root square with a fixed center and half-side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBounds<const D: usize> {
    pub center: VecN<D>,
    pub half_distance: f64,
}

impl<const D: usize> FixedBounds<D> {
    pub fn new(center: VecN<D>, half_distance: f64) -> Self {
        Self {
            center,
            half_distance,
        }
    }
}

impl<const D: usize> TreeBuilder<D> for FixedBounds<D> {
    fn build(&self, bodies: &[PhysicsBody<D>]) -> Result<BarnesHutTree<D>> {
        let mut tree = BarnesHutTree::new(self.center, self.half_distance);
        tree.insert_all(bodies)?;
        Ok(tree)
    }
}

/// Root square fitted around the bodies each step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedBounds {
    /// Multiplier applied to the tight half-side, at least 1.
    pub padding: f64,
}

impl Default for FittedBounds {
    fn default() -> Self {
        Self { padding: 1.1 }
    }
}

impl<const D: usize> TreeBuilder<D> for FittedBounds {
    fn build(&self, bodies: &[PhysicsBody<D>]) -> Result<BarnesHutTree<D>> {
        let (center, half_distance) = bounding_square(bodies).unwrap_or((VecN::zeros(), 1.0));
        let half_distance = if half_distance > 0.0 {
            half_distance * self.padding.max(1.0)
        } else {
            1.0
        };
        let half_distance = widen_to_enclose(bodies, &center, half_distance);

        let mut tree = BarnesHutTree::new(center, half_distance);
        tree.insert_all(bodies)?;
        Ok(tree)
    }
}

/// Smallest axis-aligned square (cube in 3D) enclosing every body.
///
/// Returns `(center, half_distance)`, or `None` when there are no bodies.
pub fn bounding_square<const D: usize>(bodies: &[PhysicsBody<D>]) -> Option<(VecN<D>, f64)> {
    if bodies.is_empty() {
        return None;
    }

    let mut min = VecN::from([f64::INFINITY; D]);
    let mut max = VecN::from([f64::NEG_INFINITY; D]);
    for body in bodies {
        for axis in 0..D {
            min[axis] = min[axis].min(body.position[axis]);
            max[axis] = max[axis].max(body.position[axis]);
        }
    }

    let mut center = VecN::zeros();
    for axis in 0..D {
        center[axis] = (min[axis] + max[axis]) * 0.5;
    }
    let mut half_distance = 0.0f64;
    for axis in 0..D {
        half_distance = half_distance
            .max(max[axis] - center[axis])
            .max(center[axis] - min[axis]);
    }

    Some((center, half_distance))
}

/// Upper bound on widening rounds in [`widen_to_enclose`].
const MAX_WIDENING_STEPS: usize = 64;

/// Grow `half_distance` by a few ulps at a time until every body passes
/// `contained_by(center, half_distance)`.
///
/// Rounding in `center ± half_distance` can leave the extreme bodies just
/// outside an otherwise tight square. Non-finite positions never fit and
/// are left for the tree to report.
fn widen_to_enclose<const D: usize>(bodies: &[PhysicsBody<D>], center: &VecN<D>, half_distance: f64) -> f64 {
    let scale = center.amax();
    let mut half_distance = half_distance;
    for _ in 0..MAX_WIDENING_STEPS {
        if bodies.iter().all(|body| body.position.contained_by(center, half_distance)) {
            break;
        }
        half_distance += (half_distance + scale) * f64::EPSILON * 2.0;
    }
    half_distance
}
