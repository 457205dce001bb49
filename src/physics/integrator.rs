//! Semi-implicit Euler integration.
//!
//! Velocity is updated from the accumulated force first, clamped to unit
//! speed, and the new velocity then moves the body. The returned value is the
//! squared total absolute displacement divided by the body count, which the
//! caller compares against an epsilon to detect a settled layout.

use super::PhysicsBody;
use crate::math::{VecN, VectorOps};

/// Speed above which velocity is rescaled to unit length.
pub const MAX_SPEED: f64 = 1.0;

/// Advance every body by `time_step` and return the convergence metric.
///
/// Returns `0.0` for an empty body set.
pub fn integrate<const D: usize>(bodies: &mut [PhysicsBody<D>], time_step: f64) -> f64 {
    if bodies.is_empty() {
        return 0.0;
    }

    let mut total = VecN::<D>::zeros();

    for body in bodies.iter_mut() {
        let coeff = time_step / body.mass;
        let force = body.force;
        body.velocity += force * coeff;

        let speed = body.velocity.norm();
        if speed > MAX_SPEED {
            body.velocity.scale_in_place(1.0 / speed);
        }

        let displacement = body.velocity * time_step;
        body.position += displacement;

        total += displacement.abs();
    }

    total.norm_squared() / bodies.len() as f64
}
