//! Force providers.
//!
//! The solver accumulates forces through two kinds of provider:
//! - [`BodyForceProvider`]: prepared once per step with every body, then
//!   applied to each body in turn (gravity, drag)
//! - [`SpringForceProvider`]: applied to each spring, pushing or pulling both
//!   endpoints (Hooke's law)
//!
//! Providers only ever borrow bodies for the duration of a call.

mod drag;
mod gravity;
mod spring;

pub use drag::{Drag, DEFAULT_DRAG_COEFFICIENT};
pub use gravity::Gravity;
pub use spring::SpringForce;

use crate::error::Result;
use crate::physics::{PhysicsBody, Spring};

/// A force acting on bodies individually.
pub trait BodyForceProvider<const D: usize> {
    /// Called once per step before any body is processed.
    fn prepare(&mut self, bodies: &[PhysicsBody<D>]) -> Result<()>;

    /// Add this force's contribution to `body.force`.
    fn apply_body_force(&self, body: &mut PhysicsBody<D>) -> Result<()>;
}

/// A force acting along a spring.
pub trait SpringForceProvider<const D: usize> {
    /// Add this force's contribution to both endpoints of `spring`, which
    /// index into `bodies`.
    fn apply_spring_force(&self, spring: &Spring, bodies: &mut [PhysicsBody<D>]);
}
