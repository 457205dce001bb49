//! Physics simulation state and stepping.
//!
//! - [`PhysicsBody`] / [`Spring`]: the simulated objects
//! - [`integrate`]: semi-implicit Euler step with speed clamping
//! - [`Solver`]: owns bodies, springs and registered forces

mod body;
mod integrator;
mod solver;
mod spring;

pub use body::{PhysicsBody, DEFAULT_BODY_MASS};
pub use integrator::{integrate, MAX_SPEED};
pub use solver::Solver;
pub use spring::Spring;
