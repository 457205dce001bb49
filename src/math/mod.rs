//! Vector math shared by the 2D and 3D layouts.

mod vector;

pub use vector::{Vec2, Vec3, VecN, VectorOps};
