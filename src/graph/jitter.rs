//! Nudging apart nodes that share a position.
//!
//! The Barnes-Hut tree refuses two bodies at the same point, so graphs built
//! with default positions need separating before a gravity step.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::GraphEngine;
use crate::error::{LayoutError, Result};
use crate::math::{VecN, VectorOps};

/// Position key with `-0.0` folded into `0.0`.
fn position_key<const D: usize>(position: &VecN<D>) -> [u64; D] {
    let mut key = [0u64; D];
    for (axis, value) in position.iter().enumerate() {
        key[axis] = if *value == 0.0 { 0 } else { value.to_bits() };
    }
    key
}

/// Draws per node before the magnitude is declared too small to separate it.
const MAX_JITTER_ATTEMPTS: usize = 64;

impl<const D: usize> GraphEngine<D> {
    /// Offset every node whose position repeats an earlier node's by a random
    /// amount in `[-magnitude, magnitude]` per axis.
    ///
    /// The same seed always produces the same layout. Returns how many nodes
    /// were moved. Fails without moving anything when a position is not
    /// finite, or when the offsets vanish in rounding at the nodes'
    /// coordinates.
    pub fn separate_coincident(&mut self, seed: u64, magnitude: f64) -> Result<usize> {
        if !(magnitude.is_finite() && magnitude > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "jitter magnitude must be positive, got {magnitude}"
            )));
        }

        let ids = self.node_ids();
        let positions = self.positions_mut();
        if let Some(index) = positions.iter().position(|position| !position.is_finite()) {
            return Err(LayoutError::InvalidConfig(format!(
                "{} has a non-finite position",
                ids[index]
            )));
        }

        let original = positions.to_vec();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut moved = 0;

        for index in 0..positions.len() {
            if seen.insert(position_key(&positions[index])) {
                continue;
            }

            let origin = positions[index];
            let mut separated = false;
            for _ in 0..MAX_JITTER_ATTEMPTS {
                let position = &mut positions[index];
                for axis in 0..D {
                    position[axis] = origin[axis] + rng.gen_range(-magnitude..=magnitude);
                }
                if seen.insert(position_key(position)) {
                    separated = true;
                    break;
                }
            }

            if !separated {
                positions.copy_from_slice(&original);
                return Err(LayoutError::InvalidConfig(format!(
                    "jitter magnitude {magnitude} is too small to separate {} at {:?}",
                    ids[index],
                    origin.as_slice()
                )));
            }
            moved += 1;
        }

        debug!(moved, seed, "separated coincident nodes");
        Ok(moved)
    }
}
