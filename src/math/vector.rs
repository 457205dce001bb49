//! Fixed-dimension vectors used for positions, velocities and forces.
//!
//! `VecN<D>` is nalgebra's statically sized column vector, so 2D and 3D share
//! one code path and the dimensionality is checked at compile time.
//! Arithmetic (`+`, `-`, `* k`, `+=`, `-=`), `norm` and `zeros` come from
//! nalgebra; [`VectorOps`] adds the layout-specific operations on top.

use nalgebra::SVector;

/// A point or direction in `D`-dimensional space.
pub type VecN<const D: usize> = SVector<f64, D>;

/// 2D vector.
pub type Vec2 = VecN<2>;

/// 3D vector.
pub type Vec3 = VecN<3>;

/// Layout operations over [`VecN`].
pub trait VectorOps: Sized {
    /// Multiply every component by `k`.
    fn scale_in_place(&mut self, k: f64) -> &mut Self;

    /// Component-wise product with `other`.
    fn multiply_in_place(&mut self, other: &Self) -> &mut Self;

    /// Euclidean distance between `self` and `other`.
    fn distance_from(&self, other: &Self) -> f64;

    /// Unit vector `(self - other) / |self - other|`.
    ///
    /// Points away from `other`. Produces non-finite components when the two
    /// points coincide.
    fn normalized_direction_to(&self, other: &Self) -> Self;

    /// True when every component lies in `[center - half, center + half]`.
    fn contained_by(&self, center: &Self, half_distance: f64) -> bool;

    /// Zero every component.
    fn reset(&mut self);

    /// True when every component is finite.
    fn is_finite(&self) -> bool;
}

impl<const D: usize> VectorOps for VecN<D> {
    #[inline]
    fn scale_in_place(&mut self, k: f64) -> &mut Self {
        *self *= k;
        self
    }

    #[inline]
    fn multiply_in_place(&mut self, other: &Self) -> &mut Self {
        self.component_mul_assign(other);
        self
    }

    #[inline]
    fn distance_from(&self, other: &Self) -> f64 {
        (self - other).norm()
    }

    #[inline]
    fn normalized_direction_to(&self, other: &Self) -> Self {
        let delta = self - other;
        delta / delta.norm()
    }

    fn contained_by(&self, center: &Self, half_distance: f64) -> bool {
        self.iter()
            .zip(center.iter())
            .all(|(&c, &mid)| c >= mid - half_distance && c <= mid + half_distance)
    }

    #[inline]
    fn reset(&mut self) {
        self.fill(0.0);
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }
}
