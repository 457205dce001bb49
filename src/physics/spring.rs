//! Springs connect two bodies of the solver's body store.

/// A spring between `from` and `to`, both indices into the solver's bodies.
///
/// `length` is the equilibrium length and `coefficient` the stiffness. When
/// either is absent or non-positive the spring force provider's default is
/// used instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub from: usize,
    pub to: usize,
    pub length: Option<f64>,
    pub coefficient: Option<f64>,
}

impl Spring {
    pub fn new(from: usize, to: usize, length: Option<f64>, coefficient: Option<f64>) -> Self {
        Self {
            from,
            to,
            length,
            coefficient,
        }
    }

    /// Rest length, falling back to `default` when unset or non-positive.
    #[inline]
    pub fn rest_length_or(&self, default: f64) -> f64 {
        positive_or(self.length, default)
    }

    /// Stiffness, falling back to `default` when unset or non-positive.
    #[inline]
    pub fn coefficient_or(&self, default: f64) -> f64 {
        positive_or(self.coefficient, default)
    }
}

#[inline]
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v > 0.0 => v,
        _ => default,
    }
}
