//! Link type and identifiers.
//!
//! Links are directed dependencies between nodes. During layout each link
//! becomes a spring from its source to its target.

use std::fmt;

/// Stable link identifier, assigned in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Spring parameters carried by a link.
///
/// Unset (or non-positive) values fall back to the spring force's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Link {
    /// Rest length of the spring.
    pub length: Option<f64>,
    /// Spring stiffness.
    pub coefficient: Option<f64>,
}

impl Link {
    pub fn new(length: Option<f64>, coefficient: Option<f64>) -> Self {
        Self {
            length,
            coefficient,
        }
    }
}
