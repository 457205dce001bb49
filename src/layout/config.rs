//! Layout configuration.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Tuning knobs for [`ForceLayout`](super::ForceLayout).
///
/// Every field is optional when deserializing; missing fields take the
/// default below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Barnes-Hut opening threshold (default: 0.75).
    pub theta: f64,
    /// Gravitational constant, positive repels (default: 1.0).
    pub gravity: f64,
    /// Drag coefficient (default: 0.1).
    pub drag_coefficient: f64,
    /// Stiffness for links without one (default: 0.9).
    pub spring_coefficient: f64,
    /// Rest length for links without one (default: 10.0).
    pub spring_length: f64,
    /// Seconds per step (default: 3/60).
    pub time_step: f64,
    /// A step whose metric falls below this counts as converged (default: 1e-6).
    pub convergence_epsilon: f64,
    /// Iteration cap for a full run (default: 5000).
    pub max_iterations: usize,
    /// Growth factor for the fitted Barnes-Hut root square (default: 1.1).
    pub bounds_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            theta: 0.75,
            gravity: 1.0,
            drag_coefficient: 0.1,
            spring_coefficient: 0.9,
            spring_length: 10.0,
            time_step: 3.0 / 60.0,
            convergence_epsilon: 1e-6,
            max_iterations: 5000,
            bounds_padding: 1.1,
        }
    }
}

impl LayoutConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("theta", self.theta),
            ("gravity", self.gravity),
            ("dragCoefficient", self.drag_coefficient),
            ("springCoefficient", self.spring_coefficient),
            ("springLength", self.spring_length),
            ("timeStep", self.time_step),
            ("convergenceEpsilon", self.convergence_epsilon),
            ("boundsPadding", self.bounds_padding),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return invalid(format!("{name} must be finite, got {value}"));
        }

        if self.theta < 0.0 {
            return invalid(format!("theta must not be negative, got {}", self.theta));
        }
        if self.drag_coefficient < 0.0 {
            return invalid(format!(
                "dragCoefficient must not be negative, got {}",
                self.drag_coefficient
            ));
        }

        let positive = [
            ("springCoefficient", self.spring_coefficient),
            ("springLength", self.spring_length),
            ("timeStep", self.time_step),
            ("convergenceEpsilon", self.convergence_epsilon),
            ("boundsPadding", self.bounds_padding),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return invalid(format!("{name} must be positive, got {value}"));
        }

        Ok(())
    }
}

fn invalid(message: String) -> Result<()> {
    Err(LayoutError::InvalidConfig(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        LayoutConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LayoutConfig =
            serde_json::from_str(r#"{ "theta": 0.5, "springLength": 30 }"#).unwrap();

        assert_eq!(config.theta, 0.5);
        assert_eq!(config.spring_length, 30.0);
        assert_eq!(config.drag_coefficient, 0.1);
        assert_eq!(config.max_iterations, 5000);
    }

    #[test]
    fn test_round_trip_uses_camel_case() {
        let json = serde_json::to_value(LayoutConfig::default()).unwrap();
        assert_eq!(json["dragCoefficient"], 0.1);
        assert_eq!(json["maxIterations"], 5000);
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            LayoutConfig { theta: -0.1, ..Default::default() },
            LayoutConfig { drag_coefficient: -1.0, ..Default::default() },
            LayoutConfig { time_step: 0.0, ..Default::default() },
            LayoutConfig { spring_length: -10.0, ..Default::default() },
            LayoutConfig { convergence_epsilon: 0.0, ..Default::default() },
            LayoutConfig { gravity: f64::NAN, ..Default::default() },
            LayoutConfig { bounds_padding: f64::INFINITY, ..Default::default() },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(LayoutError::InvalidConfig(_))),
                "accepted {config:?}"
            );
        }
    }

    #[test]
    fn test_zero_theta_and_negative_gravity_are_allowed() {
        let config = LayoutConfig { theta: 0.0, gravity: -2.0, ..Default::default() };
        config.validate().unwrap();
    }
}
