use super::optimizer::SolveError;
use serde::{Serialize, Deserialize};
use std::time::Duration;

/// Termination and tuning parameters of the PANOC / ALM solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Fixed-point residual tolerance `ε` of the (final) inner problem.
    pub tolerance: f64,
    /// Constraint violation tolerance `δ`.
    pub delta_tolerance: f64,
    /// Inner tolerance of the first ALM iteration; tightened towards `tolerance`.
    pub initial_inner_tolerance: f64,
    pub max_outer_iterations: usize,
    pub max_inner_iterations: usize,
    pub max_duration: Option<Duration>,
    pub lbfgs_memory: usize,
    pub initial_penalty: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            delta_tolerance: 1e-6,
            initial_inner_tolerance: 1e-2,
            max_outer_iterations: 50,
            max_inner_iterations: 500,
            max_duration: None,
            lbfgs_memory: 10,
            initial_penalty: 10.0,
        }
    }
}

impl SolverSettings {
    /// Rejects settings the engine would refuse with a panic.
    pub fn validate(&self) -> Result<(), SolveError> {
        let positive = [
            ("tolerance", self.tolerance),
            ("delta_tolerance", self.delta_tolerance),
            ("initial_inner_tolerance", self.initial_inner_tolerance),
            ("initial_penalty", self.initial_penalty),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolveError::Settings(format!("{} must be positive and finite, got {}", name, value)));
            }
        }
        if self.initial_inner_tolerance < self.tolerance {
            return Err(SolveError::Settings(format!(
                "initial_inner_tolerance ({}) must not be below tolerance ({})",
                self.initial_inner_tolerance, self.tolerance
            )));
        }
        if self.lbfgs_memory == 0 {
            return Err(SolveError::Settings("lbfgs_memory must be at least 1".into()));
        }
        if self.max_outer_iterations == 0 || self.max_inner_iterations == 0 {
            return Err(SolveError::Settings("iteration limits must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SolverSettings::default().validate().is_ok());
    }

    #[rstest]
    #[case(SolverSettings { tolerance: 0.0, ..Default::default() })]
    #[case(SolverSettings { delta_tolerance: f64::NAN, ..Default::default() })]
    #[case(SolverSettings { initial_inner_tolerance: 1e-9, ..Default::default() })]
    #[case(SolverSettings { lbfgs_memory: 0, ..Default::default() })]
    #[case(SolverSettings { max_inner_iterations: 0, ..Default::default() })]
    fn test_invalid_settings(#[case] settings: SolverSettings) {
        assert!(matches!(settings.validate(), Err(SolveError::Settings(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let s: SolverSettings = serde_json::from_str(r#"{"tolerance": 1e-8, "max_duration": {"secs": 2, "nanos": 0}}"#).unwrap();
        assert_eq!(s.tolerance, 1e-8);
        assert_eq!(s.max_duration, Some(Duration::from_secs(2)));
        assert_eq!(s.lbfgs_memory, 10);
    }
}
