//! Solver result record and its one-line rendering.
use optimization_engine::core::ExitStatus;
use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    Converged,
    MaxIter,
    MaxTime,
}

impl From<ExitStatus> for SolverStatus {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Converged => SolverStatus::Converged,
            ExitStatus::NotConvergedIterations => SolverStatus::MaxIter,
            ExitStatus::NotConvergedOutOfTime => SolverStatus::MaxTime,
        }
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverStatus::Converged => "Converged",
            SolverStatus::MaxIter => "MaxIter",
            SolverStatus::MaxTime => "MaxTime",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerStats {
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverStats {
    pub status: SolverStatus,
    /// Largest violation of `g(x, p) in D` at the returned point.
    #[serde(rename = "δ")]
    pub delta: f64,
    /// Fixed-point residual of the last inner problem.
    #[serde(rename = "ε")]
    pub epsilon: f64,
    pub outer_iterations: usize,
    pub inner: InnerStats,
    /// Seconds.
    pub elapsed_time: f64,
    pub objective: f64,
}

impl fmt::Display for SolverStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - 'δ': {} - 'ε': {} - outer its. {}",
            self.status, self.delta, self.epsilon, self.outer_iterations
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SolverStats {
        SolverStats {
            status: SolverStatus::Converged,
            delta: 1e-7,
            epsilon: 2.5e-9,
            outer_iterations: 4,
            inner: InnerStats { iterations: 57 },
            elapsed_time: 0.0125,
            objective: 3.5,
        }
    }

    #[test]
    fn test_display_line() {
        assert_eq!(stats().to_string(), "Converged - 'δ': 0.0000001 - 'ε': 0.0000000025 - outer its. 4");
    }

    #[test]
    fn test_json_keys() {
        let value = serde_json::to_value(stats()).unwrap();
        assert_eq!(value["status"], "Converged");
        assert_eq!(value["δ"], 1e-7);
        assert_eq!(value["ε"], 2.5e-9);
        assert_eq!(value["outer_iterations"], 4);
        assert_eq!(value["inner"]["iterations"], 57);
        assert_eq!(value["elapsed_time"], 0.0125);
    }

    #[test]
    fn test_exit_status_mapping() {
        assert_eq!(SolverStatus::from(ExitStatus::NotConvergedIterations), SolverStatus::MaxIter);
        assert_eq!(SolverStatus::from(ExitStatus::NotConvergedOutOfTime).to_string(), "MaxTime");
    }
}
