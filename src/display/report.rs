use crate::solver::SolverStats;
use std::fmt::Write;

/// The one-line status summary, e.g.
/// `Converged - 'δ': 0.0000001 - 'ε': 0.000001 - outer its. 4`.
pub fn format_solver_stats(stats: &SolverStats) -> String {
    stats.to_string()
}

/// Writes `format_solver_stats` to stdout.
pub fn print_solver_stats(stats: &SolverStats) {
    println!("{}", format_solver_stats(stats));
}

/// Multi-line variant including timing and inner iterations.
pub fn format_solver_summary(stats: &SolverStats) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Solver status:        {}", stats.status);
    let _ = writeln!(output, "Elapsed time:         {:.6} s", stats.elapsed_time);
    let _ = writeln!(output, "Nb. outer iterations: {}", stats.outer_iterations);
    let _ = writeln!(output, "Nb. inner iterations: {}", stats.inner.iterations);
    let _ = writeln!(output, "Objective:            {:.6e}", stats.objective);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{InnerStats, SolverStatus};

    fn stats() -> SolverStats {
        SolverStats {
            status: SolverStatus::MaxIter,
            delta: 0.5,
            epsilon: 0.001,
            outer_iterations: 50,
            inner: InnerStats { iterations: 1200 },
            elapsed_time: 1.5,
            objective: 42.0,
        }
    }

    #[test]
    fn test_one_line_report() {
        assert_eq!(format_solver_stats(&stats()), "MaxIter - 'δ': 0.5 - 'ε': 0.001 - outer its. 50");
    }

    #[test]
    fn test_summary_lists_iterations() {
        let summary = format_solver_summary(&stats());
        assert_eq!(summary.lines().count(), 5);
        assert!(summary.contains("Nb. inner iterations: 1200"));
        assert!(summary.contains("Elapsed time:         1.500000 s"));
    }
}
