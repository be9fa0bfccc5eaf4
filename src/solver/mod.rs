//! Solves a loaded problem with PANOC, or an augmented Lagrangian method
//! around PANOC when `g` is present.
pub mod optimizer;
pub mod settings;
pub mod stats;

pub use optimizer::{solve, Solution, SolveError};
pub use settings::SolverSettings;
pub use stats::{InnerStats, SolverStats, SolverStatus};
