//! Problem formulation, bounds and the loaded (compiled) problem handle.
pub mod bounds;
pub mod loaded;
pub mod spec;

pub use bounds::{BoundsConfig, BoxBounds, ConfigError};
pub use loaded::{EvalError, LoadedProblem};
pub use spec::{Dimensions, ProblemBuilder, ProblemSpec};
