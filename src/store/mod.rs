//! Arena storage for symbolic expressions.
pub mod registry;
pub mod types;

pub use registry::ExprRegistry;
pub use types::{NodeId, NodeKind, Operation};
