//! Defines the error types for the code generation module.
use crate::problem::Dimensions;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The expression reads a vector component the declared dimensions do not have.
    #[error("Dimension mismatch: node {node} reads {what}[{index}] but dim({what}) = {dim}")]
    IndexOutOfRange { node: usize, what: &'static str, index: u32, dim: usize },
    #[error("Node {0} is not part of the expression arena")]
    UnknownNode(usize),
    #[error("Node {node} holds a non-finite constant ({value}) that cannot be emitted")]
    NonFiniteConstant { node: usize, value: f64 },
    #[error("Malformed expression arena at node {node}: {msg}")]
    MalformedArena { node: usize, msg: String },
    #[error("Generated dimensions {resolved:?} differ from the declared {declared:?}")]
    DimensionMismatch { declared: Dimensions, resolved: Dimensions },
    #[error("Invalid problem name '{0}': must be a C identifier")]
    InvalidName(String),
}
