use crate::store::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("Input mismatch: {what} has length {got}, expected {expected}")]
    InputMismatch { what: &'static str, expected: usize, got: usize },
    #[error("Node {node} reads {what}[{index}], which is out of range")]
    IndexOutOfRange { node: usize, what: &'static str, index: u32 },
    #[error("Node {0} is not part of the expression arena")]
    UnknownNode(usize),
}

/// Dense value storage, one slot per arena node.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: Vec<f64>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn ensure_capacity(&mut self, size: usize) {
        if self.values.len() < size {
            self.values.resize(size, 0.0);
        }
    }

    #[inline(always)]
    pub fn get(&self, node_id: NodeId) -> f64 {
        self.values[node_id.index()]
    }

    #[inline(always)]
    pub fn insert(&mut self, node_id: NodeId, value: f64) {
        self.values[node_id.index()] = value;
    }
}
