use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Defines the calculation performed by a `Formula` node.
///
/// Binary operations read `parents[0]` and `parents[1]` in that order;
/// unary operations read `parents[0]` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Negate,
    Sin,
    Cos,
    Tan,
    Exp,
    Log,
    Sqrt,
    Tanh,
    Atan,
}

impl Operation {
    pub fn arity(&self) -> usize {
        match self {
            Operation::Add
            | Operation::Subtract
            | Operation::Multiply
            | Operation::Divide
            | Operation::Power => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Constant(f64),
    /// Component `i` of the decision vector `x`.
    Variable(u32),
    /// Component `i` of the parameter vector `p`.
    Parameter(u32),
    Formula(Operation),
}

impl NodeKind {
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            NodeKind::Constant(v) => Some(*v),
            _ => None,
        }
    }
}

/// Hashable identity of a node, used for structural sharing.
/// Constants are keyed on their bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Constant(u64),
    Variable(u32),
    Parameter(u32),
    Formula(Operation, NodeId, Option<NodeId>),
}
