use super::types::*;
use crate::compute::kernel;
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Arena of symbolic expression nodes.
///
/// Parents are always inserted before their children, so ascending `NodeId`
/// order is a topological order of the whole arena.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExprRegistry {
    // Columnar Arrays
    pub kinds: Vec<NodeKind>,

    // Topology (CSR)
    pub parents_flat: Vec<NodeId>,
    pub parents_ranges: Vec<(u32, u32)>, // (start, count)

    // Ephemeral state for structural sharing (Not serialized, rebuilt on load)
    #[serde(skip)]
    interned: HashMap<NodeKey, NodeId>,
}

impl ExprRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.kinds.len() }

    /// Rebuilds the sharing table after deserialization.
    pub fn rebuild_intern_cache(&mut self) {
        self.interned.clear();
        for i in 0..self.count() {
            let id = NodeId::new(i);
            let key = self.key_of(id);
            self.interned.entry(key).or_insert(id);
        }
    }

    #[inline(always)]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.kinds[id.index()]
    }

    #[inline(always)]
    pub fn get_parents(&self, id: NodeId) -> &[NodeId] {
        let (start, count) = self.parents_ranges[id.index()];
        &self.parents_flat[start as usize..start as usize + count as usize]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.count()
    }

    // --- Leaves ---

    pub fn constant(&mut self, value: f64) -> NodeId {
        self.intern(NodeKind::Constant(value), &[])
    }

    pub fn variable(&mut self, index: u32) -> NodeId {
        self.intern(NodeKind::Variable(index), &[])
    }

    pub fn parameter(&mut self, index: u32) -> NodeId {
        self.intern(NodeKind::Parameter(index), &[])
    }

    // --- Formulas ---

    pub fn add(&mut self, a: NodeId, b: NodeId) -> NodeId { self.binary(Operation::Add, a, b) }
    pub fn sub(&mut self, a: NodeId, b: NodeId) -> NodeId { self.binary(Operation::Subtract, a, b) }
    pub fn mul(&mut self, a: NodeId, b: NodeId) -> NodeId { self.binary(Operation::Multiply, a, b) }
    pub fn div(&mut self, a: NodeId, b: NodeId) -> NodeId { self.binary(Operation::Divide, a, b) }
    pub fn pow(&mut self, a: NodeId, b: NodeId) -> NodeId { self.binary(Operation::Power, a, b) }

    pub fn neg(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Negate, a) }
    pub fn sin(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Sin, a) }
    pub fn cos(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Cos, a) }
    pub fn tan(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Tan, a) }
    pub fn exp(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Exp, a) }
    pub fn log(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Log, a) }
    pub fn sqrt(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Sqrt, a) }
    pub fn tanh(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Tanh, a) }
    pub fn atan(&mut self, a: NodeId) -> NodeId { self.unary(Operation::Atan, a) }

    pub fn square(&mut self, a: NodeId) -> NodeId { self.mul(a, a) }

    /// Sum of all terms; an empty sum is the constant `0`.
    pub fn sum(&mut self, terms: impl IntoIterator<Item = NodeId>) -> NodeId {
        let mut iter = terms.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, |acc, t| self.add(acc, t)),
            None => self.constant(0.0),
        }
    }

    pub fn binary(&mut self, op: Operation, a: NodeId, b: NodeId) -> NodeId {
        debug_assert_eq!(op.arity(), 2, "{:?} is not a binary operation", op);
        let ca = self.kind(a).as_constant();
        let cb = self.kind(b).as_constant();

        if let (Some(x), Some(y)) = (ca, cb) {
            return self.constant(kernel::apply(op, x, y));
        }

        match (op, ca, cb) {
            (Operation::Add, Some(z), _) if z == 0.0 => return b,
            (Operation::Add, _, Some(z)) if z == 0.0 => return a,
            (Operation::Subtract, _, Some(z)) if z == 0.0 => return a,
            (Operation::Subtract, Some(z), _) if z == 0.0 => return self.neg(b),
            (Operation::Multiply, Some(z), _) | (Operation::Multiply, _, Some(z)) if z == 0.0 => {
                return self.constant(0.0)
            }
            (Operation::Multiply, Some(o), _) if o == 1.0 => return b,
            (Operation::Multiply, _, Some(o)) if o == 1.0 => return a,
            (Operation::Divide, _, Some(o)) if o == 1.0 => return a,
            (Operation::Divide, Some(z), _) if z == 0.0 => return self.constant(0.0),
            (Operation::Power, _, Some(o)) if o == 1.0 => return a,
            (Operation::Power, _, Some(z)) if z == 0.0 => return self.constant(1.0),
            _ => {}
        }

        self.intern(NodeKind::Formula(op), &[a, b])
    }

    pub fn unary(&mut self, op: Operation, a: NodeId) -> NodeId {
        debug_assert_eq!(op.arity(), 1, "{:?} is not a unary operation", op);
        if let Some(x) = self.kind(a).as_constant() {
            return self.constant(kernel::apply(op, x, 0.0));
        }
        // -(-a) == a
        if op == Operation::Negate {
            if let NodeKind::Formula(Operation::Negate) = self.kind(a) {
                return self.get_parents(a)[0];
            }
        }
        self.intern(NodeKind::Formula(op), &[a])
    }

    // --- Internals ---

    fn key_of(&self, id: NodeId) -> NodeKey {
        match *self.kind(id) {
            NodeKind::Constant(v) => NodeKey::Constant(v.to_bits()),
            NodeKind::Variable(i) => NodeKey::Variable(i),
            NodeKind::Parameter(i) => NodeKey::Parameter(i),
            NodeKind::Formula(op) => {
                let parents = self.get_parents(id);
                NodeKey::Formula(op, parents[0], parents.get(1).copied())
            }
        }
    }

    fn intern(&mut self, kind: NodeKind, parents: &[NodeId]) -> NodeId {
        let key = match kind {
            NodeKind::Constant(v) => NodeKey::Constant(v.to_bits()),
            NodeKind::Variable(i) => NodeKey::Variable(i),
            NodeKind::Parameter(i) => NodeKey::Parameter(i),
            NodeKind::Formula(op) => NodeKey::Formula(op, parents[0], parents.get(1).copied()),
        };
        if let Some(&existing) = self.interned.get(&key) {
            return existing;
        }
        let id = self.push_node(kind, parents);
        self.interned.insert(key, id);
        id
    }

    fn push_node(&mut self, kind: NodeKind, parents: &[NodeId]) -> NodeId {
        let id = NodeId(self.kinds.len() as u32);

        // 1. Parents (CSR append)
        let start = self.parents_flat.len() as u32;
        let count = parents.len() as u32;
        self.parents_flat.extend_from_slice(parents);
        self.parents_ranges.push((start, count));

        // 2. Kind
        self.kinds.push(kind);

        id
    }
}
