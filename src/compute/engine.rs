//! In-process reference evaluator for symbolic expressions.
use crate::analysis::topology;
use crate::compute::kernel;
use crate::compute::ledger::{ComputationError, Ledger};
use crate::store::{ExprRegistry, NodeId, NodeKind};

pub struct Engine;

impl Engine {
    /// Evaluates `outputs` at the point `(x, p)`.
    ///
    /// `n` and `num_p` are the declared dimensions; the slices must match
    /// them exactly.
    pub fn evaluate(
        registry: &ExprRegistry,
        outputs: &[NodeId],
        x: &[f64],
        p: &[f64],
        n: usize,
        num_p: usize,
    ) -> Result<Vec<f64>, ComputationError> {
        // 1. Security Barrier: validate inputs once so the loop can index freely.
        if x.len() != n {
            return Err(ComputationError::InputMismatch { what: "x", expected: n, got: x.len() });
        }
        if p.len() != num_p {
            return Err(ComputationError::InputMismatch { what: "p", expected: num_p, got: p.len() });
        }
        if let Some(bad) = outputs.iter().find(|id| !registry.contains(**id)) {
            return Err(ComputationError::UnknownNode(bad.index()));
        }

        // 2. Hot Loop over the reachable sub-graph in dependency order.
        let order = topology::reachable_order(registry, outputs);
        let mut ledger = Ledger::new();
        ledger.ensure_capacity(order.last().map_or(0, |id| id.index() + 1));

        for &node in &order {
            let value = match *registry.kind(node) {
                NodeKind::Constant(v) => v,
                NodeKind::Variable(i) => *x.get(i as usize).ok_or(ComputationError::IndexOutOfRange {
                    node: node.index(),
                    what: "x",
                    index: i,
                })?,
                NodeKind::Parameter(i) => *p.get(i as usize).ok_or(ComputationError::IndexOutOfRange {
                    node: node.index(),
                    what: "p",
                    index: i,
                })?,
                NodeKind::Formula(op) => {
                    let parents = registry.get_parents(node);
                    let a = ledger.get(parents[0]);
                    let b = parents.get(1).map_or(0.0, |&id| ledger.get(id));
                    kernel::apply(op, a, b)
                }
            };
            ledger.insert(node, value);
        }

        Ok(outputs.iter().map(|&id| ledger.get(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluates_shared_subexpressions() {
        // f = sin(x0) * p0 + sin(x0)
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);
        let p0 = reg.parameter(0);
        let s = reg.sin(x0);
        let sp = reg.mul(s, p0);
        let f = reg.add(sp, s);

        let out = Engine::evaluate(&reg, &[f, s], &[0.5], &[2.0], 1, 1).unwrap();
        assert_relative_eq!(out[0], 3.0 * 0.5f64.sin(), epsilon = 1e-15);
        assert_relative_eq!(out[1], 0.5f64.sin(), epsilon = 1e-15);
    }

    #[test]
    fn test_engine_detects_input_mismatch() {
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);

        let err = Engine::evaluate(&reg, &[x0], &[1.0, 2.0], &[], 1, 0).unwrap_err();
        assert_eq!(err, ComputationError::InputMismatch { what: "x", expected: 1, got: 2 });
    }

    #[test]
    fn test_engine_detects_out_of_range_variable() {
        // Declared n = 1 but the expression reads x[3].
        let mut reg = ExprRegistry::new();
        let x3 = reg.variable(3);

        let err = Engine::evaluate(&reg, &[x3], &[1.0], &[], 1, 0).unwrap_err();
        assert!(matches!(err, ComputationError::IndexOutOfRange { what: "x", index: 3, .. }));
    }

    #[test]
    fn test_engine_rejects_foreign_node() {
        let reg = ExprRegistry::new();
        let err = Engine::evaluate(&reg, &[NodeId::new(7)], &[], &[], 0, 0).unwrap_err();
        assert_eq!(err, ComputationError::UnknownNode(7));
    }
}
