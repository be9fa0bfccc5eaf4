//! Reverse-mode symbolic differentiation over the expression arena.
//!
//! Derivative expressions are appended to the same registry, so they share
//! sub-expressions with the primal graph and with each other.
use crate::analysis::topology;
use crate::store::{ExprRegistry, NodeId, NodeKind, Operation};

/// Symbolic gradient of the scalar `output` with respect to `x[0..n]`.
pub fn gradient(registry: &mut ExprRegistry, output: NodeId, n: usize) -> Vec<NodeId> {
    let adjoints = adjoints(registry, output);
    let zero = registry.constant(0.0);
    let mut grad = vec![zero; n];

    for (i, adj) in adjoints.iter().enumerate() {
        if let (Some(adj), NodeKind::Variable(v)) = (adj, registry.kind(NodeId::new(i))) {
            if let Some(slot) = grad.get_mut(*v as usize) {
                *slot = *adj;
            }
        }
    }
    grad
}

/// Symbolic Jacobian of `outputs`, one row per output (row-major, `m x n`).
pub fn jacobian(registry: &mut ExprRegistry, outputs: &[NodeId], n: usize) -> Vec<Vec<NodeId>> {
    outputs.iter().map(|&row| gradient(registry, row, n)).collect()
}

/// Runs one reverse sweep seeded at `output` and returns the adjoint of
/// every node that existed before the sweep (`None` where it is zero).
fn adjoints(registry: &mut ExprRegistry, output: NodeId) -> Vec<Option<NodeId>> {
    let order = topology::reachable_order(registry, &[output]);
    let mut adj: Vec<Option<NodeId>> = vec![None; registry.count()];
    adj[output.index()] = Some(registry.constant(1.0));

    for &node in order.iter().rev() {
        let Some(bar) = adj[node.index()] else { continue };
        let NodeKind::Formula(op) = *registry.kind(node) else { continue };

        let parents = registry.get_parents(node);
        let a = parents[0];
        let b = parents.get(1).copied().unwrap_or(a);

        match op {
            Operation::Add => {
                accumulate(registry, &mut adj, a, bar);
                accumulate(registry, &mut adj, b, bar);
            }
            Operation::Subtract => {
                accumulate(registry, &mut adj, a, bar);
                let d = registry.neg(bar);
                accumulate(registry, &mut adj, b, d);
            }
            Operation::Multiply => {
                let da = registry.mul(bar, b);
                accumulate(registry, &mut adj, a, da);
                let db = registry.mul(bar, a);
                accumulate(registry, &mut adj, b, db);
            }
            Operation::Divide => {
                // d(a/b)/da = 1/b, d(a/b)/db = -(a/b)/b
                let da = registry.div(bar, b);
                accumulate(registry, &mut adj, a, da);
                let q = registry.div(node, b);
                let t = registry.mul(bar, q);
                let db = registry.neg(t);
                accumulate(registry, &mut adj, b, db);
            }
            Operation::Power => {
                // d(a^b)/da = b * a^(b-1)
                let one = registry.constant(1.0);
                let b_minus_one = registry.sub(b, one);
                let a_pow = registry.pow(a, b_minus_one);
                let local = registry.mul(b, a_pow);
                let da = registry.mul(bar, local);
                accumulate(registry, &mut adj, a, da);

                // d(a^b)/db = a^b * ln(a), skipped for constant exponents
                if registry.kind(b).as_constant().is_none() {
                    let ln_a = registry.log(a);
                    let local = registry.mul(node, ln_a);
                    let db = registry.mul(bar, local);
                    accumulate(registry, &mut adj, b, db);
                }
            }
            Operation::Negate => {
                let da = registry.neg(bar);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Sin => {
                let c = registry.cos(a);
                let da = registry.mul(bar, c);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Cos => {
                let s = registry.sin(a);
                let t = registry.mul(bar, s);
                let da = registry.neg(t);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Tan => {
                // 1 + tan^2
                let one = registry.constant(1.0);
                let sq = registry.square(node);
                let local = registry.add(one, sq);
                let da = registry.mul(bar, local);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Exp => {
                let da = registry.mul(bar, node);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Log => {
                let da = registry.div(bar, a);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Sqrt => {
                let two = registry.constant(2.0);
                let den = registry.mul(two, node);
                let da = registry.div(bar, den);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Tanh => {
                // 1 - tanh^2
                let one = registry.constant(1.0);
                let sq = registry.square(node);
                let local = registry.sub(one, sq);
                let da = registry.mul(bar, local);
                accumulate(registry, &mut adj, a, da);
            }
            Operation::Atan => {
                let one = registry.constant(1.0);
                let sq = registry.square(a);
                let den = registry.add(one, sq);
                let da = registry.div(bar, den);
                accumulate(registry, &mut adj, a, da);
            }
        }
    }

    adj
}

fn accumulate(
    registry: &mut ExprRegistry,
    adj: &mut [Option<NodeId>],
    target: NodeId,
    contribution: NodeId,
) {
    if registry.kind(contribution).as_constant() == Some(0.0) {
        return;
    }
    let slot = &mut adj[target.index()];
    *slot = Some(match *slot {
        Some(existing) => registry.add(existing, contribution),
        None => contribution,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::engine::Engine;
    use approx::assert_relative_eq;

    /// Central finite difference of `output` along `x[j]`.
    fn finite_difference(reg: &ExprRegistry, output: NodeId, x: &[f64], p: &[f64], j: usize) -> f64 {
        let h = 1e-6;
        let mut xp = x.to_vec();
        let mut xm = x.to_vec();
        xp[j] += h;
        xm[j] -= h;
        let fp = Engine::evaluate(reg, &[output], &xp, p, x.len(), p.len()).unwrap()[0];
        let fm = Engine::evaluate(reg, &[output], &xm, p, x.len(), p.len()).unwrap()[0];
        (fp - fm) / (2.0 * h)
    }

    fn assert_gradient_matches(reg: &mut ExprRegistry, output: NodeId, x: &[f64], p: &[f64]) {
        let grad = gradient(reg, output, x.len());
        let values = Engine::evaluate(reg, &grad, x, p, x.len(), p.len()).unwrap();
        for (j, value) in values.iter().enumerate() {
            let expected = finite_difference(reg, output, x, p, j);
            assert_relative_eq!(*value, expected, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_gradient_of_polynomial() {
        // f = x0^2 * x1 + 3 x1
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);
        let x1 = reg.variable(1);
        let two = reg.constant(2.0);
        let three = reg.constant(3.0);
        let sq = reg.pow(x0, two);
        let t1 = reg.mul(sq, x1);
        let t2 = reg.mul(three, x1);
        let f = reg.add(t1, t2);

        let grad = gradient(&mut reg, f, 2);
        let g = Engine::evaluate(&reg, &grad, &[2.0, 5.0], &[], 2, 0).unwrap();
        assert_relative_eq!(g[0], 2.0 * 2.0 * 5.0, epsilon = 1e-12);
        assert_relative_eq!(g[1], 4.0 + 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_of_transcendentals() {
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);
        let x1 = reg.variable(1);
        let x2 = reg.variable(2);
        let p0 = reg.parameter(0);

        let a = reg.sin(x0);
        let b = reg.cos(x1);
        let c = reg.tan(x2);
        let d = reg.exp(a);
        let e = reg.log(x1);
        let f1 = reg.sqrt(x2);
        let g1 = reg.tanh(b);
        let h1 = reg.atan(c);
        let q = reg.div(d, f1);
        let r = reg.pow(x1, x0);
        let s = reg.sub(e, g1);
        let t = reg.mul(h1, p0);
        let u = reg.neg(r);
        let f = reg.sum([q, s, t, u]);

        assert_gradient_matches(&mut reg, f, &[0.3, 1.7, 0.4], &[2.5]);
    }

    #[test]
    fn test_variable_absent_from_expression_has_zero_gradient() {
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);
        let f = reg.square(x0);

        let grad = gradient(&mut reg, f, 3);
        assert_eq!(reg.kind(grad[1]).as_constant(), Some(0.0));
        assert_eq!(reg.kind(grad[2]).as_constant(), Some(0.0));
    }

    #[test]
    fn test_jacobian_rows() {
        // g = [x0 * x1, x1 - p0]
        let mut reg = ExprRegistry::new();
        let x0 = reg.variable(0);
        let x1 = reg.variable(1);
        let p0 = reg.parameter(0);
        let g0 = reg.mul(x0, x1);
        let g1 = reg.sub(x1, p0);

        let jac = jacobian(&mut reg, &[g0, g1], 2);
        let flat: Vec<NodeId> = jac.into_iter().flatten().collect();
        let values = Engine::evaluate(&reg, &flat, &[2.0, 3.0], &[1.0], 2, 1).unwrap();
        assert_eq!(values, vec![3.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parameters_are_not_differentiated() {
        let mut reg = ExprRegistry::new();
        let p0 = reg.parameter(0);
        let x0 = reg.variable(0);
        let f = reg.mul(p0, x0);

        let grad = gradient(&mut reg, f, 1);
        assert_eq!(grad, vec![p0]);
    }
}
