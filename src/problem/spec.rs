//! Symbolic problem formulation: `minimize f(x, p)` subject to bounds on
//! `x` and on `g(x, p)`.
use crate::analysis::validation;
use crate::compute::{ComputationError, Engine};
use crate::store::{ExprRegistry, NodeId};
use serde::{Serialize, Deserialize};

/// Builds a [`ProblemSpec`] by growing an expression arena.
///
/// ```
/// use ocp_compiler::problem::ProblemBuilder;
///
/// let mut b = ProblemBuilder::new(2, 1);
/// let x = b.x();
/// let p = b.p();
/// let e = b.expr();
/// let dx = e.sub(x[0], p[0]);
/// let f = e.square(dx);
/// let g = e.add(x[0], x[1]);
/// let spec = b.build(f, vec![g]);
/// assert_eq!(spec.m(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemBuilder {
    registry: ExprRegistry,
    n: usize,
    num_p: usize,
}

impl ProblemBuilder {
    pub fn new(n: usize, num_p: usize) -> Self {
        Self { registry: ExprRegistry::new(), n, num_p }
    }

    /// Symbols for the decision vector `x`.
    pub fn x(&mut self) -> Vec<NodeId> {
        (0..self.n as u32).map(|i| self.registry.variable(i)).collect()
    }

    /// Symbols for the parameter vector `p`.
    pub fn p(&mut self) -> Vec<NodeId> {
        (0..self.num_p as u32).map(|i| self.registry.parameter(i)).collect()
    }

    /// The arena that new expressions are built in.
    pub fn expr(&mut self) -> &mut ExprRegistry {
        &mut self.registry
    }

    pub fn build(self, objective: NodeId, constraints: Vec<NodeId>) -> ProblemSpec {
        ProblemSpec {
            registry: self.registry,
            n: self.n,
            num_p: self.num_p,
            objective,
            constraints,
        }
    }
}

/// Resolved problem dimensions: `x` in R^n, `g(x, p)` in R^m, `p` in R^num_p.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub n: usize,
    pub m: usize,
    pub num_p: usize,
}

/// Immutable symbolic description of an optimization problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemSpec {
    registry: ExprRegistry,
    n: usize,
    num_p: usize,
    objective: NodeId,
    constraints: Vec<NodeId>,
}

impl ProblemSpec {
    pub fn registry(&self) -> &ExprRegistry { &self.registry }
    pub fn n(&self) -> usize { self.n }
    pub fn m(&self) -> usize { self.constraints.len() }
    pub fn num_p(&self) -> usize { self.num_p }
    pub fn objective(&self) -> NodeId { self.objective }
    pub fn constraints(&self) -> &[NodeId] { &self.constraints }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions { n: self.n, m: self.m(), num_p: self.num_p }
    }

    /// Loads a spec saved with `to_json`, rejecting arenas whose structure
    /// is inconsistent.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut spec: ProblemSpec = serde_json::from_str(json)?;
        validation::check_arena(&spec.registry).map_err(<serde_json::Error as serde::de::Error>::custom)?;
        spec.registry.rebuild_intern_cache();
        Ok(spec)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Evaluates `f(x, p)` with the in-process reference evaluator.
    pub fn evaluate_objective(&self, x: &[f64], p: &[f64]) -> Result<f64, ComputationError> {
        let out = Engine::evaluate(&self.registry, &[self.objective], x, p, self.n, self.num_p)?;
        Ok(out[0])
    }

    /// Evaluates `g(x, p)` with the in-process reference evaluator.
    pub fn evaluate_constraints(&self, x: &[f64], p: &[f64]) -> Result<Vec<f64>, ComputationError> {
        Engine::evaluate(&self.registry, &self.constraints, x, p, self.n, self.num_p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rosenbrock() -> ProblemSpec {
        // f = (a - x0)^2 + b (x1 - x0^2)^2, g = [x0 + x1]
        let mut b = ProblemBuilder::new(2, 2);
        let x = b.x();
        let p = b.p();
        let e = b.expr();
        let d0 = e.sub(p[0], x[0]);
        let t0 = e.square(d0);
        let x0sq = e.square(x[0]);
        let d1 = e.sub(x[1], x0sq);
        let sq1 = e.square(d1);
        let t1 = e.mul(p[1], sq1);
        let f = e.add(t0, t1);
        let g = e.add(x[0], x[1]);
        b.build(f, vec![g])
    }

    #[test]
    fn test_dimensions() {
        let spec = rosenbrock();
        assert_eq!((spec.n(), spec.m(), spec.num_p()), (2, 1, 2));
    }

    #[test]
    fn test_reference_evaluation() {
        let spec = rosenbrock();
        assert_eq!(spec.evaluate_objective(&[1.0, 1.0], &[1.0, 100.0]).unwrap(), 0.0);
        assert_eq!(spec.evaluate_objective(&[0.0, 0.0], &[1.0, 100.0]).unwrap(), 1.0);
        assert_eq!(spec.evaluate_constraints(&[0.25, 0.5], &[1.0, 100.0]).unwrap(), vec![0.75]);
    }

    #[test]
    fn test_json_round_trip_preserves_semantics() {
        let spec = rosenbrock();
        let restored = ProblemSpec::from_json(&spec.to_json().unwrap()).unwrap();

        let x = [0.3, -0.7];
        let p = [1.0, 100.0];
        assert_eq!(
            restored.evaluate_objective(&x, &p).unwrap(),
            spec.evaluate_objective(&x, &p).unwrap()
        );
        assert_eq!(restored.m(), spec.m());
    }

    #[test]
    fn test_json_with_broken_topology_is_rejected() {
        let mut value = serde_json::to_value(rosenbrock()).unwrap();
        value["registry"]["parents_ranges"] = serde_json::json!([]);
        assert!(ProblemSpec::from_json(&value.to_string()).is_err());
    }

    #[test]
    fn test_json_with_overflowing_parent_range_is_rejected() {
        let mut value = serde_json::to_value(rosenbrock()).unwrap();
        value["registry"]["parents_ranges"][1] = serde_json::json!([u32::MAX, 1]);
        assert!(ProblemSpec::from_json(&value.to_string()).is_err());
    }
}
