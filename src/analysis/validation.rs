//! Structural checks run before any code is generated.
use crate::analysis::topology;
use crate::codegen::GenerationError;
use crate::problem::ProblemSpec;
use crate::store::{ExprRegistry, NodeId, NodeKind};

/// Verifies the arena invariants the rest of the crate relies on: every
/// formula has as many parents as its operation takes, leaves have none,
/// and every parent precedes its child.
///
/// Registries built through the API always pass; this guards deserialized ones.
pub fn check_arena(registry: &ExprRegistry) -> Result<(), GenerationError> {
    if registry.parents_ranges.len() != registry.count() {
        return Err(GenerationError::MalformedArena {
            node: registry.parents_ranges.len().min(registry.count()),
            msg: "topology and kind tables differ in length".into(),
        });
    }

    for i in 0..registry.count() {
        let (start, count) = registry.parents_ranges[i];
        if start as usize + count as usize > registry.parents_flat.len() {
            return Err(GenerationError::MalformedArena { node: i, msg: "parent range out of bounds".into() });
        }

        let id = NodeId::new(i);
        let expected = match registry.kind(id) {
            NodeKind::Formula(op) => op.arity(),
            _ => 0,
        };
        let parents = registry.get_parents(id);
        if parents.len() != expected {
            return Err(GenerationError::MalformedArena {
                node: i,
                msg: format!("expected {} parents, found {}", expected, parents.len()),
            });
        }
        if let Some(p) = parents.iter().find(|p| p.index() >= i) {
            return Err(GenerationError::MalformedArena {
                node: i,
                msg: format!("parent {} does not precede its child", p.index()),
            });
        }
    }
    Ok(())
}

/// Checks that `spec` can be turned into source code.
pub fn check_spec(spec: &ProblemSpec) -> Result<(), GenerationError> {
    let registry = spec.registry();
    check_arena(registry)?;

    let mut outputs = Vec::with_capacity(spec.m() + 1);
    outputs.push(spec.objective());
    outputs.extend_from_slice(spec.constraints());
    if let Some(bad) = outputs.iter().find(|id| !registry.contains(**id)) {
        return Err(GenerationError::UnknownNode(bad.index()));
    }

    for node in topology::reachable_order(registry, &outputs) {
        match *registry.kind(node) {
            NodeKind::Variable(i) if i as usize >= spec.n() => {
                return Err(GenerationError::IndexOutOfRange { node: node.index(), what: "x", index: i, dim: spec.n() });
            }
            NodeKind::Parameter(i) if i as usize >= spec.num_p() => {
                return Err(GenerationError::IndexOutOfRange {
                    node: node.index(),
                    what: "p",
                    index: i,
                    dim: spec.num_p(),
                });
            }
            _ => {}
        }
    }

    check_constants(registry, &outputs)
}

/// Every constant reachable from `outputs` must be finite to be emitted as a literal.
pub fn check_constants(registry: &ExprRegistry, outputs: &[NodeId]) -> Result<(), GenerationError> {
    for node in topology::reachable_order(registry, outputs) {
        if let NodeKind::Constant(value) = *registry.kind(node) {
            if !value.is_finite() {
                return Err(GenerationError::NonFiniteConstant { node: node.index(), value });
            }
        }
    }
    Ok(())
}
