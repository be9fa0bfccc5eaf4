use crate::store::{ExprRegistry, NodeId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Needed,
}

/// Returns the nodes reachable from `outputs`, ordered so that every
/// dependency appears before its consumer.
///
/// Relies on the arena invariant that parents have smaller ids than their
/// children (checked by `validation::check_arena`), so a single descending
/// sweep marks the reachable set and the ascending read-out is topological.
pub fn reachable_order(registry: &ExprRegistry, outputs: &[NodeId]) -> Vec<NodeId> {
    let count = registry.count();
    let mut state = vec![VisitState::None; count];

    let mut highest = 0;
    for &out in outputs {
        state[out.index()] = VisitState::Needed;
        highest = highest.max(out.index() + 1);
    }

    for i in (0..highest).rev() {
        if state[i] == VisitState::Needed {
            for &parent in registry.get_parents(NodeId::new(i)) {
                state[parent.index()] = VisitState::Needed;
            }
        }
    }

    (0..highest)
        .filter(|&i| state[i] == VisitState::Needed)
        .map(NodeId::new)
        .collect()
}
