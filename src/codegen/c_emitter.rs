use crate::analysis::topology;
use crate::store::{ExprRegistry, NodeId, NodeKind, Operation};
use std::fmt::Write;

/// How a computed value is stored into the function's output buffer.
#[derive(Debug, Clone)]
pub enum Store {
    /// `target = value;`
    Assign { target: String, value: NodeId },
    /// `target += scale * value;`
    AccumulateScaled { target: String, scale: String, value: NodeId },
}

impl Store {
    fn value(&self) -> NodeId {
        match self {
            Store::Assign { value, .. } | Store::AccumulateScaled { value, .. } => *value,
        }
    }
}

/// Lowers expression sub-graphs into straight-line C.
///
/// Every reachable formula becomes one `const double wK` local (K = node
/// id), written in dependency order; leaves are inlined as `x[i]`, `p[i]`
/// or literals.
pub struct CEmitter<'a> {
    registry: &'a ExprRegistry,
}

impl<'a> CEmitter<'a> {
    pub fn new(registry: &'a ExprRegistry) -> Self {
        Self { registry }
    }

    /// Emits a complete C function.
    ///
    /// `extra_params` are appended after `x` and `p`; `zero` (buffer, length)
    /// clears an output buffer before any store runs.
    pub fn function(
        &self,
        symbol: &str,
        extra_params: &[&str],
        zero: Option<(&str, usize)>,
        stores: &[Store],
    ) -> String {
        let mut out = String::new();

        let mut params = vec!["const double* x", "const double* p"];
        params.extend_from_slice(extra_params);
        let _ = writeln!(out, "int {}({}) {{", symbol, params.join(", "));
        let _ = writeln!(out, "    (void)x;");
        let _ = writeln!(out, "    (void)p;");

        if let Some((buffer, len)) = zero {
            if len > 0 {
                let _ = writeln!(out, "    for (long i = 0; i < {}; ++i) {}[i] = 0.0;", len, buffer);
            }
        }

        let roots: Vec<NodeId> = stores.iter().map(Store::value).collect();
        for node in topology::reachable_order(self.registry, &roots) {
            if let NodeKind::Formula(op) = *self.registry.kind(node) {
                let _ = writeln!(out, "    const double w{} = {};", node.0, self.formula(op, node));
            }
        }

        for store in stores {
            match store {
                Store::Assign { target, value } => {
                    let _ = writeln!(out, "    {} = {};", target, self.operand(*value));
                }
                Store::AccumulateScaled { target, scale, value } => {
                    let _ = writeln!(out, "    {} += {} * {};", target, scale, self.operand(*value));
                }
            }
        }

        let _ = writeln!(out, "    return 0;");
        let _ = writeln!(out, "}}");
        out
    }

    /// The C spelling of a node's value when it is read by another expression.
    pub fn operand(&self, node: NodeId) -> String {
        match *self.registry.kind(node) {
            NodeKind::Constant(v) => literal(v),
            NodeKind::Variable(i) => format!("x[{}]", i),
            NodeKind::Parameter(i) => format!("p[{}]", i),
            NodeKind::Formula(_) => format!("w{}", node.0),
        }
    }

    fn formula(&self, op: Operation, node: NodeId) -> String {
        let parents = self.registry.get_parents(node);
        let a = self.operand(parents[0]);
        let b = || self.operand(parents[1]);

        match op {
            Operation::Add => format!("{} + {}", a, b()),
            Operation::Subtract => format!("{} - {}", a, b()),
            Operation::Multiply => format!("{} * {}", a, b()),
            Operation::Divide => format!("{} / {}", a, b()),
            Operation::Power => format!("pow({}, {})", a, b()),
            Operation::Negate => format!("-{}", a),
            Operation::Sin => format!("sin({})", a),
            Operation::Cos => format!("cos({})", a),
            Operation::Tan => format!("tan({})", a),
            Operation::Exp => format!("exp({})", a),
            Operation::Log => format!("log({})", a),
            Operation::Sqrt => format!("sqrt({})", a),
            Operation::Tanh => format!("tanh({})", a),
            Operation::Atan => format!("atan({})", a),
        }
    }
}

/// Formats a finite constant so that it round-trips through a C compiler.
fn literal(v: f64) -> String {
    // `{:?}` yields the shortest representation that parses back exactly
    // (e.g. `0.1`, `1e-7`, `3.0`), all of which are valid C double literals.
    if v < 0.0 {
        format!("({:?})", v)
    } else {
        format!("{:?}", v)
    }
}
