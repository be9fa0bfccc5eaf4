//! Turns a `ProblemSpec` into C source for the problem function table.
pub mod c_emitter;
pub mod error;

pub use error::GenerationError;

use crate::analysis::validation;
use crate::compute::derivative;
use crate::problem::{Dimensions, ProblemSpec};
use crate::store::NodeId;
use c_emitter::{CEmitter, Store};
use std::fmt::Write;

/// Generated source plus the dimensions it was resolved against.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub name: String,
    pub source: String,
    pub dims: Dimensions,
    /// Structurally non-zero entries of the constraint Jacobian.
    pub jacobian_nonzeros: usize,
}

impl GeneratedCode {
    pub fn source_file_name(&self) -> String {
        format!("{}.c", self.name)
    }

    pub fn shared_object_file_name(&self) -> String {
        format!("{}.so", self.name)
    }
}

/// Generates the objective, constraints and their derivatives as one C
/// translation unit exporting the `name`-prefixed function table.
pub fn generate(spec: &ProblemSpec, name: &str) -> Result<GeneratedCode, GenerationError> {
    check_name(name)?;
    validation::check_spec(spec)?;

    let declared = spec.dimensions();
    let f = spec.objective();
    let g = spec.constraints();

    // Derivatives are appended to a private copy of the arena.
    let mut registry = spec.registry().clone();
    registry.rebuild_intern_cache();
    let grad = derivative::gradient(&mut registry, f, declared.n);
    let jac = derivative::jacobian(&mut registry, g, declared.n);

    let nonzeros: Vec<(usize, usize, NodeId)> = jac
        .iter()
        .enumerate()
        .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, &d)| (i, j, d)))
        .filter(|&(_, _, d)| registry.kind(d).as_constant() != Some(0.0))
        .collect();

    let mut roots = vec![f];
    roots.extend_from_slice(g);
    roots.extend_from_slice(&grad);
    roots.extend(nonzeros.iter().map(|&(_, _, d)| d));
    validation::check_constants(&registry, &roots)?;

    let grad_stores: Vec<Store> = grad
        .iter()
        .enumerate()
        .map(|(j, &d)| Store::Assign { target: format!("out[{}]", j), value: d })
        .collect();
    let g_stores: Vec<Store> = g
        .iter()
        .enumerate()
        .map(|(i, &gi)| Store::Assign { target: format!("out[{}]", i), value: gi })
        .collect();
    let dims = resolve_dimensions(declared, grad_stores.len(), g_stores.len())?;

    let emitter = CEmitter::new(&registry);
    let symbol = |suffix: &str| format!("{}_{}", name, suffix);
    let out = ["double* out"];

    let mut source = String::new();
    let _ = writeln!(
        source,
        "/* Problem module '{}': n = {}, m = {}, num_p = {}. Generated, do not edit. */",
        name, dims.n, dims.m, dims.num_p
    );
    let _ = writeln!(source, "#include <math.h>\n");
    let _ = writeln!(source, "long {}(void) {{ return {}; }}", symbol("n"), dims.n);
    let _ = writeln!(source, "long {}(void) {{ return {}; }}", symbol("m"), dims.m);
    let _ = writeln!(source, "long {}(void) {{ return {}; }}\n", symbol("np"), dims.num_p);

    // f(x, p)
    let stores = [Store::Assign { target: "out[0]".into(), value: f }];
    source.push_str(&emitter.function(&symbol("f"), &out, None, &stores));
    source.push('\n');

    // grad f(x, p)
    source.push_str(&emitter.function(&symbol("grad_f"), &out, None, &grad_stores));
    source.push('\n');

    // g(x, p)
    source.push_str(&emitter.function(&symbol("g"), &out, None, &g_stores));
    source.push('\n');

    // Jacobian of g, dense row-major
    let stores: Vec<Store> = nonzeros
        .iter()
        .map(|&(i, j, d)| Store::Assign { target: format!("out[{}]", i * dims.n + j), value: d })
        .collect();
    source.push_str(&emitter.function(&symbol("jac_g"), &out, Some(("out", dims.m * dims.n)), &stores));
    source.push('\n');

    // J(x, p)^T y
    let stores: Vec<Store> = nonzeros
        .iter()
        .map(|&(i, j, d)| Store::AccumulateScaled {
            target: format!("out[{}]", j),
            scale: format!("y[{}]", i),
            value: d,
        })
        .collect();
    source.push_str(&emitter.function(
        &symbol("grad_g_prod"),
        &["const double* y", "double* out"],
        Some(("out", dims.n)),
        &stores,
    ));

    Ok(GeneratedCode {
        name: name.to_string(),
        source,
        dims,
        jacobian_nonzeros: nonzeros.len(),
    })
}

/// Dimensions as emitted: one gradient entry per variable and one output
/// per constraint. Parameters are only read, so `num_p` is taken as declared.
fn resolve_dimensions(declared: Dimensions, grad_len: usize, g_len: usize) -> Result<Dimensions, GenerationError> {
    let resolved = Dimensions { n: grad_len, m: g_len, num_p: declared.num_p };
    if resolved != declared {
        return Err(GenerationError::DimensionMismatch { declared, resolved });
    }
    Ok(resolved)
}

fn check_name(name: &str) -> Result<(), GenerationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(GenerationError::InvalidName(name.to_string()))
    }
}
