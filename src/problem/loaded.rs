//! In-process handle over a compiled problem module.
use super::bounds::{BoundsConfig, BoxBounds, ConfigError};
use super::spec::Dimensions;
use crate::build::ArtifactPaths;
use crate::loader::FunctionTable;
use libc::c_int;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Argument '{what}' has length {got}, expected {expected}")]
    Dimension { what: &'static str, expected: usize, got: usize },
    #[error("Native function '{function}' returned status {code}")]
    Native { function: &'static str, code: i32 },
}

/// A compiled problem: native evaluation functions plus the bound sets
/// `C` (on `x`) and `D` (on `g(x, p)`).
///
/// The native module stays mapped until the handle is dropped or `unload`ed.
#[derive(Debug)]
pub struct LoadedProblem {
    table: FunctionTable,
    c: BoxBounds,
    d: BoxBounds,
    artifacts: ArtifactPaths,
}

impl LoadedProblem {
    /// Wraps a bound function table with unbounded `C` and `D`.
    pub fn new(table: FunctionTable, artifacts: ArtifactPaths) -> Self {
        let dims = table.dimensions();
        let open = BoundsConfig::unbounded(dims.n, dims.m);
        Self {
            table,
            c: BoxBounds { lowerbound: open.lbx, upperbound: open.ubx },
            d: BoxBounds { lowerbound: open.lbg, upperbound: open.ubg },
            artifacts,
        }
    }

    pub fn dimensions(&self) -> Dimensions { self.table.dimensions() }
    pub fn n(&self) -> usize { self.dimensions().n }
    pub fn m(&self) -> usize { self.dimensions().m }
    pub fn num_p(&self) -> usize { self.dimensions().num_p }

    /// Box constraints on `x`.
    pub fn c(&self) -> &BoxBounds { &self.c }
    /// Bounds on `g(x, p)`.
    pub fn d(&self) -> &BoxBounds { &self.d }

    /// Paths the artifacts occupied while the module was built.
    pub fn artifacts(&self) -> &ArtifactPaths { &self.artifacts }

    /// Validates `bounds` against the problem dimensions, then assigns all
    /// four vectors. On error nothing is changed.
    pub fn set_bounds(&mut self, bounds: &BoundsConfig) -> Result<(), ConfigError> {
        bounds.validate(self.n(), self.m())?;
        self.c.lowerbound.clone_from(&bounds.lbx);
        self.c.upperbound.clone_from(&bounds.ubx);
        self.d.lowerbound.clone_from(&bounds.lbg);
        self.d.upperbound.clone_from(&bounds.ubg);
        Ok(())
    }

    pub fn eval_f(&self, x: &[f64], p: &[f64]) -> Result<f64, EvalError> {
        self.check_point(x, p)?;
        let mut out = 0.0;
        let code = unsafe { (self.table.f)(x.as_ptr(), p.as_ptr(), &mut out) };
        status("f", code)?;
        Ok(out)
    }

    pub fn eval_grad_f(&self, x: &[f64], p: &[f64], grad: &mut [f64]) -> Result<(), EvalError> {
        self.check_point(x, p)?;
        check_len("grad", grad.len(), self.n())?;
        let code = unsafe { (self.table.grad_f)(x.as_ptr(), p.as_ptr(), grad.as_mut_ptr()) };
        status("grad_f", code)
    }

    pub fn eval_g(&self, x: &[f64], p: &[f64], g: &mut [f64]) -> Result<(), EvalError> {
        self.check_point(x, p)?;
        check_len("g", g.len(), self.m())?;
        let code = unsafe { (self.table.g)(x.as_ptr(), p.as_ptr(), g.as_mut_ptr()) };
        status("g", code)
    }

    /// Dense row-major `m x n` Jacobian of `g`.
    pub fn eval_jac_g(&self, x: &[f64], p: &[f64], jac: &mut [f64]) -> Result<(), EvalError> {
        self.check_point(x, p)?;
        check_len("jac", jac.len(), self.m() * self.n())?;
        let code = unsafe { (self.table.jac_g)(x.as_ptr(), p.as_ptr(), jac.as_mut_ptr()) };
        status("jac_g", code)
    }

    /// `J_g(x, p)^T y`.
    pub fn eval_grad_g_prod(&self, x: &[f64], p: &[f64], y: &[f64], out: &mut [f64]) -> Result<(), EvalError> {
        self.check_point(x, p)?;
        check_len("y", y.len(), self.m())?;
        check_len("out", out.len(), self.n())?;
        let code = unsafe { (self.table.grad_g_prod)(x.as_ptr(), p.as_ptr(), y.as_ptr(), out.as_mut_ptr()) };
        status("grad_g_prod", code)
    }

    /// Unmaps the native module.
    pub fn unload(self) {
        log::debug!("unloading {}", self.table.library().path().display());
        drop(self);
    }

    // Every native call reads exactly n values of x and num_p of p.
    fn check_point(&self, x: &[f64], p: &[f64]) -> Result<(), EvalError> {
        check_len("x", x.len(), self.n())?;
        check_len("p", p.len(), self.num_p())
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<(), EvalError> {
    if got != expected {
        return Err(EvalError::Dimension { what, expected, got });
    }
    Ok(())
}

fn status(function: &'static str, code: c_int) -> Result<(), EvalError> {
    if code != 0 {
        return Err(EvalError::Native { function, code });
    }
    Ok(())
}
