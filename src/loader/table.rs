//! Binds the generated function table of a problem module.
//!
//! The exported symbols follow a fixed convention for a problem `NAME`:
//! `NAME_n`, `NAME_m`, `NAME_np` report dimensions; `NAME_f`, `NAME_grad_f`,
//! `NAME_g`, `NAME_jac_g` and `NAME_grad_g_prod` evaluate the problem.

use super::dl_ffi::SharedLibrary;
use super::error::LoadError;
use crate::problem::Dimensions;
use libc::{c_int, c_long, c_void};

pub type DimFn = unsafe extern "C" fn() -> c_long;
pub type EvalFn = unsafe extern "C" fn(x: *const f64, p: *const f64, out: *mut f64) -> c_int;
pub type ProdFn =
    unsafe extern "C" fn(x: *const f64, p: *const f64, y: *const f64, out: *mut f64) -> c_int;

#[derive(Debug)]
pub struct FunctionTable {
    pub f: EvalFn,
    pub grad_f: EvalFn,
    pub g: EvalFn,
    pub jac_g: EvalFn,
    pub grad_g_prod: ProdFn,
    dims: Dimensions,
    // Must outlive the function pointers above; dropped last.
    library: SharedLibrary,
}

impl FunctionTable {
    /// Resolves every symbol of `name` and checks the module's dimensions
    /// against `expected`.
    pub fn bind(library: SharedLibrary, name: &str, expected: Dimensions) -> Result<Self, LoadError> {
        check_dimension(&library, name, "n", expected.n)?;
        check_dimension(&library, name, "m", expected.m)?;
        check_dimension(&library, name, "np", expected.num_p)?;

        let f = eval_symbol(&library, name, "f")?;
        let grad_f = eval_symbol(&library, name, "grad_f")?;
        let g = eval_symbol(&library, name, "g")?;
        let jac_g = eval_symbol(&library, name, "jac_g")?;

        let ptr = library.symbol(&format!("{}_grad_g_prod", name))?;
        // SAFETY: generated modules export `grad_g_prod` with the `ProdFn` signature.
        let grad_g_prod = unsafe { std::mem::transmute::<*mut c_void, ProdFn>(ptr) };

        Ok(Self { f, grad_f, g, jac_g, grad_g_prod, dims: expected, library })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn library(&self) -> &SharedLibrary {
        &self.library
    }
}

fn eval_symbol(library: &SharedLibrary, name: &str, suffix: &str) -> Result<EvalFn, LoadError> {
    let ptr = library.symbol(&format!("{}_{}", name, suffix))?;
    // SAFETY: generated modules export evaluation symbols with the `EvalFn` signature.
    Ok(unsafe { std::mem::transmute::<*mut c_void, EvalFn>(ptr) })
}

fn check_dimension(
    library: &SharedLibrary,
    name: &str,
    what: &'static str,
    expected: usize,
) -> Result<(), LoadError> {
    let ptr = library.symbol(&format!("{}_{}", name, what))?;
    // SAFETY: dimension symbols are exported as `long NAME_x(void)`.
    let found = unsafe { std::mem::transmute::<*mut c_void, DimFn>(ptr)() } as i64;
    if found != expected as i64 {
        return Err(LoadError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}
