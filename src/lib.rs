//! Compiles symbolic optimal-control problems into native function tables.
//!
//! A problem is formulated with [`problem::ProblemBuilder`], turned into C
//! source by [`codegen`], built into a shared object by [`build`] and mapped
//! back into the process by [`loader`]. [`ProblemCompiler`] runs the whole
//! pipeline and returns a [`LoadedProblem`] that [`solver::solve`] can
//! minimize.
//!
//! Diagnostics are emitted through the [`log`] facade only: the work
//! directory and artifact paths at `info`/`debug`, compiler stderr and
//! failed native evaluations inside the solver at `warn`. Nothing is printed
//! unless the application installs a logger such as `simple_logger` or
//! `env_logger`.
//!
//! ```no_run
//! use ocp_compiler::problem::{BoundsConfig, ProblemBuilder};
//! use ocp_compiler::solver::{solve, SolverSettings};
//! use ocp_compiler::ProblemCompiler;
//!
//! let mut b = ProblemBuilder::new(2, 1);
//! let x = b.x();
//! let p = b.p();
//! let e = b.expr();
//! let d = e.sub(x[0], p[0]);
//! let sq0 = e.square(d);
//! let sq1 = e.square(x[1]);
//! let f = e.add(sq0, sq1);
//! let g = e.add(x[0], x[1]);
//! let spec = b.build(f, vec![g]);
//!
//! let bounds = BoundsConfig { lbg: vec![1.0], ubg: vec![1.0], ..BoundsConfig::unbounded(2, 1) };
//! let problem = ProblemCompiler::new().compile(&spec, &bounds)?;
//! let solution = solve(&problem, &[3.0], &[0.0, 0.0], &SolverSettings::default())?;
//! ocp_compiler::display::print_solver_stats(&solution.stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod analysis;
pub mod build;
pub mod codegen;
pub mod compiler;
pub mod compute;
pub mod display;
pub mod loader;
pub mod problem;
pub mod solver;
pub mod store;

pub use compiler::{compile_ocp, CompileError, ProblemCompiler};
pub use problem::{BoundsConfig, LoadedProblem, ProblemBuilder, ProblemSpec};
