use super::settings::SolverSettings;
use super::stats::{InnerStats, SolverStats, SolverStatus};
use crate::problem::{EvalError, LoadedProblem};
use optimization_engine::alm::{AlmCache, AlmFactory, AlmOptimizer, AlmProblem, NO_JACOBIAN_MAPPING, NO_MAPPING};
use optimization_engine::constraints::{BallInf, Rectangle};
use optimization_engine::core::Optimizer;
use optimization_engine::panoc::{PANOCCache, PANOCOptimizer};
use optimization_engine::{FunctionCallResult, Problem, SolverError};
use std::time::Duration;
use thiserror::Error;

// Radius of the box the Lagrange multipliers are kept in.
const MULTIPLIER_BOUND: f64 = 1e12;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Argument '{what}' has length {got}, expected {expected}")]
    Dimension { what: &'static str, expected: usize, got: usize },
    #[error("Problem has no decision variables")]
    EmptyProblem,
    #[error("Invalid solver settings: {0}")]
    Settings(String),
    #[error("Solver engine failed: {0}")]
    Engine(String),
}

impl From<EvalError> for SolveError {
    fn from(e: EvalError) -> Self {
        SolveError::Engine(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub x: Vec<f64>,
    pub stats: SolverStats,
}

/// Minimizes `f(x, p)` over `x in C` subject to `g(x, p) in D`, starting
/// from `x0`.
///
/// Unconstrained-in-`g` problems run PANOC directly; otherwise an augmented
/// Lagrangian loop drives an inner PANOC solver.
pub fn solve(
    problem: &LoadedProblem,
    params: &[f64],
    x0: &[f64],
    settings: &SolverSettings,
) -> Result<Solution, SolveError> {
    settings.validate()?;
    check_len("params", params.len(), problem.num_p())?;
    check_len("x0", x0.len(), problem.n())?;
    if problem.n() == 0 {
        return Err(SolveError::EmptyProblem);
    }

    let mut x = x0.to_vec();
    let run = if problem.m() == 0 {
        solve_panoc(problem, params, &mut x, settings)?
    } else {
        solve_alm(problem, params, &mut x, settings)?
    };

    let stats = SolverStats {
        status: run.status,
        delta: constraint_violation(problem, params, &x)?,
        epsilon: run.epsilon,
        outer_iterations: run.outer_iterations,
        inner: InnerStats { iterations: run.inner_iterations },
        elapsed_time: run.elapsed.as_secs_f64(),
        objective: problem.eval_f(&x, params)?,
    };
    log::debug!("solve finished: {}", stats);
    Ok(Solution { x, stats })
}

struct Run {
    status: SolverStatus,
    epsilon: f64,
    outer_iterations: usize,
    inner_iterations: usize,
    elapsed: Duration,
}

fn solve_panoc(
    problem: &LoadedProblem,
    params: &[f64],
    x: &mut [f64],
    settings: &SolverSettings,
) -> Result<Run, SolveError> {
    let f = |u: &[f64], cost: &mut f64| -> FunctionCallResult {
        *cost = problem.eval_f(u, params).map_err(engine_failure)?;
        Ok(())
    };
    let df = |u: &[f64], grad: &mut [f64]| -> FunctionCallResult {
        problem.eval_grad_f(u, params, grad).map_err(engine_failure)
    };

    let c = problem.c();
    let bounds = Rectangle::new(Some(c.lowerbound.as_slice()), Some(c.upperbound.as_slice()));
    let mut cache = PANOCCache::new(problem.n(), settings.tolerance, settings.lbfgs_memory);
    let mut panoc = PANOCOptimizer::new(Problem::new(&bounds, df, f), &mut cache)
        .with_max_iter(settings.max_inner_iterations);
    if let Some(limit) = settings.max_duration {
        panoc = panoc.with_max_duration(limit);
    }

    let status = panoc.solve(x).map_err(|e| SolveError::Engine(format!("{:?}", e)))?;
    Ok(Run {
        status: status.exit_status().into(),
        epsilon: status.norm_fpr(),
        outer_iterations: 1,
        inner_iterations: status.iterations(),
        elapsed: status.solve_time(),
    })
}

fn solve_alm(
    problem: &LoadedProblem,
    params: &[f64],
    x: &mut [f64],
    settings: &SolverSettings,
) -> Result<Run, SolveError> {
    let (n, m) = (problem.n(), problem.m());

    let f = |u: &[f64], cost: &mut f64| -> FunctionCallResult {
        *cost = problem.eval_f(u, params).map_err(engine_failure)?;
        Ok(())
    };
    let df = |u: &[f64], grad: &mut [f64]| -> FunctionCallResult {
        problem.eval_grad_f(u, params, grad).map_err(engine_failure)
    };
    let f1 = |u: &[f64], out: &mut [f64]| -> FunctionCallResult {
        problem.eval_g(u, params, out).map_err(engine_failure)
    };
    let f1_jacobian_product = |u: &[f64], d: &[f64], out: &mut [f64]| -> FunctionCallResult {
        problem.eval_grad_g_prod(u, params, d, out).map_err(engine_failure)
    };

    let (c, d) = (problem.c(), problem.d());
    let bounds = Rectangle::new(Some(c.lowerbound.as_slice()), Some(c.upperbound.as_slice()));
    let set_d = || Rectangle::new(Some(d.lowerbound.as_slice()), Some(d.upperbound.as_slice()));
    let set_y = BallInf::new(None, MULTIPLIER_BOUND);

    let factory = AlmFactory::new(
        f,
        df,
        Some(f1),
        Some(f1_jacobian_product),
        NO_MAPPING,
        NO_JACOBIAN_MAPPING,
        Some(set_d()),
        0,
    );
    let alm_problem = AlmProblem::new(
        bounds,
        Some(set_d()),
        Some(set_y),
        |u: &[f64], xi: &[f64], cost: &mut f64| -> FunctionCallResult { factory.psi(u, xi, cost) },
        |u: &[f64], xi: &[f64], grad: &mut [f64]| -> FunctionCallResult { factory.d_psi(u, xi, grad) },
        Some(f1),
        NO_MAPPING,
        m,
        0,
    );

    let panoc_cache = PANOCCache::new(n, settings.tolerance, settings.lbfgs_memory);
    let mut alm_cache = AlmCache::new(panoc_cache, m, 0);
    let mut alm = AlmOptimizer::new(&mut alm_cache, alm_problem)
        .with_delta_tolerance(settings.delta_tolerance)
        .with_epsilon_tolerance(settings.tolerance)
        .with_initial_inner_tolerance(settings.initial_inner_tolerance)
        .with_max_outer_iterations(settings.max_outer_iterations)
        .with_max_inner_iterations(settings.max_inner_iterations)
        .with_initial_penalty(settings.initial_penalty);
    if let Some(limit) = settings.max_duration {
        alm = alm.with_max_duration(limit);
    }

    let status = alm.solve(x).map_err(|e| SolveError::Engine(format!("{:?}", e)))?;
    Ok(Run {
        status: status.exit_status().into(),
        epsilon: status.last_problem_norm_fpr(),
        outer_iterations: status.num_outer_iterations(),
        inner_iterations: status.num_inner_iterations(),
        elapsed: status.solve_time(),
    })
}

/// `max_i dist(g_i(x, p), [lbg_i, ubg_i])`, zero when there are no constraints.
fn constraint_violation(problem: &LoadedProblem, params: &[f64], x: &[f64]) -> Result<f64, SolveError> {
    let mut g = vec![0.0; problem.m()];
    problem.eval_g(x, params, &mut g)?;
    let d = problem.d();
    Ok(g.iter()
        .zip(d.lowerbound.iter().zip(&d.upperbound))
        .map(|(&gi, (&lo, &hi))| (lo - gi).max(gi - hi).max(0.0))
        .fold(0.0, f64::max))
}

fn engine_failure(e: EvalError) -> SolverError {
    log::warn!("native evaluation failed inside the solver: {}", e);
    SolverError::Cost
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<(), SolveError> {
    if got != expected {
        return Err(SolveError::Dimension { what, expected, got });
    }
    Ok(())
}
