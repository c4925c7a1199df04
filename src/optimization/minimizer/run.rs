//! minimizer::run: execute an L-BFGS solver and normalize its state.
//!
//! Purpose
//! -------
//! Drive an Argmin `Executor` over an [`ArgMinAdapter`] and turn the final
//! solver state into an [`OptimOutcome`] expressed in model space.
//!
//! Conventions
//! -----------
//! - `z0` is in solver coordinates (see [`ArgMinAdapter::to_unbounded`]).
//! - The returned `theta_hat` is the **full** clipped model-space vector;
//!   `value` is the objective value there (no sign change).
//! - With `opts.verbose`, the initial cost is logged at `debug` level and,
//!   behind the `obs_slog` feature, a terminal observer is attached.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        adapter::ArgMinAdapter,
        traits::{MinimizeOptions, Objective, OptimOutcome},
        types::{Grad, Theta},
    },
};
use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin_math::ArgminL2Norm;

/// Run `solver` from `z0` and collect an [`OptimOutcome`].
///
/// # Errors
/// - Propagates solver failures (e.g., line-search errors, objective errors
///   raised during the run) as [`crate::optimization::errors::OptError`].
/// - Propagates outcome validation errors (non-finite optimum).
pub fn run_lbfgs<'a, O, S>(
    z0: Theta, opts: &MinimizeOptions, problem: ArgMinAdapter<'a, O>, solver: S,
) -> OptResult<OptimOutcome>
where
    O: Objective,
    S: argmin::core::Solver<
            ArgMinAdapter<'a, O>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    if opts.verbose {
        log_initial_state(&z0, &problem);
    }
    let mapper = problem.clone();
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(z0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    let best_cost = result.get_best_cost();
    let theta_hat = match result.take_best_param() {
        Some(z) => Some(mapper.full_vector(&z)?),
        None => None,
    };
    OptimOutcome::new(theta_hat, best_cost, termination, iterations, function_counts, grad)
}

fn log_initial_state<O: Objective>(z0: &Theta, problem: &ArgMinAdapter<'_, O>) {
    let c0 = problem.cost(z0).ok();
    let g0n = problem.gradient(z0).ok().map(|g| g.l2_norm());
    log::debug!(
        "L-BFGS init: f(theta0) = {:?}{}",
        c0,
        g0n.map(|n| format!(", ||grad|| = {n:.6}")).unwrap_or_default()
    );
}
