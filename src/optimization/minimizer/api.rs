//! Reference local optimizer: bounded L-BFGS on top of Argmin.
//!
//! [`LbfgsOptimizer`] wraps a [`Problem`] in an [`ArgMinAdapter`] (which
//! maps box constraints away), picks Hager–Zhang or More–Thuente line
//! search, and delegates the run to [`run_lbfgs`].
use crate::{
    optimization::{
        errors::OptResult,
        minimizer::{
            adapter::ArgMinAdapter,
            builders::lbfgs_with,
            run::run_lbfgs,
            traits::{LineSearcher, MinimizeOptions, Objective, OptimOutcome, Optimizer},
            types::{HagerZhangLS, MoreThuenteLS, Theta},
            validation::validate_theta_input,
        },
    },
    problem::Problem,
};
use argmin::core::{CostFunction, Gradient};
use argmin_math::ArgminL2Norm;

/// Relative distance a start point is pulled away from a finite bound so the
/// transform Jacobian is not saturated at the first iterate.
pub const START_MARGIN: f64 = 1e-3;

/// Upper end of the Hager–Zhang bracket, evaluated before bracketing.
/// Much larger steps saturate the bound transforms, where the directional
/// derivative is exactly zero and the secant update becomes `0 / 0`.
pub const HZ_MAX_STEP: f64 = 1.0;

/// Bounded L-BFGS optimizer.
///
/// # Behavior
/// - Validates the start point (length `problem.dim()`, finite entries).
/// - With no free parameter left, evaluates the objective once and returns.
/// - Moves the start point slightly inside its box (see [`START_MARGIN`])
///   and maps it to solver coordinates.
/// - Returns immediately when the start already satisfies the gradient
///   tolerance; otherwise runs L-BFGS with the configured line search.
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_profiles::optimization::{
///     errors::OptResult,
///     minimizer::{LbfgsOptimizer, Objective, Optimizer, Theta},
/// };
/// use rust_profiles::problem::Problem;
///
/// struct Bowl;
/// impl Objective for Bowl {
///     fn value(&self, theta: &Theta) -> OptResult<f64> {
///         Ok(theta.dot(theta))
///     }
/// }
///
/// let problem = Problem::new(Bowl, array![-1.0, -1.0], array![1.0, 1.0])?;
/// let out = LbfgsOptimizer::default().minimize(&problem, &array![0.5, -0.5])?;
/// println!("x̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_profiles::optimization::errors::OptError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LbfgsOptimizer {
    pub options: MinimizeOptions,
}

impl LbfgsOptimizer {
    pub fn new(options: MinimizeOptions) -> Self {
        Self { options }
    }
}

impl Optimizer for LbfgsOptimizer {
    /// # Errors
    /// - Start-point validation errors.
    /// - Objective errors at the start point.
    /// - Builder errors and runtime solver errors from [`run_lbfgs`],
    ///   including aborted runs (`OptError::Solver` of kind `"solver exit"`).
    fn minimize<O: Objective>(&self, problem: &Problem<O>, x0: &Theta) -> OptResult<OptimOutcome> {
        validate_theta_input(x0, problem.dim())?;
        if problem.dim() == 0 {
            let x_full = problem.get_full_vector(x0)?;
            let value = problem.objective_value(&x_full)?;
            return OptimOutcome::at_point(x_full, value, "No free parameters");
        }

        let adapter = ArgMinAdapter::new(problem);
        let start = interior_start(x0, &problem.lb(), &problem.ub());
        let z0 = adapter.to_unbounded(&start);

        if let Some(tol_grad) = self.options.tols.tol_grad {
            let value = adapter.cost(&z0)?;
            let grad_norm = adapter.gradient(&z0)?.l2_norm();
            if grad_norm < tol_grad {
                let mut outcome = OptimOutcome::at_point(
                    adapter.full_vector(&z0)?,
                    value,
                    "Gradient tolerance met at start",
                )?;
                outcome.grad_norm = Some(grad_norm);
                return Ok(outcome);
            }
        }

        match self.options.line_searcher {
            LineSearcher::MoreThuente => {
                run_lbfgs(z0, &self.options, adapter, lbfgs_with(MoreThuenteLS::new(), &self.options)?)
            }
            LineSearcher::HagerZhang => {
                let linesearch = HagerZhangLS::new().with_bounds(f64::EPSILON, HZ_MAX_STEP)?;
                run_lbfgs(z0, &self.options, adapter, lbfgs_with(linesearch, &self.options)?)
            }
        }
    }
}

/// Clip `x` into `[lb, ub]` and keep it [`START_MARGIN`] away from every
/// finite bound (relative to the box width, or to `max(1, |bound|)` for a
/// one-sided box).
fn interior_start(x: &Theta, lb: &Theta, ub: &Theta) -> Theta {
    x.iter()
        .zip(lb.iter())
        .zip(ub.iter())
        .map(|((&xi, &l), &u)| {
            let xi = xi.clamp(l, u);
            match (l.is_finite(), u.is_finite()) {
                (true, true) => {
                    let m = START_MARGIN * (u - l);
                    if m > 0.0 { xi.clamp(l + m, u - m) } else { xi }
                }
                (true, false) => xi.max(l + START_MARGIN * l.abs().max(1.0)),
                (false, true) => xi.min(u - START_MARGIN * u.abs().max(1.0)),
                (false, false) => xi,
            }
        })
        .collect()
}
