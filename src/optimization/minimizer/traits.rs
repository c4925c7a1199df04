//! Public API surface for bounded minimization.
//!
//! - [`Objective`]: trait users implement for their cost function.
//! - [`Optimizer`]: the contract every local optimizer satisfies so the
//!   profiling layer can treat it as a black box.
//! - [`MinimizeOptions`] and [`Tolerances`]: configuration for the
//!   reference L-BFGS optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result of one local optimization.
//!
//! Convention: objectives are **minimized**. Callers holding a
//! log-likelihood pass its negative.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        minimizer::{
            Cost, FnEvalMap, Grad, Theta,
            types::Hessian,
            validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
        },
    },
    problem::Problem,
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User-implemented objective over the **full** parameter vector.
///
/// Every method receives a vector of length `dim_full`; fixing and
/// freeing of parameters is handled by [`Problem`] before the objective is
/// called.
///
/// Required:
/// - `value(&Theta) -> OptResult<Cost>`: evaluate the objective.
///   - Errors: return a descriptive `OptError` for points where the model
///     cannot be evaluated. The profiling layer treats these as
///     recoverable step failures.
///
/// Optional:
/// - `grad(&Theta) -> OptResult<Grad>`: analytic gradient (length
///   `dim_full`). If not implemented, finite differences are used.
/// - `hessian(&Theta) -> OptResult<Hessian>`: analytic Hessian
///   (`dim_full × dim_full`). If not implemented, a finite-difference
///   Hessian of the gradient is used where one is needed.
pub trait Objective: Send + Sync {
    // Required methods
    fn value(&self, theta: &Theta) -> OptResult<Cost>;

    // Optional methods
    fn grad(&self, _theta: &Theta) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }

    fn hessian(&self, _theta: &Theta) -> OptResult<Hessian> {
        Err(OptError::HessianNotImplemented)
    }
}

/// Local optimizer contract consumed by profiling and multi-start.
///
/// `minimize` starts from `x0`, a **reduced** vector over
/// `problem.x_free_indices()`, respects `problem`'s bounds and fixed
/// parameters, and returns an [`OptimOutcome`] whose `theta_hat` is the
/// **full** vector (fixed entries equal to their fixed values).
///
/// Implementations must be cheap to clone and must not share mutable
/// state between clones: profiling hands one clone to every task.
pub trait Optimizer: Clone + Send + Sync {
    fn minimize<O: Objective>(&self, problem: &Problem<O>, x0: &Theta) -> OptResult<OptimOutcome>;
}

/// Choice of line search used inside the L-BFGS solver.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"MoreThuente"`, `"HagerZhang"`). Unknown names return
/// `OptError::InvalidLineSearch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols: Tolerances`: numerical tolerances and iteration limits.
/// - `line_searcher: LineSearcher`: line-search algorithm used by L-BFGS.
/// - `verbose: bool`: if `true`, attaches an observer (behind the `obs_slog`
///   feature) and logs the initial cost.
/// - `lbfgs_mem: Option<usize>`: L-BFGS history size.
///
/// Default:
/// - `tols`: `tol_grad = 1e-6`, `tol_cost = 1e-12`, `max_iter = 300`
/// - `line_searcher`: `MoreThuente`
/// - `verbose`: `false`
/// - `lbfgs_mem`: `None` (uses default of 7)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimizeOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
}

impl MinimizeOptions {
    /// Create a new set of optimizer options.
    ///
    /// Validation of numeric tolerances is performed inside
    /// [`Tolerances::new`]; this constructor only checks `lbfgs_mem`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, verbose: bool, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, verbose, lbfgs_mem })
    }
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-12), max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            verbose: false,
            lbfgs_mem: None,
        }
    }
}

/// Numerical tolerances and iteration limits used by the optimizer.
///
/// - `tol_grad`: terminate when the gradient norm falls below this threshold.
/// - `tol_cost`: terminate when the change in cost falls below this threshold.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** of the three must be provided
/// (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Rules
    /// - At least one of `tol_grad`, `tol_cost`, or `max_iter` must be `Some`.
    /// - If provided, tolerances must be **finite and strictly positive**.
    /// - If provided, `max_iter` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result of one local optimization.
///
/// - `theta_hat`: best **full** parameter vector found.
/// - `value`: objective value at `theta_hat`.
/// - `converged`: `true` only when the solver met its convergence criteria
///   (or a target cost). Iteration caps, timeouts and interrupts give
///   `false`.
/// - `status`: human-readable termination status string.
/// - `iterations`: number of optimizer iterations performed.
/// - `fn_evals`: function-evaluation counters reported by `argmin`.
/// - `grad_norm`: norm of the last available gradient (optimizer space).
/// - `hess`: optional full-dimension Hessian at `theta_hat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub hess: Option<Hessian>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// Performs:
    /// - `theta_hat` check via `validate_theta_hat` (present and all finite).
    /// - `value` check via `validate_value` (finite).
    /// - Maps `TerminationStatus` into `(converged, status)`.
    /// - Computes `grad_norm` if a gradient was provided.
    ///
    /// # Errors
    /// - [`OptError::Solver`] with kind `"solver exit"` when the solver
    ///   aborted (e.g. a failed line search); its best point is not an optimum.
    /// - Propagates any validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(TerminationReason::SolverExit(text)) => {
                return Err(OptError::Solver { kind: "solver exit", text });
            }
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, reason.text().to_string())
            }
        };
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm, hess: None })
    }

    /// Outcome for a point that needed no optimization (nothing left free,
    /// or the start already satisfies the gradient tolerance).
    pub fn at_point(theta_hat: Theta, value: f64, status: &str) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        let mut fn_evals = FnEvalMap::new();
        fn_evals.insert("cost_count".to_string(), 1);
        Ok(Self {
            theta_hat,
            value,
            converged: true,
            status: status.to_string(),
            iterations: 0,
            fn_evals,
            grad_norm: None,
            hess: None,
        })
    }

    /// Attach a Hessian computed elsewhere.
    pub fn with_hessian(mut self, hess: Hessian) -> Self {
        self.hess = Some(hess);
        self
    }

    /// Total number of objective evaluations reported by the solver.
    pub fn n_fval(&self) -> usize {
        self.fn_evals.get("cost_count").copied().unwrap_or(0) as usize
    }
}
