//! minimizer: bounded local minimization on top of Argmin.
//!
//! Purpose
//! -------
//! Provide the local optimizer used by profiling and multi-start: an
//! [`Objective`] trait for user cost functions, an [`Optimizer`] contract
//! the profiling engine treats as a black box, and a reference
//! implementation, [`LbfgsOptimizer`], running Argmin’s L-BFGS on
//! box-constrained problems.
//!
//! Key behaviors
//! -------------
//! - Map box constraints away with per-coordinate smooth transforms in
//!   [`adapter::ArgMinAdapter`] so an unconstrained quasi-Newton method can
//!   be used.
//! - Build the L-BFGS solver for the chosen [`traits::LineSearcher`] with
//!   [`builders::lbfgs_with`] and run it via [`run::run_lbfgs`].
//! - Fall back to finite differences ([`finite_diff`]) when the objective
//!   provides no gradient or Hessian, with validation and error capture.
//! - Centralize optimizer configuration ([`Tolerances`], [`MinimizeOptions`])
//!   and validation logic ([`validation`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objectives are **minimized** and evaluated on full parameter vectors;
//!   optimizers receive and return reduced start points but always report
//!   the full `theta_hat`.
//! - [`Objective::value`] and [`Objective::grad`] treat invalid inputs as
//!   recoverable [`crate::optimization::errors::OptError`] values, not
//!   panics.
//! - Configuration types are validated on construction and treated as
//!   internally consistent by the solver layer.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover chain-rule gradients in [`adapter`],
//!   solver construction in [`builders`], finite-difference helpers in
//!   [`finite_diff`], configuration invariants in [`traits`], and
//!   convergence on bounded toy problems in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::LbfgsOptimizer;
pub use self::traits::{
    LineSearcher, MinimizeOptions, Objective, OptimOutcome, Optimizer, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::api::LbfgsOptimizer;
    pub use super::traits::{
        LineSearcher, MinimizeOptions, Objective, OptimOutcome, Optimizer, Tolerances,
    };
    pub use super::types::{Cost, Grad, Hessian, Theta};
}
