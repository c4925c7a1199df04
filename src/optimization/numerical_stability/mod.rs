//! numerical_stability: overflow-safe scalar maps and box reparameterisation.
//!
//! [`BoundTransform`] carries one free coordinate between the optimizer's
//! unconstrained space (`z`) and model space (`x` in `[lb, ub]`, either side
//! possibly infinite), together with `dx/dz` for the gradient chain rule.
//! The maps are monotone, so profile directions mean the same thing in both
//! spaces. Bound validity is checked by [`crate::problem::Problem`] before
//! any transform is built.
//!
//! `EIGEN_EPS` is also the cut-off for eigenvalues treated as zero when the
//! approximate profiles pseudo-invert a Hessian.

pub mod transformations;

pub use self::transformations::{
    BoundTransform, EIGEN_EPS, LOGIT_EPS, safe_logistic, safe_logit, safe_softplus,
    safe_softplus_inv,
};
