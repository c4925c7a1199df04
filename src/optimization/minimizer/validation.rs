//! minimizer::validation: input and output checks for the minimizer.
//!
//! Every check reports the *first* offending entry, so error messages point
//! at a single coordinate. Vectors handed to objectives are full-length;
//! start vectors for the optimizer are reduced (free coordinates only), and
//! callers pass the matching `dim`.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{Grad, Theta, types::Hessian},
};

/// Position and value of the first non-finite entry, if any.
fn first_non_finite<'a, I>(values: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    values.into_iter().copied().enumerate().find(|(_, v)| !v.is_finite())
}

/// Shared rule for optional stopping tolerances: absent, or finite and > 0.
fn tolerance_problem(tol: Option<f64>) -> Option<(f64, &'static str)> {
    match tol {
        Some(t) if !t.is_finite() => Some((t, "Tolerance must be finite.")),
        Some(t) if t <= 0.0 => Some((t, "Tolerance must be positive.")),
        _ => None,
    }
}

/// # Errors
/// [`OptError::InvalidTolGrad`] for a non-finite or non-positive value.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    match tolerance_problem(tol) {
        Some((tol, reason)) => Err(OptError::InvalidTolGrad { tol, reason }),
        None => Ok(()),
    }
}

/// # Errors
/// [`OptError::InvalidTolCost`] for a non-finite or non-positive value.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    match tolerance_problem(tol) {
        Some((tol, reason)) => Err(OptError::InvalidTolCost { tol, reason }),
        None => Ok(()),
    }
}

/// Check a gradient for length `dim` and finite entries.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`]
/// - [`OptError::InvalidGradient`]
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    match first_non_finite(grad) {
        Some((index, value)) => Err(OptError::InvalidGradient {
            index,
            value,
            reason: "Gradient elements must be finite.",
        }),
        None => Ok(()),
    }
}

/// Unwrap the solver's best parameter vector, rejecting non-finite entries.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if the solver returned no vector.
/// - [`OptError::InvalidThetaHat`]
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, value)) = first_non_finite(&theta) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(theta)
}

/// # Errors
/// [`OptError::NonFiniteCost`] for `NaN` or `±∞`.
pub fn validate_value(value: f64) -> OptResult<()> {
    if value.is_finite() { Ok(()) } else { Err(OptError::NonFiniteCost { value }) }
}

/// Check an optimizer start vector; length is checked before finiteness.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`]
/// - [`OptError::InvalidThetaInput`]
pub fn validate_theta_input(theta: &Theta, dim: usize) -> OptResult<()> {
    if theta.len() != dim {
        return Err(OptError::ThetaLengthMismatch { expected: dim, actual: theta.len() });
    }
    match first_non_finite(theta) {
        Some((index, value)) => Err(OptError::InvalidThetaInput { index, value }),
        None => Ok(()),
    }
}

/// Check that a Hessian is `dim × dim` with finite entries.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`]
/// - [`OptError::InvalidHessian`] naming the first offending row and column
///   in row-major order.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    let shape = (hessian.nrows(), hessian.ncols());
    if shape != (dim, dim) {
        return Err(OptError::HessianDimMismatch { expected: dim, found: shape });
    }
    match hessian.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), &value)) => Err(OptError::InvalidHessian { row, col, value }),
        None => Ok(()),
    }
}
