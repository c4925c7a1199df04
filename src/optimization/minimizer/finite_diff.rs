//! Finite-difference fallbacks for gradients and Hessians.
//!
//! - [`run_fd_diff`]: forward-difference gradient with error capture from
//!   the objective closure.
//! - [`compute_hessian`]: Hessian as the Jacobian of a gradient function,
//!   central first, forward as fallback, symmetrized.
//! - [`hessian_from_values`]: Hessian from objective values only, used when
//!   no analytic gradient exists.
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Compute a forward-difference gradient of `func` at `theta`, with error capture.
///
/// The FD closure can’t return `Result`, so any error raised by `func` is
/// stored into `closure_err` and the closure returns `NaN`. This helper:
/// - clears `closure_err`,
/// - performs `forward_diff`,
/// - if an error was captured, returns it as `Err`,
/// - validates the resulting gradient.
///
/// # Errors
/// Returns any error captured during evaluation of `func` inside the FD routine
/// or by validation of the resulting gradient.
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    let dim = theta.len();
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, dim)?;
    Ok(fd_grad)
}

/// Hessian of the objective as the finite-difference Jacobian of `f`, a
/// gradient function.
///
/// Central differences first; if they produce a non-finite entry, forward
/// differences are tried. The result is symmetrized.
///
/// # Errors
/// - [`crate::optimization::errors::OptError::InvalidHessian`] if both
///   attempts contain non-finite entries.
pub fn compute_hessian<F: Fn(&Theta) -> Grad>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let mut cent_hess = theta.central_hessian(f);
    match validate_hessian(&cent_hess, dim) {
        Ok(_) => {
            symmetrize_hess(&mut cent_hess);
            Ok(cent_hess)
        }
        Err(_) => {
            let mut forward_hess = theta.forward_hessian(f);
            validate_hessian(&forward_hess, dim)?;
            symmetrize_hess(&mut forward_hess);
            Ok(forward_hess)
        }
    }
}

/// Hessian from objective values by central second differences.
///
/// Step per coordinate `h_i = ε^{1/4} · max(1, |θ_i|)`, which balances
/// truncation and round-off for second differences.
///
/// # Errors
/// - [`crate::optimization::errors::OptError::InvalidHessian`] if any
///   evaluation was non-finite.
pub fn hessian_from_values<F: Fn(&Theta) -> f64>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let steps: Vec<f64> =
        theta.iter().map(|&t| f64::EPSILON.powf(0.25) * t.abs().max(1.0)).collect();
    let f0 = f(theta);
    let mut hess = Hessian::zeros((dim, dim));
    for i in 0..dim {
        let hi = steps[i];
        hess[[i, i]] =
            (eval_shifted(f, theta, &[(i, hi)]) - 2.0 * f0 + eval_shifted(f, theta, &[(i, -hi)]))
                / (hi * hi);
        for j in 0..i {
            let hj = steps[j];
            let value = (eval_shifted(f, theta, &[(i, hi), (j, hj)])
                - eval_shifted(f, theta, &[(i, hi), (j, -hj)])
                - eval_shifted(f, theta, &[(i, -hi), (j, hj)])
                + eval_shifted(f, theta, &[(i, -hi), (j, -hj)]))
                / (4.0 * hi * hj);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }
    validate_hessian(&hess, dim)?;
    Ok(hess)
}

fn eval_shifted<F: Fn(&Theta) -> f64>(f: &F, theta: &Theta, offsets: &[(usize, f64)]) -> f64 {
    let mut x = theta.clone();
    for &(k, d) in offsets {
        x[k] += d;
    }
    f(&x)
}

/// Average off-diagonal pairs in place.
fn symmetrize_hess(hess: &mut Hessian) {
    for i in 0..hess.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hess[[i, j]] + hess[[j, i]]);
            hess[[i, j]] = avg;
            hess[[j, i]] = avg;
        }
    }
}
