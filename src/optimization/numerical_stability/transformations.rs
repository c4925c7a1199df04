//! Numerical stability utilities.
//!
//! Provides safe implementations of common nonlinear transforms
//! that are prone to overflow/underflow in naïve form, plus the
//! per-coordinate bound transforms used to run an unconstrained
//! solver on a box-constrained problem.
//! The functions here follow guarded strategies similar to those
//! in major ML libraries (e.g. PyTorch, TensorFlow), using explicit
//! cutoffs (`x > 20.0`) to keep `f64` arithmetic in a well-conditioned regime.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp applied to probabilities before taking a logit,
//!   so a start point sitting exactly on a bound maps to a finite value.
//! - [`EIGEN_EPS`]: eigenvalues at or below this are treated as zero when
//!   pseudo-inverting curvature matrices.
//! - [`safe_softplus(x)`]: stable version of `ln(1 + exp(x))`,
//!   mapping ℝ → (0, ∞) without overflow.
//! - [`safe_softplus_inv(x)`]: inverse of softplus, mapping
//!   (0, ∞) → ℝ without catastrophic cancellation.
//! - [`safe_logistic(x)`] / [`safe_logit(p)`]: ℝ ↔ (0, 1).
//! - [`BoundTransform`]: maps one unconstrained coordinate `z` into the
//!   interval `[lb, ub]` (either side may be infinite).

/// Probability clamp used before a logit.
///
/// Keeps `logit(p)` finite (|z| ≈ 23) when a start point sits on a bound.
pub const LOGIT_EPS: f64 = 1e-10;

/// Eigenvalue floor for pseudo-inverses of Hessians.
pub const EIGEN_EPS: f64 = 1e-12;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// Computes softplus without overflow for large positive `x` and
/// with good precision for large negative `x`. This implementation
/// uses a simple piecewise guard:
///
/// - For sufficiently large `x`, `softplus(x) ≈ x + ln1p(exp(-x)) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
///
/// # Parameters
/// - `x`: real input
///
/// # Returns
/// - `softplus(x)` as `f64`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Stable inverse of softplus on `(0, ∞)`: solves for `t` in
/// `softplus(t) = x`, returning `t = ln(exp(x) - 1)`.
///
/// - For sufficiently large `x`, `ln(exp(x) - 1) ≈ x`.
/// - Otherwise, it uses `ln(expm1(x))`.
///
/// # Parameters
/// - `x`: a positive real (the softplus output), must be finite and `> 0`.
///
/// # Returns
/// - `t` such that `softplus(t) = x`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp_m1().ln() }
}

/// Numerically stable logistic function `1 / (1 + exp(-x))`.
///
/// Branches on the sign of `x` so that `exp` is only ever evaluated on a
/// non-positive argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logit `ln(p / (1 - p))` with `p` clamped to `[LOGIT_EPS, 1 - LOGIT_EPS]`.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    (p / (1.0 - p)).ln()
}

/// BoundTransform: smooth map from an unconstrained coordinate into a box.
///
/// Purpose
/// -------
/// Let an unconstrained quasi-Newton solver work on box-constrained
/// problems by optimizing over `z ∈ ℝ` and evaluating the objective at
/// `x = T(z) ∈ [lb, ub]`.
///
/// Variants
/// --------
/// - `Free`: `x = z`.
/// - `Lower { lb }`: `x = lb + softplus(z)`.
/// - `Upper { ub }`: `x = ub - softplus(z)`.
/// - `Interval { lb, ub }`: `x = lb + (ub - lb) · logistic(z)`.
///
/// Invariants
/// ----------
/// - `to_bounded` never leaves `[lb, ub]`; the end points themselves are
///   only reached in the saturated limit, so the caller clips once more
///   after optimization when it needs exact bound values.
/// - `to_unbounded` clamps its input away from the bounds, so it is total
///   on `[lb, ub]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundTransform {
    Free,
    Lower { lb: f64 },
    Upper { ub: f64 },
    Interval { lb: f64, ub: f64 },
}

impl BoundTransform {
    /// Pick the transform matching the finiteness pattern of `(lb, ub)`.
    pub fn new(lb: f64, ub: f64) -> Self {
        match (lb.is_finite(), ub.is_finite()) {
            (true, true) => BoundTransform::Interval { lb, ub },
            (true, false) => BoundTransform::Lower { lb },
            (false, true) => BoundTransform::Upper { ub },
            (false, false) => BoundTransform::Free,
        }
    }

    /// `x = T(z)`.
    pub fn to_bounded(&self, z: f64) -> f64 {
        match *self {
            BoundTransform::Free => z,
            BoundTransform::Lower { lb } => lb + safe_softplus(z),
            BoundTransform::Upper { ub } => ub - safe_softplus(z),
            BoundTransform::Interval { lb, ub } => lb + (ub - lb) * safe_logistic(z),
        }
    }

    /// `z = T⁻¹(x)`, clamped away from the bounds.
    pub fn to_unbounded(&self, x: f64) -> f64 {
        match *self {
            BoundTransform::Free => x,
            BoundTransform::Lower { lb } => safe_softplus_inv((x - lb).max(LOGIT_EPS)),
            BoundTransform::Upper { ub } => safe_softplus_inv((ub - x).max(LOGIT_EPS)),
            BoundTransform::Interval { lb, ub } => {
                let width = ub - lb;
                if width <= 0.0 { 0.0 } else { safe_logit((x - lb) / width) }
            }
        }
    }

    /// `dx/dz` evaluated at `z`, used for the chain rule on gradients.
    pub fn derivative(&self, z: f64) -> f64 {
        match *self {
            BoundTransform::Free => 1.0,
            BoundTransform::Lower { .. } => safe_logistic(z),
            BoundTransform::Upper { .. } => -safe_logistic(z),
            BoundTransform::Interval { lb, ub } => {
                let s = safe_logistic(z);
                (ub - lb) * s * (1.0 - s)
            }
        }
    }
}
