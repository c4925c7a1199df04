//! Adapter that exposes a bounded [`Problem`] as an unconstrained `argmin`
//! problem.
//!
//! The solver works on `z ∈ ℝ^dim`, one coordinate per free parameter. Each
//! coordinate is mapped into its box with a [`BoundTransform`], the fixed
//! values are inserted, and the objective is evaluated on the resulting full
//! vector. Analytic gradients are reduced to the free entries and pushed
//! through the transform derivative; without one we finite-difference the
//! cost in `z`.
use std::cell::RefCell;

use crate::{
    optimization::{
        errors::{OptError, OptResult},
        minimizer::{
            finite_diff::run_fd_diff,
            traits::Objective,
            types::{Cost, Grad, Theta},
            validation::validate_grad,
        },
        numerical_stability::transformations::BoundTransform,
    },
    problem::Problem,
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a [`Problem`] to `argmin`'s `CostFunction` and `Gradient`.
///
/// - `CostFunction::cost` returns `f(x_full(z))`.
/// - `Gradient::gradient` returns:
///   - `J(z)ᵀ ∇f` restricted to the free entries when an analytic gradient
///     exists, where `J` is the diagonal transform Jacobian, or
///   - a finite-difference gradient of the cost in `z`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, O: Objective> {
    pub problem: &'a Problem<O>,
    pub transforms: Vec<BoundTransform>,
}

impl<'a, O: Objective> Clone for ArgMinAdapter<'a, O> {
    fn clone(&self) -> Self {
        Self { problem: self.problem, transforms: self.transforms.clone() }
    }
}

impl<'a, O: Objective> ArgMinAdapter<'a, O> {
    /// One transform per free parameter, in free-index order.
    pub fn new(problem: &'a Problem<O>) -> Self {
        let transforms = problem
            .lb()
            .iter()
            .zip(problem.ub().iter())
            .map(|(&lb, &ub)| BoundTransform::new(lb, ub))
            .collect();
        Self { problem, transforms }
    }

    /// Free parameters in model space.
    pub fn to_bounded(&self, z: &Theta) -> Theta {
        z.iter().zip(&self.transforms).map(|(&zi, t)| t.to_bounded(zi)).collect()
    }

    /// Solver coordinates for free parameters given in model space.
    pub fn to_unbounded(&self, x_free: &Theta) -> Theta {
        x_free.iter().zip(&self.transforms).map(|(&xi, t)| t.to_unbounded(xi)).collect()
    }

    /// Full model-space vector for solver coordinates `z`, clipped into the
    /// bounds so saturated transforms land exactly on them.
    pub fn full_vector(&self, z: &Theta) -> OptResult<Theta> {
        let mut x_free = self.to_bounded(z);
        let lb = self.problem.lb();
        let ub = self.problem.ub();
        for ((x, &l), &u) in x_free.iter_mut().zip(lb.iter()).zip(ub.iter()) {
            *x = x.clamp(l, u);
        }
        self.problem.get_full_vector(&x_free)
    }
}

impl<'a, O: Objective> CostFunction for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `f(x_full(z))`.
    ///
    /// # Errors
    /// Propagates any `OptError` from the objective; non-finite values are
    /// reported as `NonFiniteCost`.
    fn cost(&self, z: &Self::Param) -> Result<Self::Output, Error> {
        let x_full = self.full_vector(z)?;
        let output = self.problem.objective_value(&x_full)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(output)
    }
}

impl<'a, O: Objective> Gradient for ArgMinAdapter<'a, O> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate the gradient of the cost at `z`.
    ///
    /// Behavior:
    /// - With an analytic gradient: validate it, keep the free entries and
    ///   scale each by the transform derivative.
    /// - Otherwise: central differences of the cost in `z`; if a cost
    ///   evaluation failed or the result is not finite, retry once with
    ///   forward differences.
    ///
    /// # Errors
    /// - Propagates user errors from `grad` (other than
    ///   `GradientNotImplemented`).
    /// - Propagates errors raised by cost evaluations during FD.
    /// - Returns validation errors for wrong dimension or non-finite entries.
    fn gradient(&self, z: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = z.len();
        let x_full = self.full_vector(z)?;
        match self.problem.objective().grad(&x_full) {
            Ok(g_full) => {
                validate_grad(&g_full, self.problem.dim_full())?;
                let g_free = self.problem.get_reduced_vector(&g_full)?;
                let g: Grad = g_free
                    .iter()
                    .zip(z.iter())
                    .zip(&self.transforms)
                    .map(|((&gi, &zi), t)| gi * t.derivative(zi))
                    .collect();
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |z: &Theta| -> f64 {
                    match self.cost(z) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = z.central_diff(&cost_func);
                if closure_err.borrow().is_some() || validate_grad(&fd_grad, dim).is_err() {
                    return Ok(run_fd_diff(z, &cost_func, &closure_err)?);
                }
                Ok(fd_grad)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    struct Shifted;

    impl Objective for Shifted {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            Ok(0.5 * ((theta[0] - 1.0).powi(2) + (theta[1] + 2.0).powi(2)))
        }
        fn grad(&self, theta: &Theta) -> OptResult<Grad> {
            Ok(array![theta[0] - 1.0, theta[1] + 2.0])
        }
    }

    struct ValueOnly;

    impl Objective for ValueOnly {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            Shifted.value(theta)
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Mapping between solver coordinates and bounded model space.
    // - Agreement of the analytic chain-rule gradient with the FD fallback.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Interior points round trip through the adapter and fixed values are
    // inserted into the full vector.
    //
    // Given
    // -----
    // - Bounds `[-5, 5]²` with parameter 1 fixed to 0.25.
    //
    // Expect
    // ------
    // - `full_vector(to_unbounded([0.4])) ≈ [0.4, 0.25]`.
    fn full_vector_round_trips_and_inserts_fixed_values() {
        // Arrange
        let mut problem =
            Problem::new(Shifted, array![-5.0, -5.0], array![5.0, 5.0]).expect("valid bounds");
        problem.fix_parameters(&[1], &[0.25]).expect("valid fix");
        let adapter = ArgMinAdapter::new(&problem);

        // Act
        let full = adapter.full_vector(&adapter.to_unbounded(&array![0.4])).expect("full vector");

        // Assert
        assert!((full[0] - 0.4).abs() < 1e-12);
        assert_eq!(full[1], 0.25);
    }

    #[test]
    // Purpose
    // -------
    // The chain-rule gradient equals a finite-difference gradient in z.
    //
    // Given
    // -----
    // - The same shifted quadratic with and without an analytic gradient,
    //   mixed bound types (interval and lower only).
    //
    // Expect
    // ------
    // - Both gradients agree to 1e-5.
    fn analytic_gradient_matches_fd_fallback() {
        let lb = array![-3.0, 0.5];
        let ub = array![4.0, f64::INFINITY];
        let p_grad = Problem::new(Shifted, lb.clone(), ub.clone()).expect("valid bounds");
        let p_fd = Problem::new(ValueOnly, lb, ub).expect("valid bounds");
        let a_grad = ArgMinAdapter::new(&p_grad);
        let a_fd = ArgMinAdapter::new(&p_fd);
        let z = array![0.3, -0.2];

        let g1 = a_grad.gradient(&z).expect("analytic gradient");
        let g2 = a_fd.gradient(&z).expect("fd gradient");

        for (a, b) in g1.iter().zip(g2.iter()) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }
}
