//! problem: bounded objective with fixed/free parameter bookkeeping.
//!
//! Purpose
//! -------
//! Bundle an [`Objective`] with its box constraints and the set of fixed
//! parameters, and translate between **full** vectors (length `dim_full`,
//! what the objective sees) and **reduced** vectors (length `dim`, what an
//! optimizer sees).
//!
//! Key behaviors
//! -------------
//! - Validate bounds at construction (`lb <= ub`, no NaN).
//! - Fix and unfix parameters; fixing an already fixed index overwrites
//!   its value.
//! - Provide full/reduced conversions for vectors and matrices.
//! - Evaluate the objective with gradient and Hessian fallbacks based on
//!   finite differences.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x_fixed_indices` is kept sorted and duplicate free; fixed values are
//!   finite and aligned with it.
//! - A `Problem` owns its objective. Cloning it (which needs
//!   `O: Clone`) copies the objective too, so clones can fix different
//!   parameters and evaluate without touching each other's state.
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{
        finite_diff::{compute_hessian, hessian_from_values, run_fd_diff},
        traits::Objective,
        types::{Cost, Grad, Hessian, Theta},
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use ndarray::Array2;
use std::{cell::RefCell, fmt};

#[derive(Clone)]
pub struct Problem<O: Objective> {
    objective: O,
    lb_full: Theta,
    ub_full: Theta,
    x_fixed_indices: Vec<usize>,
    x_fixed_vals: Vec<f64>,
}

impl<O: Objective> fmt::Debug for Problem<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("lb_full", &self.lb_full)
            .field("ub_full", &self.ub_full)
            .field("x_fixed_indices", &self.x_fixed_indices)
            .field("x_fixed_vals", &self.x_fixed_vals)
            .finish()
    }
}

impl<O: Objective> Problem<O> {
    /// Create a problem with every parameter free.
    ///
    /// # Errors
    /// - [`OptError::BoundsDimMismatch`] if `lb` and `ub` differ in length.
    /// - [`OptError::InvalidBounds`] if a pair contains NaN or `lb > ub`.
    pub fn new(objective: O, lb: Theta, ub: Theta) -> OptResult<Self> {
        validate_bounds(&lb, &ub)?;
        Ok(Self {
            objective,
            lb_full: lb,
            ub_full: ub,
            x_fixed_indices: Vec::new(),
            x_fixed_vals: Vec::new(),
        })
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn dim_full(&self) -> usize {
        self.lb_full.len()
    }

    /// Number of free parameters.
    pub fn dim(&self) -> usize {
        self.dim_full() - self.x_fixed_indices.len()
    }

    pub fn lb_full(&self) -> &Theta {
        &self.lb_full
    }

    pub fn ub_full(&self) -> &Theta {
        &self.ub_full
    }

    /// Lower bounds of the free parameters.
    pub fn lb(&self) -> Theta {
        self.reduce(&self.lb_full)
    }

    /// Upper bounds of the free parameters.
    pub fn ub(&self) -> Theta {
        self.reduce(&self.ub_full)
    }

    pub fn x_fixed_indices(&self) -> &[usize] {
        &self.x_fixed_indices
    }

    pub fn x_fixed_vals(&self) -> &[f64] {
        &self.x_fixed_vals
    }

    pub fn x_free_indices(&self) -> Vec<usize> {
        (0..self.dim_full()).filter(|i| !self.is_fixed(*i)).collect()
    }

    pub fn is_fixed(&self, index: usize) -> bool {
        self.x_fixed_indices.binary_search(&index).is_ok()
    }

    /// Position of `index` among the free parameters, `None` if fixed or
    /// out of range.
    pub fn full_index_to_free_index(&self, index: usize) -> Option<usize> {
        if index >= self.dim_full() || self.is_fixed(index) {
            return None;
        }
        Some(index - self.x_fixed_indices.iter().filter(|&&j| j < index).count())
    }

    /// Replace the bounds, keeping the fixed parameters.
    pub fn set_bounds(&mut self, lb: Theta, ub: Theta) -> OptResult<()> {
        validate_bounds(&lb, &ub)?;
        if lb.len() != self.dim_full() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.dim_full(),
                actual: lb.len(),
            });
        }
        self.lb_full = lb;
        self.ub_full = ub;
        Ok(())
    }

    /// Fix `indices` to `values`. Already fixed indices get the new value.
    ///
    /// # Errors
    /// - [`OptError::FixedValuesMismatch`] on length mismatch.
    /// - [`OptError::IndexOutOfRange`] for an index `>= dim_full`.
    /// - [`OptError::InvalidFixedValue`] for non-finite values.
    pub fn fix_parameters(&mut self, indices: &[usize], values: &[f64]) -> OptResult<()> {
        if indices.len() != values.len() {
            return Err(OptError::FixedValuesMismatch {
                indices: indices.len(),
                values: values.len(),
            });
        }
        for (&index, &value) in indices.iter().zip(values) {
            if index >= self.dim_full() {
                return Err(OptError::IndexOutOfRange { index, dim: self.dim_full() });
            }
            if !value.is_finite() {
                return Err(OptError::InvalidFixedValue { index, value });
            }
        }
        for (&index, &value) in indices.iter().zip(values) {
            match self.x_fixed_indices.binary_search(&index) {
                Ok(pos) => self.x_fixed_vals[pos] = value,
                Err(pos) => {
                    self.x_fixed_indices.insert(pos, index);
                    self.x_fixed_vals.insert(pos, value);
                }
            }
        }
        Ok(())
    }

    /// Free `indices` again. Indices that are not fixed are ignored.
    pub fn unfix_parameters(&mut self, indices: &[usize]) -> OptResult<()> {
        for &index in indices {
            if index >= self.dim_full() {
                return Err(OptError::IndexOutOfRange { index, dim: self.dim_full() });
            }
            if let Ok(pos) = self.x_fixed_indices.binary_search(&index) {
                self.x_fixed_indices.remove(pos);
                self.x_fixed_vals.remove(pos);
            }
        }
        Ok(())
    }

    /// Insert the fixed values into a reduced vector.
    pub fn get_full_vector(&self, x_free: &Theta) -> OptResult<Theta> {
        if x_free.len() != self.dim() {
            return Err(OptError::ThetaLengthMismatch { expected: self.dim(), actual: x_free.len() });
        }
        let mut full = Theta::zeros(self.dim_full());
        let mut free = x_free.iter();
        let mut fixed = self.x_fixed_indices.iter().zip(&self.x_fixed_vals).peekable();
        for (i, slot) in full.iter_mut().enumerate() {
            match fixed.peek() {
                Some(&(&j, &v)) if j == i => {
                    *slot = v;
                    fixed.next();
                }
                _ => {
                    if let Some(&v) = free.next() {
                        *slot = v;
                    }
                }
            }
        }
        Ok(full)
    }

    /// Drop the fixed entries of a full vector.
    pub fn get_reduced_vector(&self, x_full: &Theta) -> OptResult<Theta> {
        if x_full.len() != self.dim_full() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.dim_full(),
                actual: x_full.len(),
            });
        }
        Ok(self.reduce(x_full))
    }

    /// Drop the fixed rows and columns of a full square matrix.
    pub fn get_reduced_matrix(&self, m_full: &Hessian) -> OptResult<Hessian> {
        validate_hessian_shape(m_full, self.dim_full())?;
        let free = self.x_free_indices();
        Ok(Array2::from_shape_fn((free.len(), free.len()), |(r, c)| m_full[[free[r], free[c]]]))
    }

    /// Objective value at a full vector.
    pub fn objective_value(&self, x_full: &Theta) -> OptResult<Cost> {
        if x_full.len() != self.dim_full() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.dim_full(),
                actual: x_full.len(),
            });
        }
        self.objective.value(x_full)
    }

    /// Full gradient, analytic when available, else finite differences of
    /// the value.
    pub fn objective_grad(&self, x_full: &Theta) -> OptResult<Grad> {
        match self.objective.grad(x_full) {
            Ok(g) => {
                validate_grad(&g, self.dim_full())?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost = |x: &Theta| -> f64 {
                    match self.objective_value(x) {
                        Ok(v) => v,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e.into());
                            }
                            f64::NAN
                        }
                    }
                };
                run_fd_diff(x_full, &cost, &closure_err)
            }
            Err(e) => Err(e),
        }
    }

    /// Full Hessian: analytic when available, else the finite-difference
    /// Jacobian of the analytic gradient, else second differences of the
    /// value.
    pub fn objective_hessian(&self, x_full: &Theta) -> OptResult<Hessian> {
        match self.objective.hessian(x_full) {
            Ok(h) => {
                validate_hessian(&h, self.dim_full())?;
                Ok(h)
            }
            Err(OptError::HessianNotImplemented) => match self.objective.grad(x_full) {
                Ok(_) => {
                    let grad = |x: &Theta| -> Grad {
                        self.objective
                            .grad(x)
                            .unwrap_or_else(|_| Grad::from_elem(x.len(), f64::NAN))
                    };
                    compute_hessian(&grad, x_full)
                }
                Err(OptError::GradientNotImplemented) => {
                    let value = |x: &Theta| -> f64 { self.objective.value(x).unwrap_or(f64::NAN) };
                    hessian_from_values(&value, x_full)
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    fn reduce(&self, x_full: &Theta) -> Theta {
        self.x_free_indices().iter().map(|&i| x_full[i]).collect()
    }
}

fn validate_bounds(lb: &Theta, ub: &Theta) -> OptResult<()> {
    if lb.len() != ub.len() {
        return Err(OptError::BoundsDimMismatch { lb: lb.len(), ub: ub.len() });
    }
    for (index, (&l, &u)) in lb.iter().zip(ub).enumerate() {
        if l.is_nan() || u.is_nan() || l > u {
            return Err(OptError::InvalidBounds { index, lb: l, ub: u });
        }
    }
    Ok(())
}

fn validate_hessian_shape(m: &Hessian, dim: usize) -> OptResult<()> {
    if m.nrows() != dim || m.ncols() != dim {
        return Err(OptError::HessianDimMismatch { expected: dim, found: (m.nrows(), m.ncols()) });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct Quadratic;

    impl Objective for Quadratic {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            Ok(0.5 * theta.dot(theta))
        }
    }

    /// `½‖x‖²` that counts its evaluations.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl Clone for Counting {
        fn clone(&self) -> Self {
            Self { calls: AtomicUsize::new(self.calls.load(Ordering::SeqCst)) }
        }
    }

    impl Objective for Counting {
        fn value(&self, theta: &Theta) -> OptResult<Cost> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0.5 * theta.dot(theta))
        }
    }

    fn problem() -> Problem<Quadratic> {
        Problem::new(Quadratic, array![-1.0, -2.0, -3.0], array![1.0, 2.0, 3.0])
            .expect("valid bounds")
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Bound validation at construction.
    // - Fix/unfix bookkeeping and full/reduced conversions.
    // - Finite-difference fallbacks for gradient and Hessian.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Inverted or mismatched bounds are rejected.
    //
    // Given
    // -----
    // - `lb = [1]`, `ub = [0]` and a length mismatch.
    //
    // Expect
    // ------
    // - `InvalidBounds` and `BoundsDimMismatch`.
    fn new_rejects_invalid_bounds() {
        assert!(matches!(
            Problem::new(Quadratic, array![1.0], array![0.0]),
            Err(OptError::InvalidBounds { index: 0, .. })
        ));
        assert!(matches!(
            Problem::new(Quadratic, array![0.0, 0.0], array![1.0]),
            Err(OptError::BoundsDimMismatch { lb: 2, ub: 1 })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Fixing a parameter shrinks the free views and round trips vectors.
    //
    // Given
    // -----
    // - A 3-parameter problem with index 1 fixed to 0.5.
    //
    // Expect
    // ------
    // - Free indices `[0, 2]`, reduced bounds skip index 1.
    // - `get_full_vector([7, 9]) == [7, 0.5, 9]` and back.
    fn fix_parameters_updates_views_and_conversions() {
        // Arrange
        let mut p = problem();

        // Act
        p.fix_parameters(&[1], &[0.5]).expect("valid fix");

        // Assert
        assert_eq!(p.dim(), 2);
        assert_eq!(p.x_free_indices(), vec![0, 2]);
        assert_eq!(p.lb(), array![-1.0, -3.0]);
        assert_eq!(p.full_index_to_free_index(2), Some(1));
        assert_eq!(p.full_index_to_free_index(1), None);
        let full = p.get_full_vector(&array![7.0, 9.0]).expect("reduced length");
        assert_eq!(full, array![7.0, 0.5, 9.0]);
        assert_eq!(p.get_reduced_vector(&full).expect("full length"), array![7.0, 9.0]);
    }

    #[test]
    // Purpose
    // -------
    // Refixing overwrites the value; unfixing restores the free set; clones
    // are independent.
    //
    // Given
    // -----
    // - Index 2 fixed twice, then a clone that unfixes it.
    //
    // Expect
    // ------
    // - The original keeps one fixed entry with the latest value.
    // - The clone has every parameter free.
    fn refix_overwrites_and_clones_are_independent() {
        let mut p = problem();
        p.fix_parameters(&[2], &[1.0]).expect("valid fix");
        p.fix_parameters(&[2], &[2.0]).expect("valid refix");
        let mut q = p.clone();
        q.unfix_parameters(&[2]).expect("valid unfix");

        assert_eq!(p.x_fixed_indices(), &[2]);
        assert_eq!(p.x_fixed_vals(), &[2.0]);
        assert!(q.x_fixed_indices().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A clone carries its own copy of the objective, so evaluations through
    // the clone leave the original's state alone.
    //
    // Given
    // -----
    // - A counting objective evaluated once through the original, then
    //   three times through a clone.
    //
    // Expect
    // ------
    // - The original counts 1 call, the clone 4.
    fn clones_evaluate_their_own_objective() {
        let p = Problem::new(Counting::default(), array![-1.0, -1.0], array![1.0, 1.0])
            .expect("valid bounds");
        let x = array![0.5, 0.5];
        p.objective_value(&x).expect("finite value");

        let q = p.clone();
        for _ in 0..3 {
            q.objective_value(&x).expect("finite value");
        }

        assert_eq!(p.objective().calls.load(Ordering::SeqCst), 1);
        assert_eq!(q.objective().calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    // Purpose
    // -------
    // Fixed values are placed at their indices with free values filling the
    // gaps in order.
    //
    // Given
    // -----
    // - Indices 0 and 2 of four fixed to 7 and 9; free values `[1, 2]`.
    //
    // Expect
    // ------
    // - `[7, 1, 9, 2]`, and the reduced vector round-trips to `[1, 2]`.
    fn full_vector_interleaves_fixed_and_free_values() {
        let mut p = Problem::new(Quadratic, Theta::from_elem(4, -10.0), Theta::from_elem(4, 10.0))
            .expect("valid bounds");
        p.fix_parameters(&[2, 0], &[9.0, 7.0]).expect("valid fix");

        let full = p.get_full_vector(&array![1.0, 2.0]).expect("matching length");

        assert_eq!(full, array![7.0, 1.0, 9.0, 2.0]);
        assert_eq!(p.get_reduced_vector(&full).expect("full length"), array![1.0, 2.0]);
    }

    #[test]
    // Purpose
    // -------
    // Invalid fix requests are rejected without modifying the problem.
    //
    // Given
    // -----
    // - An out-of-range index and a NaN value.
    //
    // Expect
    // ------
    // - `IndexOutOfRange` and `InvalidFixedValue`; no parameter fixed.
    fn fix_parameters_rejects_invalid_requests() {
        let mut p = problem();
        assert!(matches!(
            p.fix_parameters(&[3], &[0.0]),
            Err(OptError::IndexOutOfRange { index: 3, dim: 3 })
        ));
        assert!(matches!(
            p.fix_parameters(&[0], &[f64::NAN]),
            Err(OptError::InvalidFixedValue { index: 0, .. })
        ));
        assert_eq!(p.dim(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Without analytic derivatives, gradient and Hessian fall back to
    // finite differences.
    //
    // Given
    // -----
    // - `f(x) = ½‖x‖²` at `x = [1, -1, 0.5]`.
    //
    // Expect
    // ------
    // - Gradient ≈ x, Hessian ≈ I, and the reduced matrix drops row/col 0
    //   once index 0 is fixed.
    fn derivative_fallbacks_match_quadratic() {
        let mut p = problem();
        let x = array![1.0, -1.0, 0.5];

        let g = p.objective_grad(&x).expect("fd gradient");
        let h = p.objective_hessian(&x).expect("fd hessian");

        for i in 0..3 {
            assert!((g[i] - x[i]).abs() < 1e-5);
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((h[[i, j]] - expected).abs() < 1e-4);
            }
        }
        p.fix_parameters(&[0], &[1.0]).expect("valid fix");
        let reduced = p.get_reduced_matrix(&h).expect("square");
        assert_eq!(reduced.dim(), (2, 2));
        assert!((reduced[[0, 0]] - 1.0).abs() < 1e-4);
    }
}
