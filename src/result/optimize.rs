//! result::optimize: ranked local optimization results.
use crate::optimization::minimizer::{
    traits::OptimOutcome,
    types::{Hessian, Theta},
};
use serde::{Deserialize, Serialize};

/// Outcome of one local optimization run, in model space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerResult {
    /// Start identifier (position in the start-point list).
    pub id: usize,
    /// Full optimum.
    pub x: Theta,
    pub fval: f64,
    /// Full start point.
    pub x0: Theta,
    pub hess: Option<Hessian>,
    pub grad_norm: Option<f64>,
    pub n_fval: usize,
    pub n_iter: usize,
    pub time: f64,
    pub converged: bool,
    pub message: String,
}

impl OptimizerResult {
    pub fn from_outcome(id: usize, x0: Theta, outcome: OptimOutcome, time: f64) -> Self {
        let n_fval = outcome.n_fval();
        Self {
            id,
            x: outcome.theta_hat,
            fval: outcome.value,
            x0,
            hess: outcome.hess,
            grad_norm: outcome.grad_norm,
            n_fval,
            n_iter: outcome.iterations,
            time,
            converged: outcome.converged,
            message: outcome.status,
        }
    }
}

/// Optimization results sorted by objective value, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizeResult {
    pub list: Vec<OptimizerResult>,
}

impl OptimizeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result and keep the list sorted by `fval`; NaN sorts last.
    pub fn append(&mut self, result: OptimizerResult) {
        self.list.push(result);
        self.sort();
    }

    pub fn sort(&mut self) {
        self.list.sort_by(|a, b| a.fval.total_cmp(&b.fval));
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OptimizerResult> {
        self.list.get(index)
    }

    pub fn best(&self) -> Option<&OptimizerResult> {
        self.list.first()
    }

    pub fn fvals(&self) -> Vec<f64> {
        self.list.iter().map(|r| r.fval).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn result(id: usize, fval: f64) -> OptimizerResult {
        OptimizerResult {
            id,
            x: array![fval],
            fval,
            x0: array![0.0],
            hess: None,
            grad_norm: None,
            n_fval: 1,
            n_iter: 0,
            time: 0.0,
            converged: true,
            message: String::new(),
        }
    }

    #[test]
    // Purpose
    // -------
    // Appending keeps the best result first.
    //
    // Given
    // -----
    // - Results with values 3, -1, 2 appended in that order.
    //
    // Expect
    // ------
    // - `fvals() == [-1, 2, 3]`, `best().id == 1`.
    fn append_keeps_results_sorted() {
        let mut res = OptimizeResult::new();
        for (id, fval) in [3.0, -1.0, 2.0].into_iter().enumerate() {
            res.append(result(id, fval));
        }

        assert_eq!(res.fvals(), vec![-1.0, 2.0, 3.0]);
        assert_eq!(res.best().map(|r| r.id), Some(1));
    }
}
