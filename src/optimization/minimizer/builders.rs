//! minimizer::builders: L-BFGS construction from [`MinimizeOptions`].
//!
//! The builder fixes the history size and the optional tolerances. The
//! start point and iteration cap are applied later by
//! [`crate::optimization::minimizer::run::run_lbfgs`].
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::MinimizeOptions,
        types::{Cost, DEFAULT_LBFGS_MEM, Grad, Theta},
    },
};

/// L-BFGS solver over this crate's numeric types with line search `L`.
pub type Lbfgs<L> = LBFGS<L, Theta, Grad, Cost>;

/// Build an L-BFGS solver around `linesearch`.
///
/// Memory is `opts.lbfgs_mem`, or [`DEFAULT_LBFGS_MEM`] when unset. Argmin
/// rejections of a tolerance come back as
/// [`OptError::Solver`](crate::optimization::errors::OptError::Solver).
pub fn lbfgs_with<L>(linesearch: L, opts: &MinimizeOptions) -> OptResult<Lbfgs<L>> {
    let mut solver = LBFGS::new(linesearch, opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM));
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::minimizer::{
        traits::{LineSearcher, Tolerances},
        types::{HagerZhangLS, MoreThuenteLS},
    };

    #[test]
    // Purpose
    // -------
    // Both line searches build with default and explicit memory, and with
    // only an iteration cap set.
    //
    // Given
    // -----
    // - Tolerance sets `(1e-6, 1e-8, 50)` and `(None, None, 50)`.
    // - `lbfgs_mem = None` and `Some(11)`.
    //
    // Expect
    // ------
    // - `Ok(_)` from every call.
    fn lbfgs_with_accepts_every_option_combination() {
        let full = Tolerances::new(Some(1e-6), Some(1e-8), Some(50)).expect("valid tolerances");
        let cap_only = Tolerances::new(None, None, Some(50)).expect("valid tolerances");

        for tols in [full, cap_only] {
            for mem in [None, Some(11)] {
                let opts = MinimizeOptions::new(tols, LineSearcher::HagerZhang, false, mem)
                    .expect("options should be valid");
                assert!(lbfgs_with(HagerZhangLS::new(), &opts).is_ok());
                assert!(lbfgs_with(MoreThuenteLS::new(), &opts).is_ok());
            }
        }
    }
}
