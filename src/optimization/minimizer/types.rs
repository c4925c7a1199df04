//! minimizer::types: numeric aliases shared by the minimizer and profiling.
//!
//! `Theta` stands for both full parameter vectors (length `dim_full`) and
//! reduced vectors over the free parameters; each API taking a `Theta`
//! says which. `Cost` is always the value being minimized.
use argmin::solver::linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

pub type Theta = Array1<f64>;
pub type Grad = Array1<f64>;
/// Dense `n × n` second-derivative matrix for a length-`n` `Theta`.
pub type Hessian = Array2<f64>;
pub type Cost = f64;

/// Solver counters keyed by name, e.g. `"cost_count"`.
pub type FnEvalMap = HashMap<String, u64>;

/// L-BFGS history size used when [`MinimizeOptions::lbfgs_mem`] is unset.
///
/// [`MinimizeOptions::lbfgs_mem`]: crate::optimization::minimizer::MinimizeOptions
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;
