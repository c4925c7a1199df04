//! rust_profiles: profile likelihoods for fitted models.
//!
//! Purpose
//! -------
//! Compute objective-function profiles for the parameters of a fitted
//! model. For every parameter of interest the parameter is stepped away
//! from its optimum while all other free parameters are re-optimized, which
//! traces out a one-dimensional profile. Profiles yield confidence
//! intervals and reveal non-identifiable parameters.
//!
//! Key behaviors
//! -------------
//! - [`problem::Problem`] bundles an [`optimization::minimizer::Objective`]
//!   with box bounds and fixed parameters.
//! - [`optimization::minimize`] runs a multi-start local optimization
//!   (bounded L-BFGS by default) and ranks the results.
//! - [`profile::parameter_profile`] walks profiles with fixed or adaptive
//!   steps; [`profile::approximate_parameter_profile`] derives Gaussian
//!   profiles from the Hessian.
//! - [`engine`] runs independent tasks sequentially or on a rayon pool.
//! - [`result::EstimationResult`] carries optimization and profile results
//!   between calls.
//!
//! Conventions
//! -----------
//! - Objectives are minimized; for likelihoods pass the negative
//!   log-likelihood.
//! - Parameter vectors handed to objectives and stored in results are
//!   full-dimensional; optimizers work on the free (reduced) coordinates.
//! - The crate logs through the `log` facade and never installs a logger.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use ndarray::array;
//! use rust_profiles::engine::MultiThreadEngine;
//! use rust_profiles::optimization::{
//!     errors::OptResult,
//!     minimize,
//!     minimizer::{Grad, LbfgsOptimizer, Objective, Theta},
//! };
//! use rust_profiles::problem::Problem;
//! use rust_profiles::profile::{
//!     ProfileRequest, calculate_approximate_ci, chi2_quantile_to_ratio, parameter_profile,
//! };
//! use rust_profiles::result::EstimationResult;
//!
//! #[derive(Clone)]
//! struct Model;
//! impl Objective for Model {
//!     fn value(&self, t: &Theta) -> OptResult<f64> {
//!         Ok(0.5 * (t[0] - 1.0).powi(2) + 0.5 * (t[1] - t[0]).powi(2))
//!     }
//!     fn grad(&self, t: &Theta) -> OptResult<Grad> {
//!         Ok(array![2.0 * t[0] - t[1] - 1.0, t[1] - t[0]])
//!     }
//! }
//!
//! let problem = Problem::new(Model, array![-5.0, -5.0], array![5.0, 5.0])?;
//! let optimizer = LbfgsOptimizer::default();
//! let engine = MultiThreadEngine::new(None)?;
//! let starts = vec![array![0.0, 0.0], array![2.0, -1.0]];
//! let mut result = EstimationResult::new(minimize(&problem, &optimizer, &engine, starts, false)?);
//!
//! let run = parameter_profile(&problem, &mut result, &optimizer, &engine, &ProfileRequest::new())?;
//! let level = chi2_quantile_to_ratio(0.95, 1.0)?;
//! if let Some(p) = result.profile_result.get_profiler_result(0, run.profile_list)? {
//!     let (lb, ub) = calculate_approximate_ci(&p.par_values(), &p.ratio_path, level)?;
//!     println!("95% CI for parameter 0: [{lb:.3}, {ub:.3}]");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod engine;
pub mod optimization;
pub mod problem;
pub mod profile;
pub mod result;
