//! profile: likelihood profiles by constrained re-optimization.
//!
//! Purpose
//! -------
//! For each parameter of interest, step the parameter away from its
//! optimum in both directions, re-optimize all other free parameters at
//! every step, and record the resulting objective path. The likelihood
//! ratio `exp(fval_opt - fval)` along the path yields confidence intervals
//! (see [`calculate_approximate_ci`] and [`chi2_quantile_to_ratio`]) and
//! shows whether a parameter is identifiable.
//!
//! Layout
//! ------
//! - [`api`]: [`parameter_profile`] and its request / run types.
//! - [`task`]: one parameter's profile as an engine task.
//! - [`walk`]: one direction of a profile, with retries.
//! - [`next_guess`]: step proposals (fixed, adaptive, regression).
//! - [`approximate`]: Gaussian profiles from the Hessian.
//! - [`options`], [`errors`], [`warnings`], [`util`].

pub mod api;
pub mod approximate;
pub mod errors;
pub mod next_guess;
pub mod options;
pub mod task;
pub mod util;
pub mod walk;
pub mod warnings;

pub use self::api::{ProfileRequest, ProfileRun, parameter_profile};
pub use self::approximate::approximate_parameter_profile;
pub use self::errors::{ProfilingError, ProfilingResult};
pub use self::next_guess::NextGuessMethod;
pub use self::options::{ProfileOptions, ProfileOptionsBuilder};
pub use self::task::{IndexedProfile, ProfilerTask};
pub use self::util::{calculate_approximate_ci, chi2_quantile_to_ratio};
pub use self::warnings::ProfileWarning;
