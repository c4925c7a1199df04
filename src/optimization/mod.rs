//! optimization: local and multi-start minimization, numerical helpers,
//! and the optimizer error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer the profiling engine builds on: a bounded
//! L-BFGS minimizer, a multi-start driver producing the ranked
//! [`crate::result::OptimizeResult`] that profiles start from, numerically
//! stable bound transforms, and a single error/result surface.
//!
//! Key behaviors
//! -------------
//! - `minimizer`: objective and optimizer traits plus the Argmin-backed
//!   reference implementation.
//! - `multistart`: runs one local optimization per start point through an
//!   execution engine and ranks the outcomes.
//! - `numerical_stability`: logistic/softplus bound transforms and shared
//!   tolerances.
//! - `errors`: normalizes configuration issues, numerical failures, and
//!   backend solver errors into [`errors::OptError`] / `OptResult<T>`.
//!
//! Conventions
//! -----------
//! - Every objective is **minimized**.
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - Only `multistart` logs (failed starts, progress); the solver layer is
//!   silent unless `MinimizeOptions::verbose` is set.

pub mod errors;
pub mod minimizer;
pub mod multistart;
pub mod numerical_stability;

pub use self::multistart::minimize;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_profiles::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::minimizer::prelude::*;
    pub use super::multistart::minimize;
    pub use super::numerical_stability::BoundTransform;
}
