//! Unified error handling for profiling.
//!
//! `ProfilingError` covers configuration problems detected before any task
//! runs (options, strategy names, indices, missing optimization results),
//! inputs to the confidence-interval helpers, and optimizer or problem
//! failures surfaced through [`OptError`]. Failures of individual profile
//! steps are not errors: they are retried and, if needed, reported as
//! warnings.
use crate::optimization::errors::OptError;

#[derive(Debug, Clone, PartialEq)]
pub enum ProfilingError {
    // ---- Options ----
    /// A numeric option violates its constraint.
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Unknown next-guess strategy name.
    InvalidNextGuessMethod {
        name: String,
    },

    // ---- Request ----
    /// No optimization result to start profiling from.
    MissingOptimizeResult,

    /// `result_index` beyond the optimization result list.
    InvalidResultIndex {
        index: usize,
        len: usize,
    },

    /// `profile_list` beyond the existing profile lists.
    InvalidProfileList {
        index: usize,
        len: usize,
    },

    /// Parameter index outside of `0..dim_full`.
    ParameterIndexOutOfRange {
        index: usize,
        dim: usize,
    },

    /// A vector or profile list has the wrong length.
    DimensionMismatch {
        expected: usize,
        found: usize,
    },

    /// Approximate profiles need at least two grid points.
    InvalidStepCount {
        n_steps: usize,
    },

    /// Approximate profiles span the bounds, which must be finite.
    NonFiniteBounds {
        index: usize,
        lb: f64,
        ub: f64,
    },

    /// The approximate variance of a parameter is not positive.
    NonPositiveVariance {
        index: usize,
        value: f64,
    },

    // ---- Confidence intervals ----
    /// `xs` and `ratios` are empty or differ in length.
    InvalidCiInput {
        xs: usize,
        ratios: usize,
    },

    /// No profile point reaches the confidence ratio.
    NoPointAboveRatio {
        confidence_ratio: f64,
    },

    /// Invalid chi-squared level or degrees of freedom.
    InvalidChi2 {
        alpha: f64,
        df: f64,
    },

    // ---- Optimization ----
    Optimization(OptError),
}

pub type ProfilingResult<T> = Result<T, ProfilingError>;

impl std::error::Error for ProfilingError {}

impl From<OptError> for ProfilingError {
    fn from(err: OptError) -> Self {
        ProfilingError::Optimization(err)
    }
}

impl std::fmt::Display for ProfilingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Options ----
            ProfilingError::InvalidOption { name, value, reason } => {
                write!(f, "Profiling Error: invalid option {name} = {value}: {reason}")
            }
            ProfilingError::InvalidNextGuessMethod { name } => write!(
                f,
                "Profiling Error: unknown next guess method '{name}', expected one of \
                 fixed_step, adaptive_step_order_0, adaptive_step_order_1, \
                 adaptive_step_regression"
            ),

            // ---- Request ----
            ProfilingError::MissingOptimizeResult => {
                write!(f, "Profiling Error: an optimization result is required to start profiling")
            }
            ProfilingError::InvalidResultIndex { index, len } => write!(
                f,
                "Profiling Error: result index {index} out of range for {len} optimization results"
            ),
            ProfilingError::InvalidProfileList { index, len } => {
                write!(f, "Profiling Error: profile list {index} out of range for {len} lists")
            }
            ProfilingError::ParameterIndexOutOfRange { index, dim } => {
                write!(f, "Profiling Error: parameter index {index} out of range for dimension {dim}")
            }
            ProfilingError::DimensionMismatch { expected, found } => {
                write!(f, "Profiling Error: dimension mismatch, expected {expected}, found {found}")
            }
            ProfilingError::InvalidStepCount { n_steps } => {
                write!(f, "Profiling Error: need at least 2 steps, got {n_steps}")
            }
            ProfilingError::NonFiniteBounds { index, lb, ub } => write!(
                f,
                "Profiling Error: bounds [{lb}, {ub}] of parameter {index} must be finite \
                 for an approximate profile"
            ),
            ProfilingError::NonPositiveVariance { index, value } => write!(
                f,
                "Profiling Error: approximate variance of parameter {index} is {value}, must be positive"
            ),

            // ---- Confidence intervals ----
            ProfilingError::InvalidCiInput { xs, ratios } => write!(
                f,
                "Profiling Error: need non-empty xs and ratios of equal length, got {xs} and {ratios}"
            ),
            ProfilingError::NoPointAboveRatio { confidence_ratio } => write!(
                f,
                "Profiling Error: no profile point has ratio >= {confidence_ratio}"
            ),
            ProfilingError::InvalidChi2 { alpha, df } => write!(
                f,
                "Profiling Error: invalid chi-squared quantile request (alpha = {alpha}, df = {df})"
            ),

            // ---- Optimization ----
            ProfilingError::Optimization(err) => write!(f, "Profiling Error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Optimizer errors convert into the profiling surface unchanged.
    //
    // Given
    // -----
    // - `OptError::MissingThetaHat`.
    //
    // Expect
    // ------
    // - `ProfilingError::Optimization(MissingThetaHat)` whose message embeds
    //   the optimizer message.
    fn from_opt_error_wraps_and_displays() {
        let err: ProfilingError = OptError::MissingThetaHat.into();
        assert_eq!(err, ProfilingError::Optimization(OptError::MissingThetaHat));
        assert!(err.to_string().contains("best parameter vector"));
    }
}
