//! profile::util: helpers for reading confidence intervals off profiles.
use crate::{
    optimization::minimizer::traits::Objective,
    problem::Problem,
    profile::errors::{ProfilingError, ProfilingResult},
    result::{
        optimize::OptimizerResult,
        profile::{ProfilePoint, ProfilerResult},
    },
};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Likelihood ratio matching a chi-squared confidence level.
///
/// Returns `exp(-q / 2)` with `q` the `alpha` quantile of a chi-squared
/// distribution with `df` degrees of freedom. `chi2_quantile_to_ratio(0.95,
/// 1.0)` is about 0.1465.
///
/// # Errors
/// [`ProfilingError::InvalidChi2`] unless `0 < alpha < 1` and `df > 0`.
pub fn chi2_quantile_to_ratio(alpha: f64, df: f64) -> ProfilingResult<f64> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ProfilingError::InvalidChi2 { alpha, df });
    }
    let chi2 = ChiSquared::new(df).map_err(|_| ProfilingError::InvalidChi2 { alpha, df })?;
    let quantile = chi2.inverse_cdf(alpha);
    Ok((-quantile / 2.0).exp())
}

/// Approximate confidence interval `(lb, ub)` from a profile.
///
/// Takes the outermost points with `ratio >= confidence_ratio` and
/// interpolates linearly with their outer neighbours to the point where the
/// ratio equals `confidence_ratio`. At either end of `xs` the end value
/// itself is used. `xs` is expected in increasing order.
///
/// # Errors
/// - [`ProfilingError::InvalidCiInput`] for empty or unequal inputs.
/// - [`ProfilingError::NoPointAboveRatio`] if no ratio reaches the level.
pub fn calculate_approximate_ci(
    xs: &[f64], ratios: &[f64], confidence_ratio: f64,
) -> ProfilingResult<(f64, f64)> {
    if xs.is_empty() || xs.len() != ratios.len() {
        return Err(ProfilingError::InvalidCiInput { xs: xs.len(), ratios: ratios.len() });
    }
    let above = |r: &f64| *r >= confidence_ratio;
    let (Some(l_ind), Some(u_ind)) = (ratios.iter().position(above), ratios.iter().rposition(above))
    else {
        return Err(ProfilingError::NoPointAboveRatio { confidence_ratio });
    };

    let interpolate = |inner: usize, outer: usize| {
        let (x_in, r_in) = (xs[inner], ratios[inner]);
        let (x_out, r_out) = (xs[outer], ratios[outer]);
        x_out + (confidence_ratio - r_out) / (r_in - r_out) * (x_in - x_out)
    };

    let lb = if l_ind == 0 { xs[0] } else { interpolate(l_ind, l_ind - 1) };
    let ub = if u_ind == xs.len() - 1 { xs[u_ind] } else { interpolate(u_ind, u_ind + 1) };
    Ok((lb, ub))
}

/// Single-point profile at an optimization result.
pub(crate) fn initialize_profile(
    i_par: usize, start: &OptimizerResult, global_opt: f64,
) -> ProfilerResult {
    ProfilerResult::new(
        i_par,
        ProfilePoint {
            x: start.x.clone(),
            fval: start.fval,
            ratio: (global_opt - start.fval).exp(),
            gradnorm: start.grad_norm.unwrap_or(f64::NAN),
            converged: start.converged,
            time: 0.0,
            n_fval: 0,
        },
    )
}

/// Reject indices outside `0..dim_full`.
pub(crate) fn check_parameter_index<O: Objective>(
    index: usize, problem: &Problem<O>,
) -> ProfilingResult<()> {
    if index >= problem.dim_full() {
        return Err(ProfilingError::ParameterIndexOutOfRange { index, dim: problem.dim_full() });
    }
    Ok(())
}
