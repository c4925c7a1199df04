//! profile::approximate: Gaussian profile approximation from the Hessian.
//!
//! Purpose
//! -------
//! Provide a cheap stand-in for a walked profile. Around the optimum
//! `θ̂`, the objective is approximated by its second-order expansion, so the
//! profile of parameter `i` is a normal density with mean `θ̂_i` and
//! variance `(H⁺)_{ii}`, where `H⁺` is the pseudo-inverse of the reduced
//! Hessian.
//!
//! Conventions
//! -----------
//! - The grid spans `[lb_full[i], ub_full[i]]` with `n_steps` equidistant
//!   points; the other coordinates of every path vector stay at `θ̂`.
//! - `fval_path = -ln pdf`, `ratio_path = pdf / max pdf`.
//! - The Hessian stored with the optimization result is taken as a full
//!   `dim_full × dim_full` matrix. Without one, the problem's Hessian at
//!   `θ̂` is used (analytic, else finite differences).
//! - Eigenvalues with magnitude at most [`EIGEN_EPS`] are dropped from the
//!   pseudo-inverse.
use crate::{
    optimization::{
        minimizer::{traits::Objective, types::Hessian},
        numerical_stability::transformations::EIGEN_EPS,
    },
    problem::Problem,
    profile::{
        errors::{ProfilingError, ProfilingResult},
        util::check_parameter_index,
        warnings::ProfileWarning,
    },
    result::{EstimationResult, profile::ProfilerResult},
};
use nalgebra::DMatrix;
use ndarray::Array1;
use statrs::distribution::{Continuous, Normal};

/// Write Gaussian approximate profiles into the result store.
///
/// - `profile_index`: parameters to approximate, default the free ones.
///   Fixed parameters are skipped with a warning.
/// - `profile_list`: `None` appends a new list, `Some(k)` writes into
///   list `k`.
/// - `result_index`: optimization result to expand around.
///
/// Returns the index of the written profile list and the warnings raised.
///
/// # Errors
/// - [`ProfilingError::InvalidStepCount`] for `n_steps < 2`.
/// - [`ProfilingError::MissingOptimizeResult`] /
///   [`ProfilingError::InvalidResultIndex`].
/// - [`ProfilingError::ParameterIndexOutOfRange`] /
///   [`ProfilingError::InvalidProfileList`].
/// - [`ProfilingError::NonFiniteBounds`] if a requested free parameter has
///   an infinite bound.
/// - [`ProfilingError::NonPositiveVariance`] if the pseudo-inverse has a
///   non-positive diagonal entry for a requested parameter.
/// - Hessian errors from the problem.
pub fn approximate_parameter_profile<O: Objective>(
    problem: &Problem<O>, result: &mut EstimationResult, profile_index: Option<&[usize]>,
    profile_list: Option<usize>, result_index: usize, n_steps: usize,
) -> ProfilingResult<(usize, Vec<ProfileWarning>)> {
    if n_steps < 2 {
        return Err(ProfilingError::InvalidStepCount { n_steps });
    }
    if result.optimize_result.is_empty() {
        return Err(ProfilingError::MissingOptimizeResult);
    }
    let start = result.optimize_result.get(result_index).ok_or(
        ProfilingError::InvalidResultIndex { index: result_index, len: result.optimize_result.len() },
    )?;
    if start.x.len() != problem.dim_full() {
        return Err(ProfilingError::DimensionMismatch {
            expected: problem.dim_full(),
            found: start.x.len(),
        });
    }
    if let Some(k) = profile_list {
        result.profile_result.profile_list(k)?;
    }

    let indices = match profile_index {
        Some(indices) => indices.to_vec(),
        None => problem.x_free_indices(),
    };
    let mut warnings = Vec::new();
    let mut targets = Vec::with_capacity(indices.len());
    for &i in &indices {
        check_parameter_index(i, problem)?;
        match problem.full_index_to_free_index(i) {
            Some(free) => {
                let (lb, ub) = (problem.lb_full()[i], problem.ub_full()[i]);
                if !lb.is_finite() || !ub.is_finite() {
                    return Err(ProfilingError::NonFiniteBounds { index: i, lb, ub });
                }
                targets.push((i, free));
            }
            None => warnings.push(ProfileWarning::FixedParameterSkipped { index: i }.logged()),
        }
    }

    let x_hat = start.x.clone();
    let hess_full = match &start.hess {
        Some(h) => h.clone(),
        None => {
            log::info!("No stored Hessian for result {result_index}; evaluating it at the optimum");
            problem.objective_hessian(&x_hat)?
        }
    };
    let variances = pinv_diagonal(&problem.get_reduced_matrix(&hess_full)?);

    let mut profiles = Vec::with_capacity(targets.len());
    for (i, free) in targets {
        let variance = variances[free];
        if !(variance > 0.0) || !variance.is_finite() {
            return Err(ProfilingError::NonPositiveVariance { index: i, value: variance });
        }
        profiles.push(gaussian_profile(problem, &x_hat, i, variance, n_steps)?);
    }

    let list_index = match profile_list {
        Some(k) => k,
        None => result.profile_result.append_empty_profile_list(problem.dim_full()),
    };
    for profile in profiles {
        let i = profile.i_par;
        result.profile_result.set_profiler_result(list_index, i, profile)?;
    }
    Ok((list_index, warnings))
}

fn gaussian_profile<O: Objective>(
    problem: &Problem<O>, x_hat: &Array1<f64>, i: usize, variance: f64, n_steps: usize,
) -> ProfilingResult<ProfilerResult> {
    let normal = Normal::new(x_hat[i], variance.sqrt())
        .map_err(|_| ProfilingError::NonPositiveVariance { index: i, value: variance })?;
    let xs = Array1::linspace(problem.lb_full()[i], problem.ub_full()[i], n_steps);
    let log_pdf: Vec<f64> = xs.iter().map(|&x| normal.ln_pdf(x)).collect();
    let optimum_index = log_pdf
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(k, _)| k);
    let log_pdf_max = log_pdf[optimum_index];

    let x_path = xs
        .iter()
        .map(|&x| {
            let mut v = x_hat.clone();
            v[i] = x;
            v
        })
        .collect();
    Ok(ProfilerResult {
        x_path,
        fval_path: log_pdf.iter().map(|l| -l).collect(),
        ratio_path: log_pdf.iter().map(|l| (l - log_pdf_max).exp()).collect(),
        gradnorm_path: vec![f64::NAN; n_steps],
        converged_path: vec![true; n_steps],
        time_path: vec![0.0; n_steps],
        optimum_index,
        i_par: i,
        n_fval: 0,
        time_total: 0.0,
        message: "Gaussian approximation".to_string(),
    })
}

/// Diagonal of the eigen-truncated pseudo-inverse of a symmetric matrix:
/// `Σ_{k: λ_k > EIGEN_EPS} Q[i,k]² / λ_k`.
fn pinv_diagonal(hess: &Hessian) -> Vec<f64> {
    let n = hess.nrows();
    let h = DMatrix::from_fn(n, n, |r, c| 0.5 * (hess[[r, c]] + hess[[c, r]]));
    let eigen = h.symmetric_eigen();
    let q = eigen.eigenvectors;
    (0..n)
        .map(|i| {
            eigen
                .eigenvalues
                .iter()
                .enumerate()
                .filter(|(_, lambda)| **lambda > EIGEN_EPS)
                .map(|(k, &lambda)| q[(i, k)] * q[(i, k)] / lambda)
                .sum::<f64>()
        })
        .collect()
}
