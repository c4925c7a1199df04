//! profile::api: entry point for computing parameter profiles.
//!
//! Purpose
//! -------
//! Validate a profiling request against the problem and the stored
//! optimization result, build one [`ProfilerTask`] per parameter, run them
//! on an [`Engine`], and write the finished profiles into the result store.
//!
//! Key behaviors
//! -------------
//! - All configuration errors are raised before any task runs, and nothing
//!   is written to the store in that case.
//! - Each task gets its own clone of the problem; the caller's problem is
//!   never mutated.
//! - Extending an existing profile list seeds each task with the stored
//!   profile, so walks resume where the previous run ended.
use crate::{
    engine::traits::Engine,
    optimization::minimizer::traits::{Objective, Optimizer},
    problem::Problem,
    profile::{
        errors::{ProfilingError, ProfilingResult},
        next_guess::NextGuessMethod,
        options::ProfileOptions,
        task::ProfilerTask,
        util::{check_parameter_index, initialize_profile},
        warnings::ProfileWarning,
    },
    result::EstimationResult,
};
use serde::{Deserialize, Serialize};

/// What to profile and how.
///
/// Defaults: all free parameters, a new profile list, the best optimization
/// result as start, `adaptive_step_order_1`, default options, no progress
/// logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub profile_index: Option<Vec<usize>>,
    pub profile_list: Option<usize>,
    pub result_index: usize,
    pub next_guess_method: NextGuessMethod,
    pub options: ProfileOptions,
    pub progress_bar: bool,
}

impl ProfileRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile_index(mut self, indices: Vec<usize>) -> Self {
        self.profile_index = Some(indices);
        self
    }

    /// Write into (and resume from) an existing profile list.
    pub fn with_profile_list(mut self, list_index: usize) -> Self {
        self.profile_list = Some(list_index);
        self
    }

    pub fn with_result_index(mut self, result_index: usize) -> Self {
        self.result_index = result_index;
        self
    }

    pub fn with_next_guess_method(mut self, method: NextGuessMethod) -> Self {
        self.next_guess_method = method;
        self
    }

    pub fn with_options(mut self, options: ProfileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress_bar(mut self, progress_bar: bool) -> Self {
        self.progress_bar = progress_bar;
        self
    }
}

/// Summary of a profiling run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRun {
    /// Index of the profile list that was written.
    pub profile_list: usize,
    pub warnings: Vec<ProfileWarning>,
}

/// Compute profiles and store them in `result.profile_result`.
///
/// # Behavior
/// - The start point is `optimize_result[result_index]`; ratios are taken
///   relative to the best value `optimize_result[0]`.
/// - Fixed parameters among the requested indices are skipped with a
///   [`ProfileWarning::FixedParameterSkipped`].
/// - Tasks that fail leave their slot untouched and report
///   [`ProfileWarning::TaskFailed`].
///
/// # Errors
/// - [`ProfilingError::InvalidOption`] from option validation.
/// - [`ProfilingError::MissingOptimizeResult`],
///   [`ProfilingError::InvalidResultIndex`].
/// - [`ProfilingError::ParameterIndexOutOfRange`],
///   [`ProfilingError::InvalidProfileList`],
///   [`ProfilingError::DimensionMismatch`].
///
/// # Example
/// ```no_run
/// use ndarray::array;
/// use rust_profiles::engine::SingleCoreEngine;
/// use rust_profiles::optimization::{
///     errors::OptResult,
///     minimize,
///     minimizer::{LbfgsOptimizer, Objective, Theta},
/// };
/// use rust_profiles::problem::Problem;
/// use rust_profiles::profile::{ProfileRequest, parameter_profile};
/// use rust_profiles::result::EstimationResult;
///
/// #[derive(Clone)]
/// struct Bowl;
/// impl Objective for Bowl {
///     fn value(&self, t: &Theta) -> OptResult<f64> {
///         Ok(0.5 * t.dot(t))
///     }
/// }
///
/// let problem = Problem::new(Bowl, array![-5.0, -5.0], array![5.0, 5.0])?;
/// let optimizer = LbfgsOptimizer::default();
/// let engine = SingleCoreEngine::new();
/// let optimized = minimize(&problem, &optimizer, &engine, vec![array![1.0, 1.0]], false)?;
/// let mut result = EstimationResult::new(optimized);
///
/// let run = parameter_profile(&problem, &mut result, &optimizer, &engine, &ProfileRequest::new())?;
/// println!("{} warnings", run.warnings.len());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parameter_profile<O, Opt, E>(
    problem: &Problem<O>, result: &mut EstimationResult, optimizer: &Opt, engine: &E,
    request: &ProfileRequest,
) -> ProfilingResult<ProfileRun>
where
    O: Objective + Clone,
    Opt: Optimizer,
    E: Engine,
{
    request.options.validate()?;

    let best = result.optimize_result.get(0).ok_or(ProfilingError::MissingOptimizeResult)?;
    let start = result.optimize_result.get(request.result_index).ok_or(
        ProfilingError::InvalidResultIndex {
            index: request.result_index,
            len: result.optimize_result.len(),
        },
    )?;
    if start.x.len() != problem.dim_full() {
        return Err(ProfilingError::DimensionMismatch {
            expected: problem.dim_full(),
            found: start.x.len(),
        });
    }
    let global_opt = best.fval;

    if let Some(k) = request.profile_list {
        let list = result.profile_result.profile_list(k)?;
        if list.len() != problem.dim_full() {
            return Err(ProfilingError::DimensionMismatch {
                expected: problem.dim_full(),
                found: list.len(),
            });
        }
    }

    let mut indices = match &request.profile_index {
        Some(indices) => indices.clone(),
        None => problem.x_free_indices(),
    };
    indices.sort_unstable();
    indices.dedup();
    for &i in &indices {
        check_parameter_index(i, problem)?;
    }

    let mut warnings = Vec::new();
    let mut tasks = Vec::with_capacity(indices.len());
    for i in indices {
        if problem.is_fixed(i) {
            warnings.push(ProfileWarning::FixedParameterSkipped { index: i }.logged());
            continue;
        }
        let stored = match request.profile_list {
            Some(k) => result.profile_result.get_profiler_result(i, k)?.cloned(),
            None => None,
        };
        let seed = stored.unwrap_or_else(|| initialize_profile(i, start, global_opt));
        tasks.push(ProfilerTask {
            index: i,
            problem: problem.clone(),
            optimizer: optimizer.clone(),
            options: request.options.clone(),
            method: request.next_guess_method,
            global_opt,
            seed,
        });
    }

    let list_index = match request.profile_list {
        Some(k) => k,
        None => result.profile_result.append_empty_profile_list(problem.dim_full()),
    };
    log::debug!(
        "Profiling {} parameter(s) into list {list_index} with {}",
        tasks.len(),
        request.next_guess_method
    );

    for output in engine.execute(tasks, request.progress_bar) {
        warnings.extend(output.warnings);
        if let Some(profile) = output.profile {
            result.profile_result.set_profiler_result(list_index, output.index, profile)?;
        }
    }

    Ok(ProfileRun { profile_list: list_index, warnings })
}
