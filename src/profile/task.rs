//! profile::task: the complete profile of one parameter as an engine task.
use crate::{
    engine::traits::Task,
    optimization::minimizer::traits::{Objective, Optimizer},
    problem::Problem,
    profile::{
        errors::ProfilingResult,
        next_guess::NextGuessMethod,
        options::ProfileOptions,
        walk::{WalkSettings, walk_along_profile},
        warnings::ProfileWarning,
    },
    result::profile::{Direction, ProfilerResult},
};
use std::time::Instant;

/// Output of a [`ProfilerTask`], keyed by parameter index.
///
/// `profile` is `None` when the task failed; `warnings` then holds the
/// corresponding [`ProfileWarning::TaskFailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedProfile {
    pub index: usize,
    pub profile: Option<ProfilerResult>,
    pub warnings: Vec<ProfileWarning>,
}

/// Walks one parameter down and then up from a seed profile.
///
/// The task owns its copy of the problem, so tasks for different parameters
/// never share mutable state.
#[derive(Debug, Clone)]
pub struct ProfilerTask<O: Objective, Opt: Optimizer> {
    pub index: usize,
    pub problem: Problem<O>,
    pub optimizer: Opt,
    pub options: ProfileOptions,
    pub method: NextGuessMethod,
    pub global_opt: f64,
    pub seed: ProfilerResult,
}

impl<O: Objective, Opt: Optimizer> ProfilerTask<O, Opt> {
    fn run(self) -> ProfilingResult<(ProfilerResult, Vec<ProfileWarning>)> {
        let Self { index, mut problem, optimizer, options, method, global_opt, seed } = self;
        let started = Instant::now();
        let settings =
            WalkSettings { par_index: index, optimizer: &optimizer, options: &options, method, global_opt };

        let mut profile = seed;
        let mut warnings = Vec::new();

        // Walking end last: lower end first, then back for the upper end.
        profile.flip_profile();
        warnings.extend(walk_along_profile(
            &mut profile,
            &mut problem,
            Direction::Decreasing,
            &settings,
        )?);
        profile.flip_profile();
        warnings.extend(walk_along_profile(
            &mut profile,
            &mut problem,
            Direction::Increasing,
            &settings,
        )?);

        if problem.is_fixed(index) {
            problem.unfix_parameters(&[index])?;
        }
        profile.i_par = index;
        profile.message = match warnings.is_empty() {
            true => "Profile completed".to_string(),
            false => format!("Profile completed with {} warning(s)", warnings.len()),
        };
        log::debug!(
            "Parameter {index}: {} points in {:.3}s",
            profile.len(),
            started.elapsed().as_secs_f64()
        );
        Ok((profile, warnings))
    }
}

impl<O: Objective, Opt: Optimizer> Task for ProfilerTask<O, Opt> {
    type Output = IndexedProfile;

    fn execute(self) -> IndexedProfile {
        let index = self.index;
        match self.run() {
            Ok((profile, warnings)) => IndexedProfile { index, profile: Some(profile), warnings },
            Err(e) => IndexedProfile {
                index,
                profile: None,
                warnings: vec![ProfileWarning::TaskFailed { index, reason: e.to_string() }.logged()],
            },
        }
    }
}
