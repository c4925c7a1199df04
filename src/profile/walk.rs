//! profile::walk: one direction of a profile.
//!
//! Each iteration checks the stop conditions at the walking end, proposes
//! the next point, fixes the profiled parameter to the proposed value, and
//! re-optimizes the remaining free parameters from the proposal. Steps
//! whose re-optimization fails or does not converge are retried with a
//! halved step-size cap.
use crate::{
    optimization::minimizer::{
        traits::{Objective, Optimizer},
        types::Theta,
    },
    problem::Problem,
    profile::{
        errors::ProfilingResult,
        next_guess::{GuessContext, NextGuessMethod, next_guess},
        options::ProfileOptions,
        warnings::ProfileWarning,
    },
    result::profile::{Direction, ProfilePoint, ProfilerResult},
};
use std::time::Instant;

/// Fixed inputs of a walk.
pub struct WalkSettings<'a, Opt: Optimizer> {
    pub par_index: usize,
    pub optimizer: &'a Opt,
    pub options: &'a ProfileOptions,
    pub method: NextGuessMethod,
    pub global_opt: f64,
}

/// Extend `profile` at its last point in `direction`.
///
/// The profile must be oriented so that its walking end is last. The
/// problem is used as working copy: the profiled parameter is (re)fixed
/// before every re-optimization and stays fixed on return.
///
/// Returns the warnings raised while walking.
///
/// # Errors
/// Only structural problems (index or dimension mismatches between the
/// profile and the problem). Optimizer failures are retried and at worst
/// truncate the direction.
pub fn walk_along_profile<O: Objective, Opt: Optimizer>(
    profile: &mut ProfilerResult, problem: &mut Problem<O>, direction: Direction,
    settings: &WalkSettings<'_, Opt>,
) -> ProfilingResult<Vec<ProfileWarning>> {
    let i = settings.par_index;
    let options = settings.options;
    let mut warnings = Vec::new();
    let mut n_steps = 0usize;

    loop {
        let Some(x_now) = profile.last_x().cloned() else { break };
        if should_stop(&x_now, profile, problem, direction, settings) {
            break;
        }
        if n_steps >= options.max_walk_steps {
            warnings.push(
                ProfileWarning::StepCapReached {
                    index: i,
                    direction,
                    max_walk_steps: options.max_walk_steps,
                }
                .logged(),
            );
            break;
        }

        match take_step(&x_now, profile, problem, direction, settings)? {
            Some(point) => profile.append_profile_point(point),
            None => {
                warnings.push(
                    ProfileWarning::PartialProfile { index: i, direction, tries: options.max_tries }
                        .logged(),
                );
                break;
            }
        }
        n_steps += 1;
    }

    log::debug!("Parameter {i}: {n_steps} steps taken ({direction:?})");
    Ok(warnings)
}

fn should_stop<O: Objective, Opt: Optimizer>(
    x_now: &Theta, profile: &ProfilerResult, problem: &Problem<O>, direction: Direction,
    settings: &WalkSettings<'_, Opt>,
) -> bool {
    let i = settings.par_index;
    let at_bound = match direction {
        Direction::Decreasing => x_now[i] <= problem.lb_full()[i],
        Direction::Increasing => x_now[i] >= problem.ub_full()[i],
    };
    if settings.options.whole_path {
        return at_bound;
    }
    let ratio_last = profile.ratio_path.last().copied().unwrap_or(1.0);
    at_bound || ratio_last < settings.options.ratio_min
}

/// Propose and re-optimize until a converged, finite point is found or the
/// retry budget runs out (`Ok(None)`).
fn take_step<O: Objective, Opt: Optimizer>(
    x_now: &Theta, profile: &ProfilerResult, problem: &mut Problem<O>, direction: Direction,
    settings: &WalkSettings<'_, Opt>,
) -> ProfilingResult<Option<ProfilePoint>> {
    let i = settings.par_index;
    let started = Instant::now();
    let mut max_step_reduce_factor = 1.0;

    for attempt in 1..=settings.options.max_tries {
        let x_next = {
            let ctx = GuessContext {
                options: settings.options,
                profile,
                problem: &*problem,
                global_opt: settings.global_opt,
                min_step_increase_factor: 1.0,
                max_step_reduce_factor,
            };
            next_guess(x_now, i, direction, settings.method, &ctx)
        };

        problem.fix_parameters(&[i], &[x_next[i]])?;
        let x0 = problem.get_reduced_vector(&x_next)?;

        match settings.optimizer.minimize(problem, &x0) {
            Ok(outcome) if outcome.converged && outcome.value.is_finite() => {
                return Ok(Some(ProfilePoint {
                    ratio: (settings.global_opt - outcome.value).exp(),
                    fval: outcome.value,
                    gradnorm: outcome.grad_norm.unwrap_or(f64::NAN),
                    converged: outcome.converged,
                    n_fval: outcome.n_fval(),
                    x: outcome.theta_hat,
                    time: started.elapsed().as_secs_f64(),
                }));
            }
            Ok(outcome) => {
                log::debug!(
                    "Parameter {i}: attempt {attempt} rejected ({}, value {})",
                    outcome.status,
                    outcome.value
                );
            }
            Err(e) => {
                log::debug!("Parameter {i}: attempt {attempt} failed: {e}");
            }
        }
        max_step_reduce_factor *= 0.5;
    }
    Ok(None)
}
