//! profile::next_guess: proposals for the next profile point.
//!
//! Purpose
//! -------
//! Given the current end of a profile, propose the full parameter vector at
//! which the next constrained re-optimization starts. Four strategies are
//! available through [`NextGuessMethod`]:
//!
//! - `fixed_step`: move the profiled parameter by a constant step.
//! - `adaptive_step_order_0`: adapt the step size, hold the other
//!   parameters.
//! - `adaptive_step_order_1`: adapt the step size, extrapolate the other
//!   parameters linearly from the last two points.
//! - `adaptive_step_regression`: adapt the step size, extrapolate the other
//!   parameters with least-squares polynomials in the profiled parameter.
//!
//! Step-size adaptation
//! --------------------
//! The adaptive strategies aim for an objective increase of
//! `-ln(1 - delta_ratio_max)` (damped by `magic_factor_obj_value` times the
//! current distance to the optimum). Starting from the previous step size,
//! the step is shrunk or grown by `step_size_factor` inside
//! `[min_step_size · min_step_increase_factor, max_step_size ·
//! max_step_reduce_factor]` until the target is crossed, then the proposal
//! is interpolated linearly between the last two candidates.
//!
//! Invariants
//! ----------
//! - Every proposal lies inside `[lb_full, ub_full]`.
//! - Objective failures at candidate points count as `+∞`.
//! - The profile passed in is oriented so its last point is the walking
//!   end (see [`crate::result::ProfilerResult::flip_profile`]).
use crate::{
    optimization::minimizer::{traits::Objective, types::Theta},
    problem::Problem,
    profile::{
        errors::ProfilingError,
        options::ProfileOptions,
    },
    result::profile::{Direction, ProfilerResult},
};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Strategy used to propose the next profile point.
///
/// Parsing:
/// `FromStr` accepts the case-insensitive names `fixed_step`,
/// `adaptive_step_order_0`, `adaptive_step_order_1`, and
/// `adaptive_step_regression`. Unknown names return
/// [`ProfilingError::InvalidNextGuessMethod`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NextGuessMethod {
    FixedStep,
    AdaptiveStepOrder0,
    #[default]
    AdaptiveStepOrder1,
    AdaptiveStepRegression,
}

impl NextGuessMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            NextGuessMethod::FixedStep => "fixed_step",
            NextGuessMethod::AdaptiveStepOrder0 => "adaptive_step_order_0",
            NextGuessMethod::AdaptiveStepOrder1 => "adaptive_step_order_1",
            NextGuessMethod::AdaptiveStepRegression => "adaptive_step_regression",
        }
    }
}

impl fmt::Display for NextGuessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NextGuessMethod {
    type Err = ProfilingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed_step" => Ok(NextGuessMethod::FixedStep),
            "adaptive_step_order_0" => Ok(NextGuessMethod::AdaptiveStepOrder0),
            "adaptive_step_order_1" => Ok(NextGuessMethod::AdaptiveStepOrder1),
            "adaptive_step_regression" => Ok(NextGuessMethod::AdaptiveStepRegression),
            _ => Err(ProfilingError::InvalidNextGuessMethod { name: s.to_string() }),
        }
    }
}

/// Everything a proposal needs besides the current point.
///
/// - `profile`: the profile being walked, walking end last.
/// - `problem`: the problem with the profiled parameter fixed.
/// - `global_opt`: objective value at the global optimum.
/// - `min_step_increase_factor` / `max_step_reduce_factor`: scale the
///   lower / upper step-size bounds; the walk lowers
///   `max_step_reduce_factor` after failed steps.
pub struct GuessContext<'a, O: Objective> {
    pub options: &'a ProfileOptions,
    pub profile: &'a ProfilerResult,
    pub problem: &'a Problem<O>,
    pub global_opt: f64,
    pub min_step_increase_factor: f64,
    pub max_step_reduce_factor: f64,
}

/// Propose the next full parameter vector after `x`.
pub fn next_guess<O: Objective>(
    x: &Theta, par_index: usize, direction: Direction, method: NextGuessMethod,
    ctx: &GuessContext<'_, O>,
) -> Theta {
    match method {
        NextGuessMethod::FixedStep => fixed_step(x, par_index, direction, ctx),
        NextGuessMethod::AdaptiveStepOrder0 => {
            adaptive_step(x, par_index, direction, ctx, StepOrder::Zero)
        }
        NextGuessMethod::AdaptiveStepOrder1 => {
            adaptive_step(x, par_index, direction, ctx, StepOrder::One)
        }
        NextGuessMethod::AdaptiveStepRegression => {
            adaptive_step(x, par_index, direction, ctx, StepOrder::Regression)
        }
    }
}

/// Move only the profiled coordinate by
/// `max(min_step_size, default_step_size · max_step_reduce_factor)`.
pub fn fixed_step<O: Objective>(
    x: &Theta, par_index: usize, direction: Direction, ctx: &GuessContext<'_, O>,
) -> Theta {
    let opts = ctx.options;
    let h = (opts.default_step_size * ctx.max_step_reduce_factor).max(opts.min_step_size);
    let mut next_x = x.clone();
    next_x[par_index] += direction.sign() * h;
    clip_to_bounds(&next_x, ctx.problem)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOrder {
    Zero,
    One,
    Regression,
}

/// How the non-profiled coordinates follow a step of length `h`.
enum Extrapolation {
    /// `x + h · dir`, `dir[par_index] = ±1`.
    Linear(Theta),
    Polynomial(RegressionFit),
}

/// First step-size guess, extrapolation rule, and `fval_last - global_opt`.
struct ProfileHistory {
    step_size: f64,
    extrapolation: Extrapolation,
    delta_obj_value: f64,
}

fn adaptive_step<O: Objective>(
    x: &Theta, par_index: usize, direction: Direction, ctx: &GuessContext<'_, O>,
    order: StepOrder,
) -> Theta {
    let opts = ctx.options;
    let problem = ctx.problem;
    let d = direction.sign();

    let history = handle_profile_history(x, par_index, direction, ctx, order);

    let min_eff = (opts.min_step_size * ctx.min_step_increase_factor).min(opts.max_step_size);
    let max_eff = (opts.max_step_size * ctx.max_step_reduce_factor).max(min_eff);
    let clip_step = |h: f64| h.clamp(min_eff, max_eff);

    // Even the smallest step leaves the box: jump onto the bound.
    let min_delta_x = x[par_index] + d * opts.min_step_size;
    let bound = match direction {
        Direction::Decreasing if min_delta_x < problem.lb_full()[par_index] => {
            Some(problem.lb_full()[par_index])
        }
        Direction::Increasing if min_delta_x > problem.ub_full()[par_index] => {
            Some(problem.ub_full()[par_index])
        }
        _ => None,
    };
    if let Some(bound) = bound {
        let step_length = (bound - x[par_index]).abs();
        let mut next_x = extrapolate(x, par_index, d, step_length, &history.extrapolation, problem);
        next_x[par_index] = bound;
        return next_x;
    }

    let step_size = clip_step(history.step_size);
    let next_x = extrapolate(x, par_index, d, step_size, &history.extrapolation, problem);

    let fval_last = ctx.profile.fval_path.last().copied().unwrap_or(ctx.global_opt);
    let next_obj_target = fval_last - (1.0 - opts.delta_ratio_max).ln()
        + opts.magic_factor_obj_value * history.delta_obj_value;
    let next_obj = objective_or_inf(problem, &next_x);

    let search = LineSearch {
        x,
        par_index,
        d,
        extrapolation: &history.extrapolation,
        problem,
        min_eff,
        max_eff,
        adapt_factor: if next_obj > next_obj_target {
            1.0 / opts.step_size_factor
        } else {
            opts.step_size_factor
        },
        target: next_obj_target,
    };
    search.run(next_x, step_size, next_obj)
}

fn handle_profile_history<O: Objective>(
    x: &Theta, par_index: usize, direction: Direction, ctx: &GuessContext<'_, O>,
    order: StepOrder,
) -> ProfileHistory {
    let profile = ctx.profile;
    let n_points = profile.len();
    let mut unit_dir = Theta::zeros(x.len());
    unit_dir[par_index] = direction.sign();

    if n_points < 2 {
        return ProfileHistory {
            step_size: ctx.options.default_step_size,
            extrapolation: Extrapolation::Linear(unit_dir),
            delta_obj_value: 0.0,
        };
    }

    let last = &profile.x_path[n_points - 1];
    let prev = &profile.x_path[n_points - 2];
    let step_size = (last[par_index] - prev[par_index]).abs();
    let delta_obj_value = profile.fval_path[n_points - 1] - ctx.global_opt;

    let linear = || {
        if step_size > 0.0 {
            Extrapolation::Linear((last - prev) / step_size)
        } else {
            Extrapolation::Linear(unit_dir.clone())
        }
    };
    let extrapolation = match order {
        StepOrder::Zero => Extrapolation::Linear(unit_dir.clone()),
        StepOrder::One => linear(),
        StepOrder::Regression if n_points < 3 => linear(),
        StepOrder::Regression => {
            match RegressionFit::new(profile, par_index, ctx.problem, ctx.options) {
                Some(fit) => Extrapolation::Polynomial(fit),
                None => {
                    log::debug!("Regression proposal for parameter {par_index} fell back to order 1");
                    linear()
                }
            }
        }
    };
    ProfileHistory { step_size, extrapolation, delta_obj_value }
}

/// Geometric step-size search toward the objective target.
struct LineSearch<'a, O: Objective> {
    x: &'a Theta,
    par_index: usize,
    d: f64,
    extrapolation: &'a Extrapolation,
    problem: &'a Problem<O>,
    min_eff: f64,
    max_eff: f64,
    adapt_factor: f64,
    target: f64,
}

impl<'a, O: Objective> LineSearch<'a, O> {
    fn run(&self, mut next_x: Theta, mut step_size: f64, mut next_obj: f64) -> Theta {
        let decreasing = self.adapt_factor < 1.0;
        loop {
            let last_x = next_x;
            let last_obj = next_obj;
            step_size = (step_size * self.adapt_factor).clamp(self.min_eff, self.max_eff);
            next_x =
                extrapolate(self.x, self.par_index, self.d, step_size, self.extrapolation, self.problem);

            if (decreasing && step_size == self.min_eff) || (!decreasing && step_size == self.max_eff)
            {
                return next_x;
            }

            next_obj = objective_or_inf(self.problem, &next_x);
            let crossed =
                if decreasing { self.target >= next_obj } else { self.target <= next_obj };
            if crossed {
                return next_x_interpolate(
                    next_obj,
                    last_obj,
                    &next_x,
                    &last_x,
                    self.target,
                    self.problem,
                );
            }
        }
    }
}

/// Linear interpolation between the last two candidates at the target.
fn next_x_interpolate<O: Objective>(
    next_obj: f64, last_obj: f64, next_x: &Theta, last_x: &Theta, target: f64,
    problem: &Problem<O>,
) -> Theta {
    let delta_obj = (next_obj - last_obj).abs();
    let weight = (last_obj - target).abs() / delta_obj;
    if !weight.is_finite() || delta_obj == 0.0 {
        return next_x.clone();
    }
    let interpolated = last_x + &((next_x - last_x) * weight);
    clip_to_bounds(&interpolated, problem)
}

fn extrapolate<O: Objective>(
    x: &Theta, par_index: usize, d: f64, step_size: f64, extrapolation: &Extrapolation,
    problem: &Problem<O>,
) -> Theta {
    let next_x = match extrapolation {
        Extrapolation::Linear(dir) => x + &(dir * step_size),
        Extrapolation::Polynomial(fit) => {
            let t = d * step_size;
            let mut next_x = x.clone();
            for (j, value) in next_x.iter_mut().enumerate() {
                if j == par_index {
                    *value = x[par_index] + t;
                } else if let Some(predicted) = fit.predict(j, t) {
                    *value = predicted;
                }
            }
            next_x
        }
    };
    clip_to_bounds(&next_x, problem)
}

/// Clip every coordinate into `[lb_full, ub_full]`.
pub fn clip_to_bounds<O: Objective>(x: &Theta, problem: &Problem<O>) -> Theta {
    let mut clipped = x.clone();
    for ((v, &lb), &ub) in clipped.iter_mut().zip(problem.lb_full()).zip(problem.ub_full()) {
        *v = v.clamp(lb, ub);
    }
    clipped
}

fn objective_or_inf<O: Objective>(problem: &Problem<O>, x: &Theta) -> f64 {
    match problem.objective_value(x) {
        Ok(value) if !value.is_nan() => value,
        _ => f64::INFINITY,
    }
}

/// Per-parameter polynomials `x_j(t)`, `t = x_i - x_i,last`, fitted on the
/// trailing profile points.
///
/// The abscissa is scaled by `scale = max |t|` so the Vandermonde columns
/// stay comparable in size. Coefficients are `None` for the profiled
/// parameter and for fixed parameters.
struct RegressionFit {
    coeffs: Vec<Option<DVector<f64>>>,
    scale: f64,
}

impl RegressionFit {
    /// Fit on the last `min(n, reg_points)` points with degree
    /// `min(reg_order, floor(n / 2))`, reduced while the design matrix is
    /// rank deficient. `None` if no fit is possible.
    fn new<O: Objective>(
        profile: &ProfilerResult, par_index: usize, problem: &Problem<O>, options: &ProfileOptions,
    ) -> Option<Self> {
        let n_points = profile.len();
        let n_used = n_points.min(options.reg_points);
        let degree = options.reg_order.min(n_points / 2);
        let points = &profile.x_path[n_points - n_used..];
        let anchor = profile.x_path[n_points - 1][par_index];

        let ts: Vec<f64> = points.iter().map(|p| p[par_index] - anchor).collect();
        let scale = ts.iter().fold(0.0_f64, |acc, t| acc.max(t.abs()));
        if scale <= 0.0 || !scale.is_finite() || degree == 0 {
            return None;
        }
        let us: Vec<f64> = ts.iter().map(|t| t / scale).collect();

        let mut coeffs = Vec::with_capacity(problem.dim_full());
        for j in 0..problem.dim_full() {
            if j == par_index || problem.is_fixed(j) {
                coeffs.push(None);
                continue;
            }
            let ys = DVector::from_iterator(n_used, points.iter().map(|p| p[j]));
            coeffs.push(Some(fit_polynomial(&us, &ys, degree)?));
        }
        Some(Self { coeffs, scale })
    }

    fn predict(&self, j: usize, t: f64) -> Option<f64> {
        let c = self.coeffs.get(j)?.as_ref()?;
        let u = t / self.scale;
        Some(c.iter().rev().fold(0.0, |acc, &ck| acc * u + ck))
    }
}

/// Least-squares polynomial `Σ c_k u^k` through `(us, ys)` via SVD.
///
/// The degree is lowered to `rank - 1` when the Vandermonde matrix is rank
/// deficient.
fn fit_polynomial(us: &[f64], ys: &DVector<f64>, degree: usize) -> Option<DVector<f64>> {
    let mut degree = degree;
    loop {
        let vander = DMatrix::from_fn(us.len(), degree + 1, |r, c| us[r].powi(c as i32));
        let svd = vander.svd(true, true);
        let sv_max = svd.singular_values.max();
        let eps = sv_max * (us.len() as f64) * f64::EPSILON;
        let rank = svd.rank(eps);
        if rank == 0 {
            return None;
        }
        if rank < degree + 1 {
            degree = rank - 1;
            continue;
        }
        return svd.solve(ys, eps).ok().filter(|c| c.iter().all(|v| v.is_finite()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        optimization::{errors::OptResult, minimizer::types::Cost},
        result::profile::ProfilePoint,
    };
    use ndarray::array;

    /// `f(x) = ½ (x0 - x1)² + ½ x0²`, minimum at the origin.
    struct Coupled;

    impl Objective for Coupled {
        fn value(&self, t: &Theta) -> OptResult<Cost> {
            Ok(0.5 * (t[0] - t[1]).powi(2) + 0.5 * t[0] * t[0])
        }
    }

    struct Failing;

    impl Objective for Failing {
        fn value(&self, _t: &Theta) -> OptResult<Cost> {
            Err(crate::optimization::errors::OptError::ObjectiveFailed {
                text: "always".to_string(),
            })
        }
    }

    fn point(x: Theta, fval: f64) -> ProfilePoint {
        ProfilePoint {
            ratio: (-fval).exp(),
            x,
            fval,
            gradnorm: 0.0,
            converged: true,
            time: 0.0,
            n_fval: 1,
        }
    }

    fn coupled_problem() -> Problem<Coupled> {
        Problem::new(Coupled, array![-5.0, -5.0], array![5.0, 5.0]).expect("valid bounds")
    }

    fn ctx<'a, O: Objective>(
        options: &'a ProfileOptions, profile: &'a ProfilerResult, problem: &'a Problem<O>,
    ) -> GuessContext<'a, O> {
        GuessContext {
            options,
            profile,
            problem,
            global_opt: 0.0,
            min_step_increase_factor: 1.0,
            max_step_reduce_factor: 1.0,
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Strategy parsing.
    // - Fixed steps and bound clipping.
    // - Adaptive steps: target crossing, bound jumps, extrapolation, and
    //   failure handling.
    // - The polynomial fit used by the regression strategy.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Strategy names parse case-insensitively; unknown ones are rejected.
    //
    // Given
    // -----
    // - "Fixed_Step", "adaptive_step_regression", "newton".
    //
    // Expect
    // ------
    // - Two successes and `InvalidNextGuessMethod`.
    fn next_guess_method_parses_names() {
        assert_eq!("Fixed_Step".parse(), Ok(NextGuessMethod::FixedStep));
        assert_eq!(
            "adaptive_step_regression".parse(),
            Ok(NextGuessMethod::AdaptiveStepRegression)
        );
        assert_eq!(
            "newton".parse::<NextGuessMethod>(),
            Err(ProfilingError::InvalidNextGuessMethod { name: "newton".to_string() })
        );
        assert_eq!(NextGuessMethod::default().to_string(), "adaptive_step_order_1");
    }

    #[test]
    // Purpose
    // -------
    // Fixed steps move only the profiled coordinate, honour the reduction
    // factor floor, and clip to the bounds.
    //
    // Given
    // -----
    // - Default step 0.01, min 0.001; reduction factors 1 and 0.01; a point
    //   next to the upper bound.
    //
    // Expect
    // ------
    // - Steps of 0.01 and 0.001, then a proposal exactly on the bound.
    fn fixed_step_moves_profiled_coordinate_only() {
        let problem = coupled_problem();
        let options = ProfileOptions::default();
        let profile = ProfilerResult::new(0, point(array![0.0, 0.0], 0.0));
        let mut c = ctx(&options, &profile, &problem);

        let down = fixed_step(&array![0.0, 0.3], 0, Direction::Decreasing, &c);
        c.max_step_reduce_factor = 0.01;
        let small = fixed_step(&array![0.0, 0.3], 0, Direction::Increasing, &c);
        let clipped = fixed_step(&array![4.9995, 0.3], 0, Direction::Increasing, &c);

        assert!((down[0] + 0.01).abs() < 1e-15);
        assert_eq!(down[1], 0.3);
        assert!((small[0] - 0.001).abs() < 1e-15);
        assert_eq!(clipped[0], 5.0);
    }

    #[test]
    // Purpose
    // -------
    // The first adaptive step hits the objective target: the proposal's
    // objective is close to `fval_last - ln(1 - delta_ratio_max)`.
    //
    // Given
    // -----
    // - `f(x0, x1 = 0) = x0²` along the profiled axis (x1 held by order 0),
    //   a single-point profile at the origin.
    //
    // Expect
    // ------
    // - The increase of `f` lies within a factor of the step-size factor of
    //   the target `-ln(0.9)` and the proposal moves in the walking
    //   direction.
    fn adaptive_first_step_approaches_target() {
        let problem = coupled_problem();
        let options = ProfileOptions::default();
        let profile = ProfilerResult::new(0, point(array![0.0, 0.0], 0.0));
        let c = ctx(&options, &profile, &problem);

        let next = next_guess(
            &array![0.0, 0.0],
            0,
            Direction::Increasing,
            NextGuessMethod::AdaptiveStepOrder0,
            &c,
        );

        let target = -(0.9_f64).ln();
        let reached = problem.objective_value(&next).expect("finite objective");
        assert!(next[0] > 0.0);
        assert_eq!(next[1], 0.0);
        assert!(reached > target / 1.6 && reached < target * 1.6, "{reached} vs {target}");
    }

    #[test]
    // Purpose
    // -------
    // Close to a bound, the adaptive step jumps exactly onto it.
    //
    // Given
    // -----
    // - A point at `x0 = -4.9995` walking down with `min_step_size = 0.001`.
    //
    // Expect
    // ------
    // - `next[0] == -5`.
    fn adaptive_step_jumps_onto_close_bound() {
        let problem = coupled_problem();
        let options = ProfileOptions::default();
        let profile = ProfilerResult::new(0, point(array![-4.9995, 0.0], 0.0));
        let c = ctx(&options, &profile, &problem);

        let next = next_guess(
            &array![-4.9995, 0.0],
            0,
            Direction::Decreasing,
            NextGuessMethod::AdaptiveStepOrder1,
            &c,
        );

        assert_eq!(next[0], -5.0);
    }

    #[test]
    // Purpose
    // -------
    // Order 1 extrapolates the other coordinates along the last step.
    //
    // Given
    // -----
    // - A path `(0, 0) → (0.1, 0.05)` walking up.
    //
    // Expect
    // ------
    // - The proposal keeps the slope: `next[1] / next[0] ≈ 0.5`.
    fn order_one_follows_last_direction() {
        let problem = coupled_problem();
        let options = ProfileOptions::default();
        let mut profile = ProfilerResult::new(0, point(array![0.0, 0.0], 0.0));
        let x1 = array![0.1, 0.05];
        let f1 = problem.objective_value(&x1).expect("finite objective");
        profile.append_profile_point(point(x1.clone(), f1));
        let c = ctx(&options, &profile, &problem);

        let next =
            next_guess(&x1, 0, Direction::Increasing, NextGuessMethod::AdaptiveStepOrder1, &c);

        assert!(next[0] > 0.1);
        assert!((next[1] / next[0] - 0.5).abs() < 1e-9, "{next:?}");
    }

    #[test]
    // Purpose
    // -------
    // With fewer than three points the regression strategy has nothing to
    // fit and proposes exactly what order 1 does.
    //
    // Given
    // -----
    // - A two-point path `(0, 0) → (0.1, 0.05)` walking up.
    //
    // Expect
    // ------
    // - Identical proposals from `AdaptiveStepRegression` and
    //   `AdaptiveStepOrder1`.
    fn regression_with_two_points_matches_order_one() {
        let problem = coupled_problem();
        let options = ProfileOptions::default();
        let mut profile = ProfilerResult::new(0, point(array![0.0, 0.0], 0.0));
        let x1 = array![0.1, 0.05];
        let f1 = problem.objective_value(&x1).expect("finite objective");
        profile.append_profile_point(point(x1.clone(), f1));
        let c = ctx(&options, &profile, &problem);

        let regression =
            next_guess(&x1, 0, Direction::Increasing, NextGuessMethod::AdaptiveStepRegression, &c);
        let order_one =
            next_guess(&x1, 0, Direction::Increasing, NextGuessMethod::AdaptiveStepOrder1, &c);

        assert_eq!(regression, order_one);
    }

    #[test]
    // Purpose
    // -------
    // The regression strategy reproduces a quadratic relation between the
    // profiled and a free parameter.
    //
    // Given
    // -----
    // - Six path points with `x1 = x0²`, walking up from `x0 = 0.5`.
    // - `max_step_size = 0.01`, so the proposal is the extrapolated point
    //   at the largest step rather than an interpolation.
    //
    // Expect
    // ------
    // - `next[0] = 0.51` and `next[1] ≈ next[0]²`.
    fn regression_extrapolates_quadratic_relation() {
        let problem = coupled_problem();
        let options = ProfileOptions::builder().max_step_size(0.01).build().expect("valid");
        let xs = [0.0, 0.1, 0.2, 0.3, 0.4, 0.5];
        let first = array![xs[0], xs[0] * xs[0]];
        let mut profile = ProfilerResult::new(0, point(first.clone(), 0.0));
        for &v in &xs[1..] {
            let x = array![v, v * v];
            let f = problem.objective_value(&x).expect("finite objective");
            profile.append_profile_point(point(x, f));
        }
        let c = ctx(&options, &profile, &problem);
        let last = profile.x_path[5].clone();

        let next = next_guess(
            &last,
            0,
            Direction::Increasing,
            NextGuessMethod::AdaptiveStepRegression,
            &c,
        );

        assert!((next[0] - 0.51).abs() < 1e-12, "{next:?}");
        assert!((next[1] - next[0] * next[0]).abs() < 1e-8, "{next:?}");
    }

    #[test]
    // Purpose
    // -------
    // A failing objective shrinks the step down to the minimum.
    //
    // Given
    // -----
    // - An objective that always errors and a single-point profile.
    //
    // Expect
    // ------
    // - The proposal moves by exactly `min_step_size`.
    fn failing_objective_shrinks_to_min_step() {
        let problem =
            Problem::new(Failing, array![-5.0, -5.0], array![5.0, 5.0]).expect("valid bounds");
        let options = ProfileOptions::default();
        let profile = ProfilerResult::new(0, point(array![0.0, 0.0], 0.0));
        let c = ctx(&options, &profile, &problem);

        let next = next_guess(
            &array![0.0, 0.0],
            0,
            Direction::Increasing,
            NextGuessMethod::AdaptiveStepOrder0,
            &c,
        );

        assert!((next[0] - options.min_step_size).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Rank-deficient designs lower the polynomial degree.
    //
    // Given
    // -----
    // - Two distinct abscissae repeated, requested degree 3.
    //
    // Expect
    // ------
    // - A linear fit through both values.
    fn fit_polynomial_reduces_degree_when_rank_deficient() {
        let us = [0.0, 0.0, 1.0, 1.0];
        let ys = DVector::from_vec(vec![1.0, 1.0, 3.0, 3.0]);

        let c = fit_polynomial(&us, &ys, 3).expect("fit succeeds");

        assert_eq!(c.len(), 2);
        assert!((c[0] - 1.0).abs() < 1e-10);
        assert!((c[1] - 2.0).abs() < 1e-10);
    }
}
