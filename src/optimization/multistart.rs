//! Multi-start local optimization.
//!
//! One [`OptimizerTask`] per start point is run through an [`Engine`]; the
//! successful outcomes are collected into an [`OptimizeResult`], best value
//! first. This is the result profiling starts from.
use crate::{
    engine::traits::{Engine, Task},
    optimization::{
        errors::{OptError, OptResult},
        minimizer::{
            traits::{Objective, Optimizer},
            types::Theta,
        },
    },
    problem::Problem,
    result::optimize::{OptimizeResult, OptimizerResult},
};
use std::time::Instant;

/// Local optimization from a single start point.
#[derive(Debug, Clone)]
pub struct OptimizerTask<O: Objective, Opt: Optimizer> {
    pub id: usize,
    pub problem: Problem<O>,
    pub optimizer: Opt,
    /// Full start vector; fixed entries are ignored.
    pub x0: Theta,
}

impl<O: Objective, Opt: Optimizer> Task for OptimizerTask<O, Opt> {
    type Output = OptResult<OptimizerResult>;

    fn execute(self) -> OptResult<OptimizerResult> {
        let started = Instant::now();
        let x0_free = self.problem.get_reduced_vector(&self.x0)?;
        let outcome = self.optimizer.minimize(&self.problem, &x0_free)?;
        Ok(OptimizerResult::from_outcome(
            self.id,
            self.x0,
            outcome,
            started.elapsed().as_secs_f64(),
        ))
    }
}

/// Run `optimizer` from every start point and rank the outcomes.
///
/// Start points are full vectors (`dim_full` entries). Every task gets its
/// own clone of `problem`, objective included. Failed starts are logged at
/// `warn` level and skipped.
///
/// # Errors
/// - [`OptError::AllStartsFailed`] if no start succeeded (including an
///   empty start list).
pub fn minimize<O, Opt, E>(
    problem: &Problem<O>, optimizer: &Opt, engine: &E, startpoints: Vec<Theta>, progress_bar: bool,
) -> OptResult<OptimizeResult>
where
    O: Objective + Clone,
    Opt: Optimizer,
    E: Engine,
{
    let n_starts = startpoints.len();
    let tasks: Vec<_> = startpoints
        .into_iter()
        .enumerate()
        .map(|(id, x0)| OptimizerTask {
            id,
            problem: problem.clone(),
            optimizer: optimizer.clone(),
            x0,
        })
        .collect();

    let mut result = OptimizeResult::new();
    for (id, output) in engine.execute(tasks, progress_bar).into_iter().enumerate() {
        match output {
            Ok(r) => result.append(r),
            Err(e) => log::warn!("Optimizer start {id} failed: {e}"),
        }
    }
    if result.is_empty() {
        return Err(OptError::AllStartsFailed { n_starts });
    }
    log::debug!("{} of {n_starts} starts succeeded", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::SingleCoreEngine,
        optimization::minimizer::{LbfgsOptimizer, types::Cost},
    };
    use ndarray::array;

    /// Double well with minima at `x0 = ±1`, the one at `-1` deeper.
    #[derive(Clone)]
    struct DoubleWell;

    impl Objective for DoubleWell {
        fn value(&self, t: &Theta) -> OptResult<Cost> {
            if t[0].abs() > 10.0 {
                return Err(OptError::ObjectiveFailed { text: "out of range".to_string() });
            }
            Ok((t[0] * t[0] - 1.0).powi(2) + 0.1 * t[0] + t[1] * t[1])
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover ranking of starts and failure handling.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Results are sorted best first and keep their start ids.
    //
    // Given
    // -----
    // - Starts in both wells of an asymmetric double well.
    //
    // Expect
    // ------
    // - Two results; the first lies in the deeper well at `x0 ≈ -1` and
    //   came from start 1.
    fn minimize_ranks_starts_by_value() {
        let problem =
            Problem::new(DoubleWell, array![-2.0, -2.0], array![2.0, 2.0]).expect("valid bounds");

        let result = minimize(
            &problem,
            &LbfgsOptimizer::default(),
            &SingleCoreEngine::new(),
            vec![array![0.9, 0.5], array![-0.9, 0.5]],
            false,
        )
        .expect("both starts succeed");

        assert_eq!(result.len(), 2);
        let best = result.best().expect("non-empty");
        assert_eq!(best.id, 1);
        assert!((best.x[0] + 1.0).abs() < 0.1, "{:?}", best.x);
        assert!(result.fvals().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    // Purpose
    // -------
    // Only failing starts yield `AllStartsFailed`.
    //
    // Given
    // -----
    // - A start vector of the wrong length and an empty start list.
    //
    // Expect
    // ------
    // - `AllStartsFailed { n_starts: 1 }` and `{ n_starts: 0 }`.
    fn minimize_reports_when_all_starts_fail() {
        let problem =
            Problem::new(DoubleWell, array![-2.0, -2.0], array![2.0, 2.0]).expect("valid bounds");
        let optimizer = LbfgsOptimizer::default();
        let engine = SingleCoreEngine::new();

        let bad = minimize(&problem, &optimizer, &engine, vec![array![0.0]], false);
        let none = minimize(&problem, &optimizer, &engine, Vec::new(), false);

        assert_eq!(bad, Err(OptError::AllStartsFailed { n_starts: 1 }));
        assert_eq!(none, Err(OptError::AllStartsFailed { n_starts: 0 }));
    }
}
