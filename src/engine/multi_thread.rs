//! Thread-parallel engine backed by rayon.
use crate::engine::{
    errors::{EngineError, EngineResult},
    traits::{Engine, Task},
};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Runs tasks in parallel on a rayon pool.
///
/// `MultiThreadEngine::default()` uses rayon's global pool; [`MultiThreadEngine::new`]
/// with `Some(n)` builds a dedicated pool of `n` threads.
#[derive(Debug, Default)]
pub struct MultiThreadEngine {
    pool: Option<ThreadPool>,
}

impl MultiThreadEngine {
    /// # Errors
    /// - [`EngineError::InvalidThreadCount`] for `Some(0)`.
    /// - [`EngineError::PoolBuild`] if rayon cannot spawn the pool.
    pub fn new(n_threads: Option<usize>) -> EngineResult<Self> {
        let pool = match n_threads {
            None => None,
            Some(0) => return Err(EngineError::InvalidThreadCount { n_threads: 0 }),
            Some(n) => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
        };
        Ok(Self { pool })
    }

    /// Number of worker threads tasks are spread over.
    pub fn n_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

impl Engine for MultiThreadEngine {
    fn execute<T: Task>(&self, tasks: Vec<T>, progress_bar: bool) -> Vec<T::Output> {
        let n_tasks = tasks.len();
        let finished = AtomicUsize::new(0);
        let run = || -> Vec<T::Output> {
            tasks
                .into_par_iter()
                .map(|task| {
                    let output = task.execute();
                    if progress_bar {
                        let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                        log::info!("MultiThreadEngine: {done}/{n_tasks} tasks finished");
                    }
                    output
                })
                .collect()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}
