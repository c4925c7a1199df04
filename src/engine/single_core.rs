use crate::engine::traits::{Engine, Task};

/// Runs tasks one after another on the calling thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleCoreEngine;

impl SingleCoreEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for SingleCoreEngine {
    fn execute<T: Task>(&self, tasks: Vec<T>, progress_bar: bool) -> Vec<T::Output> {
        let n_tasks = tasks.len();
        tasks
            .into_iter()
            .enumerate()
            .map(|(k, task)| {
                let output = task.execute();
                if progress_bar {
                    log::info!("SingleCoreEngine: {}/{} tasks finished", k + 1, n_tasks);
                }
                output
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Square(u64);

    impl Task for Square {
        type Output = u64;

        fn execute(self) -> u64 {
            self.0 * self.0
        }
    }

    #[test]
    // Purpose
    // -------
    // Outputs come back in task order.
    //
    // Given
    // -----
    // - Tasks squaring 3, 1, 2.
    //
    // Expect
    // ------
    // - `[9, 1, 4]`.
    fn execute_preserves_task_order() {
        let out = SingleCoreEngine::new().execute(vec![Square(3), Square(1), Square(2)], true);
        assert_eq!(out, vec![9, 1, 4]);
    }
}
