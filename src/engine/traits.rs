//! Task and engine contracts.

/// A unit of work that owns everything it needs.
///
/// `execute` consumes the task, so a task can move its inputs into the
/// output without cloning.
pub trait Task: Send {
    type Output: Send;

    fn execute(self) -> Self::Output;
}

/// Runs a batch of tasks and returns their outputs in task order.
pub trait Engine: Send + Sync {
    fn execute<T: Task>(&self, tasks: Vec<T>, progress_bar: bool) -> Vec<T::Output>;
}
