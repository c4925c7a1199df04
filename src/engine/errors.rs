//! Errors raised while setting up an execution engine.

/// Engine construction failures.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A dedicated pool needs at least one thread.
    InvalidThreadCount { n_threads: usize },

    /// rayon refused to build the pool.
    PoolBuild { text: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl std::error::Error for EngineError {}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidThreadCount { n_threads } => {
                write!(f, "Engine Error: invalid thread count {n_threads}, must be positive")
            }
            EngineError::PoolBuild { text } => {
                write!(f, "Engine Error: failed to build thread pool: {text}")
            }
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        EngineError::PoolBuild { text: err.to_string() }
    }
}
