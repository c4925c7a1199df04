//! result: containers passed between optimization and profiling.
//!
//! [`EstimationResult`] is the owned state threaded explicitly through the
//! entry points: multi-start fills `optimize_result`, profiling reads it and
//! writes `profile_result`.

pub mod optimize;
pub mod profile;

pub use self::optimize::{OptimizeResult, OptimizerResult};
pub use self::profile::{Direction, ProfilePoint, ProfileResultStore, ProfilerResult};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub optimize_result: OptimizeResult,
    pub profile_result: ProfileResultStore,
}

impl EstimationResult {
    pub fn new(optimize_result: OptimizeResult) -> Self {
        Self { optimize_result, profile_result: ProfileResultStore::new() }
    }
}
