//! Non-fatal profiling events.
//!
//! Warnings are returned to the caller as values and logged at `warn`
//! level when they are raised.
use crate::result::profile::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProfileWarning {
    /// A requested parameter is fixed in the problem and was not profiled.
    FixedParameterSkipped { index: usize },

    /// Every retry of a step failed; the direction ends at the last
    /// accepted point.
    PartialProfile { index: usize, direction: Direction, tries: usize },

    /// The per-direction step cap was hit before any other stop condition.
    StepCapReached { index: usize, direction: Direction, max_walk_steps: usize },

    /// The task aborted; the target slot keeps its previous content.
    TaskFailed { index: usize, reason: String },
}

impl ProfileWarning {
    /// Parameter the warning refers to.
    pub fn index(&self) -> usize {
        match self {
            ProfileWarning::FixedParameterSkipped { index }
            | ProfileWarning::PartialProfile { index, .. }
            | ProfileWarning::StepCapReached { index, .. }
            | ProfileWarning::TaskFailed { index, .. } => *index,
        }
    }

    /// Emit through the `log` facade and hand the warning back.
    pub(crate) fn logged(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for ProfileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileWarning::FixedParameterSkipped { index } => {
                write!(f, "Parameter {index} is fixed and was not profiled")
            }
            ProfileWarning::PartialProfile { index, direction, tries } => {
                write!(
                    f,
                    "Profile of parameter {index} truncated ({direction:?}): step failed {tries} times"
                )
            }
            ProfileWarning::StepCapReached { index, direction, max_walk_steps } => {
                write!(
                    f,
                    "Profile of parameter {index} stopped ({direction:?}) after {max_walk_steps} steps"
                )
            }
            ProfileWarning::TaskFailed { index, reason } => {
                write!(f, "Profiling parameter {index} failed: {reason}")
            }
        }
    }
}
