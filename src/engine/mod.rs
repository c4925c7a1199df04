//! engine: execution of independent tasks.
//!
//! Purpose
//! -------
//! Run a batch of independent, owned [`Task`]s and return their outputs in
//! task order. Profiling submits one task per parameter, multi-start one
//! task per start point.
//!
//! Key behaviors
//! -------------
//! - [`SingleCoreEngine`] runs tasks sequentially on the calling thread.
//! - [`MultiThreadEngine`] runs tasks on a rayon pool, either the global
//!   one or a dedicated pool with a fixed thread count.
//! - With `progress_bar = true` both engines log a completion counter at
//!   `info` level through the `log` facade.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output `k` always belongs to task `k`, regardless of scheduling.
//! - Tasks own all their inputs, so the numerical result of a task does
//!   not depend on which engine ran it.

pub mod errors;
pub mod multi_thread;
pub mod single_core;
pub mod traits;

pub use self::errors::{EngineError, EngineResult};
pub use self::multi_thread::MultiThreadEngine;
pub use self::single_core::SingleCoreEngine;
pub use self::traits::{Engine, Task};
