#![forbid(unsafe_code)]

//! Scenario replay for dragsort.
//!
//! Loads a [`Scenario`], mounts its lists into a headless document with one
//! sortable group per configured group, replays each drag gesture through
//! native-order events, and reports the final order of every list.

pub mod cli;
pub mod error;
pub mod logging;
pub mod replay;
pub mod scenario;

pub use cli::{Cli, run};
pub use error::{HarnessError, Result};
pub use replay::{Mismatch, Outcome, Replay, StepReport, StepResult, run_scenario};
pub use scenario::{DragStep, Scenario, Step};
