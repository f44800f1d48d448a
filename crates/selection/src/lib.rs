//! Selection layer - completion tracking, experiment selection, and session
//! assembly.

#![warn(missing_docs)]

pub mod error;
pub mod selector;
pub mod tracker;
pub mod assembler;

pub use error::{SelectionError, Result};
pub use selector::{
    select_experiments_time, select_random_n, ExperimentSelector, FixedCountSelector,
    SelectorStrategy, TimeBudgetSelector,
};
pub use tracker::{BatteryProgress, CompletionTracker};
pub use assembler::{Session, SessionAssembler};
