//! ExpDJ core data models.
//!
//! This crate defines the experiments, batteries, workers and results that
//! the selection and completion-tracking layers operate on.

#![warn(missing_docs)]

// Core identities
mod id;

// Battery definitions
mod experiment;
mod battery;

// Participation
mod worker;
mod result;

// Re-exports
pub use id::*;

pub use experiment::{Experiment, ExperimentTemplate};
pub use battery::{Battery, SelectionPolicy, PolicyError};
pub use worker::Worker;
pub use result::{ExperimentResult, ResultRow};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
