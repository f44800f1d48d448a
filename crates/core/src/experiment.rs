//! Experiment model - a unit of work served to a worker.

use serde::{Deserialize, Serialize};
use crate::id::ExperimentId;

/// A reusable experiment definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentTemplate {
    /// Unique tag (e.g. `stroop`)
    pub exp_id: String,

    /// Human readable name
    pub name: String,

    /// Expected duration, in minutes
    pub time: u32,

    /// Publication or documentation reference
    #[serde(default)]
    pub reference: Option<String>,
}

impl ExperimentTemplate {
    /// Create a new template.
    pub fn new(exp_id: impl Into<String>, time: u32) -> Self {
        let exp_id = exp_id.into();
        Self {
            name: exp_id.clone(),
            exp_id,
            time,
            reference: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Duration converted to seconds, the unit selection budgets use.
    pub fn duration_seconds(&self) -> f64 {
        f64::from(self.time) * 60.0
    }
}

/// A template placed into a battery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Unique identifier
    pub id: ExperimentId,

    /// The underlying definition
    pub template: ExperimentTemplate,

    /// Whether a performance bonus is paid for this experiment
    #[serde(default)]
    pub include_bonus: bool,

    /// Whether catch trials are scored for this experiment
    #[serde(default)]
    pub include_catch: bool,
}

impl Experiment {
    /// Wrap a template as a new battery experiment.
    pub fn new(template: ExperimentTemplate) -> Self {
        Self {
            id: ExperimentId::new(),
            template,
            include_bonus: false,
            include_catch: false,
        }
    }

    /// The template tag.
    pub fn exp_id(&self) -> &str {
        &self.template.exp_id
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.template.duration_seconds()
    }
}
