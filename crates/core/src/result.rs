//! Result model - one worker's run of one experiment within a battery.

use serde::{Deserialize, Serialize};
use crate::id::{BatteryId, ResultId, WorkerId};
use crate::Time;

/// A record of a worker's interaction with an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Unique identifier
    pub id: ResultId,

    /// Who produced it
    pub worker_id: WorkerId,

    /// Battery the experiment was served from
    pub battery_id: BatteryId,

    /// Experiment tag
    pub exp_id: String,

    /// Whether the worker finished the experiment
    pub completed: bool,

    /// Raw trial data posted by the experiment
    #[serde(default)]
    pub taskdata: serde_json::Value,

    /// Browser language
    #[serde(default)]
    pub language: Option<String>,

    /// Browser user agent
    #[serde(default)]
    pub browser: Option<String>,

    /// When the experiment was served
    pub started_at: Time,

    /// When the experiment was finished
    #[serde(default)]
    pub finished_at: Option<Time>,
}

impl ExperimentResult {
    /// Start an incomplete result.
    pub fn new(worker_id: WorkerId, battery_id: BatteryId, exp_id: impl Into<String>) -> Self {
        Self {
            id: ResultId::new(),
            worker_id,
            battery_id,
            exp_id: exp_id.into(),
            completed: false,
            taskdata: serde_json::Value::Null,
            language: None,
            browser: None,
            started_at: chrono::Utc::now(),
            finished_at: None,
        }
    }

    /// Attach trial data.
    pub fn with_taskdata(mut self, taskdata: serde_json::Value) -> Self {
        self.taskdata = taskdata;
        self
    }

    /// Mark the result as completed. Completion is never reverted.
    pub fn mark_completed(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.finished_at = Some(chrono::Utc::now());
    }

    /// Flatten into an export row.
    pub fn to_row(&self) -> ResultRow {
        ResultRow {
            worker: self.worker_id.to_string(),
            battery: self.battery_id.to_string(),
            experiment: self.exp_id.clone(),
            completed: self.completed,
            finished_at: self.finished_at,
            language: self.language.clone(),
            browser: self.browser.clone(),
            trial_count: self.taskdata.as_array().map_or(0, Vec::len),
        }
    }
}

/// Flat view of a result, as exported to dashboards and CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Worker identifier
    pub worker: String,
    /// Battery identifier
    pub battery: String,
    /// Experiment tag
    pub experiment: String,
    /// Completion flag
    pub completed: bool,
    /// Completion time
    pub finished_at: Option<Time>,
    /// Browser language
    pub language: Option<String>,
    /// Browser user agent
    pub browser: Option<String>,
    /// Number of recorded trials
    pub trial_count: usize,
}
