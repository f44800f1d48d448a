//! Completion tracking - which battery experiments a worker has finished.

use std::collections::{BTreeSet, HashSet};
use expdj_core::{Battery, BatteryId, Experiment, ExperimentResult, WorkerId};
use expdj_storage::Storage;
use serde::Serialize;
use tracing::debug;
use crate::Result;

/// Completion counts for one worker within one battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryProgress {
    /// Roster experiments the worker completed
    pub completed: usize,
    /// Roster experiments still to do
    pub remaining: usize,
    /// Roster size
    pub total: usize,
}

impl BatteryProgress {
    /// Whether nothing is left to serve.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Percentage complete (0-100). An empty roster counts as complete.
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        self.completed as f32 / self.total as f32 * 100.0
    }
}

/// Cross-references battery rosters against the result log.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionTracker;

impl CompletionTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self
    }

    /// Experiment tags the worker has (`completed == true`) or has not
    /// (`completed == false`) completed in the battery.
    ///
    /// Completed tags are restricted to the current roster, so results for
    /// experiments since removed from the battery are ignored.
    pub async fn get_worker_experiments(
        &self,
        storage: &dyn Storage,
        worker: WorkerId,
        battery: BatteryId,
        completed: bool,
    ) -> Result<BTreeSet<String>> {
        let (battery, results) = self.load(storage, worker, battery).await?;
        Ok(partition(&battery, &results, completed))
    }

    /// Roster experiments the worker has not completed, in roster order.
    pub async fn uncompleted_pool(
        &self,
        storage: &dyn Storage,
        worker: WorkerId,
        battery: BatteryId,
    ) -> Result<Vec<Experiment>> {
        let (battery, results) = self.load(storage, worker, battery).await?;
        Ok(remaining_experiments(&battery, &results))
    }

    /// Completion counts for the worker in the battery.
    pub async fn progress(
        &self,
        storage: &dyn Storage,
        worker: WorkerId,
        battery: BatteryId,
    ) -> Result<BatteryProgress> {
        let (battery, results) = self.load(storage, worker, battery).await?;
        Ok(progress_of(&battery, &results))
    }

    async fn load(
        &self,
        storage: &dyn Storage,
        worker: WorkerId,
        battery: BatteryId,
    ) -> Result<(Battery, Vec<ExperimentResult>)> {
        storage.require_worker(worker).await?;
        let battery = storage.require_battery(battery).await?;
        let results = storage.list_results(worker, battery.id).await?;
        debug!(
            battery = %battery.id,
            worker = %worker,
            roster = battery.experiments.len(),
            results = results.len(),
            "Loaded completion data"
        );
        Ok((battery, results))
    }
}

fn completed_tags(results: &[ExperimentResult]) -> HashSet<&str> {
    results
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.exp_id.as_str())
        .collect()
}

/// Split the battery roster by completion, given the worker's results.
pub(crate) fn partition(battery: &Battery, results: &[ExperimentResult], completed: bool) -> BTreeSet<String> {
    let worker_tags = completed_tags(results);
    battery
        .exp_ids()
        .filter(|tag| worker_tags.contains(tag) == completed)
        .map(str::to_string)
        .collect()
}

pub(crate) fn remaining_experiments(battery: &Battery, results: &[ExperimentResult]) -> Vec<Experiment> {
    let worker_tags = completed_tags(results);
    battery
        .experiments
        .iter()
        .filter(|e| !worker_tags.contains(e.exp_id()))
        .cloned()
        .collect()
}

pub(crate) fn progress_of(battery: &Battery, results: &[ExperimentResult]) -> BatteryProgress {
    let completed = partition(battery, results, true).len();
    let total = battery.exp_ids().collect::<HashSet<_>>().len();
    BatteryProgress {
        completed,
        remaining: total - completed,
        total,
    }
}
