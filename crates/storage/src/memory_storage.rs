//! In-memory storage, for tests and dry runs.

use std::collections::HashMap;
use expdj_core::{Battery, BatteryId, ExperimentResult, ResultId, Worker, WorkerId};
use super::{Storage, Result};

/// Storage backend keeping everything in process memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    batteries: HashMap<BatteryId, Battery>,
    workers: HashMap<WorkerId, Worker>,
    results: HashMap<ResultId, ExperimentResult>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored results.
    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn save_battery(&mut self, battery: &Battery) -> Result<()> {
        self.batteries.insert(battery.id, battery.clone());
        Ok(())
    }

    async fn load_battery(&self, id: BatteryId) -> Result<Option<Battery>> {
        Ok(self.batteries.get(&id).cloned())
    }

    async fn list_batteries(&self) -> Result<Vec<Battery>> {
        let mut batteries: Vec<_> = self.batteries.values().cloned().collect();
        batteries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(batteries)
    }

    async fn delete_battery(&mut self, id: BatteryId) -> Result<()> {
        self.batteries.remove(&id);
        Ok(())
    }

    async fn save_worker(&mut self, worker: &Worker) -> Result<()> {
        self.workers.insert(worker.id, worker.clone());
        Ok(())
    }

    async fn load_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        Ok(self.workers.get(&id).cloned())
    }

    async fn find_worker_by_marketplace_id(&self, marketplace_id: &str) -> Result<Option<Worker>> {
        Ok(self
            .workers
            .values()
            .find(|w| w.marketplace_id.as_deref() == Some(marketplace_id))
            .cloned())
    }

    async fn save_result(&mut self, result: &ExperimentResult) -> Result<()> {
        self.results.insert(result.id, result.clone());
        Ok(())
    }

    async fn list_results(&self, worker: WorkerId, battery: BatteryId) -> Result<Vec<ExperimentResult>> {
        Ok(self
            .results
            .values()
            .filter(|r| r.worker_id == worker && r.battery_id == battery)
            .cloned()
            .collect())
    }

    async fn commit(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}
