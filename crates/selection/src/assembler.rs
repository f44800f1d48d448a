//! Session assembly - decides what a worker is served next.
//!
//! ```text
//! Load battery → Filter completed → Select by policy → Session
//! ```

use expdj_core::{BatteryId, Experiment, WorkerId};
use expdj_storage::Storage;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use crate::selector::{ExperimentSelector, SelectorStrategy};
use crate::tracker::{progress_of, remaining_experiments, BatteryProgress};
use crate::{Result, SelectionError};

/// The ordered task list served to a worker.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Battery the session was drawn from
    pub battery_id: BatteryId,
    /// Worker being served
    pub worker_id: WorkerId,
    /// Experiments, in serving order
    pub experiments: Vec<Experiment>,
    /// Sum of experiment durations, in minutes
    pub total_minutes: u64,
    /// Worker progress before this session
    pub progress: BatteryProgress,
    /// The worker has already completed every roster experiment
    pub finished: bool,
}

impl Session {
    /// Experiment tags, in serving order.
    pub fn exp_ids(&self) -> Vec<&str> {
        self.experiments.iter().map(Experiment::exp_id).collect()
    }
}

/// Assembles sessions from stored batteries and results.
pub struct SessionAssembler<S: Storage> {
    storage: S,
    rng: Box<dyn RngCore + Send>,
    require_active: bool,
}

impl<S: Storage> SessionAssembler<S> {
    /// Create an assembler drawing from OS-seeded randomness.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            rng: Box::new(StdRng::from_os_rng()),
            require_active: true,
        }
    }

    /// Set the random source.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    /// Use a reproducible random source.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    /// Whether inactive batteries are refused (default: true). Previews
    /// assemble sessions for inactive batteries too.
    pub fn require_active(mut self, require: bool) -> Self {
        self.require_active = require;
        self
    }

    /// Assemble the next session for a worker.
    pub async fn assemble(&mut self, worker: WorkerId, battery: BatteryId) -> Result<Session> {
        self.storage.require_worker(worker).await?;
        let battery = self.storage.require_battery(battery).await?;
        if self.require_active && !battery.active {
            return Err(SelectionError::BatteryInactive(battery.id));
        }

        let strategy = SelectorStrategy::from_policy(&battery.selection)?;
        let results = self.storage.list_results(worker, battery.id).await?;
        let pool = remaining_experiments(&battery, &results);
        let progress = progress_of(&battery, &results);

        debug!(
            battery = %battery.id,
            worker = %worker,
            roster = battery.experiments.len(),
            pool = pool.len(),
            "Filtered completed experiments"
        );

        if pool.is_empty() {
            info!("Worker {} has completed battery {}", worker, battery.id);
            return Ok(Session {
                battery_id: battery.id,
                worker_id: worker,
                experiments: Vec::new(),
                total_minutes: 0,
                progress,
                finished: true,
            });
        }

        let experiments = strategy.select(&pool, self.rng.as_mut())?;
        let total_minutes: u64 = experiments.iter().map(|e| u64::from(e.template.time)).sum();

        info!(
            "Assembled session for worker {} from battery {} ({}): {} experiments, {} minutes",
            worker,
            battery.id,
            battery.selection,
            experiments.len(),
            total_minutes
        );

        Ok(Session {
            battery_id: battery.id,
            worker_id: worker,
            experiments,
            total_minutes,
            progress,
            finished: false,
        })
    }

    /// Get a reference to the storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get a mutable reference to the storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}
