//! Storage trait abstraction.

use async_trait::async_trait;
use expdj_core::{Battery, BatteryId, ExperimentResult, Worker, WorkerId};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Item not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Repository for ExpDJ data.
///
/// This trait allows different storage backends to be plugged in.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Battery operations ===

    /// Save a battery (create or update).
    async fn save_battery(&mut self, battery: &Battery) -> Result<()>;

    /// Load a battery by ID.
    async fn load_battery(&self, id: BatteryId) -> Result<Option<Battery>>;

    /// List all batteries.
    async fn list_batteries(&self) -> Result<Vec<Battery>>;

    /// Delete a battery.
    async fn delete_battery(&mut self, id: BatteryId) -> Result<()>;

    // === Worker operations ===

    /// Save a worker.
    async fn save_worker(&mut self, worker: &Worker) -> Result<()>;

    /// Load a worker by ID.
    async fn load_worker(&self, id: WorkerId) -> Result<Option<Worker>>;

    /// Find a worker by the identifier the marketplace assigned.
    async fn find_worker_by_marketplace_id(&self, marketplace_id: &str) -> Result<Option<Worker>>;

    // === Result operations ===

    /// Save a result (create or update).
    async fn save_result(&mut self, result: &ExperimentResult) -> Result<()>;

    /// List results recorded for a worker within a battery.
    async fn list_results(&self, worker: WorkerId, battery: BatteryId) -> Result<Vec<ExperimentResult>>;

    // === Transaction support ===

    /// Commit pending changes with a message.
    async fn commit(&mut self, message: &str) -> Result<()>;

    /// Rollback pending changes.
    async fn rollback(&mut self) -> Result<()>;

    /// Load a battery, failing with `NotFound` when it does not exist.
    async fn require_battery(&self, id: BatteryId) -> Result<Battery> {
        self.load_battery(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("battery {id}")))
    }

    /// Load a worker, failing with `NotFound` when it does not exist.
    async fn require_worker(&self, id: WorkerId) -> Result<Worker> {
        self.load_worker(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("worker {id}")))
    }
}
