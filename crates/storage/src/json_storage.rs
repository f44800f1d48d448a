//! JSON file storage implementation.
//!
//! Stores data as JSON files in a data directory and keeps small per-object
//! meta markers (version + updated_at).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use expdj_core::{Battery, BatteryId, ExperimentResult, ResultId, Worker, WorkerId};
use super::{Storage, Result};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const KINDS: [&str; 3] = ["batteries", "workers", "results"];

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    pending: Arc<Mutex<bool>>,
}

impl JsonStorage {
    /// Create storage, creating the data and meta subdirectories if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for kind in KINDS {
            fs::create_dir_all(root.join(kind)).await?;
            fs::create_dir_all(root.join("meta").join(kind)).await?;
        }

        debug!("Opened JSON storage at {}", root.display());

        Ok(Self {
            root,
            pending: Arc::new(Mutex::new(false)),
        })
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn battery_path(&self, id: BatteryId) -> PathBuf {
        self.root.join("batteries").join(format!("{}.json", id))
    }
    fn worker_path(&self, id: WorkerId) -> PathBuf {
        self.root.join("workers").join(format!("{}.json", id))
    }
    fn result_path(&self, id: ResultId) -> PathBuf {
        self.root.join("results").join(format!("{}.json", id))
    }

    fn meta_path(&self, kind: &str, id: &str) -> PathBuf {
        self.root.join("meta").join(kind).join(format!("{}.meta.json", id))
    }

    async fn set_pending(&self) {
        *self.pending.lock().await = true;
    }

    /// Whether there are writes since the last commit or rollback.
    pub async fn is_pending(&self) -> bool {
        *self.pending.lock().await
    }

    /// Read and increment per-object version, return new version.
    async fn bump_version(&self, kind: &str, id: &str) -> Result<u64> {
        let path = self.meta_path(kind, id);
        let mut version = 0u64;
        if let Ok(s) = fs::read_to_string(&path).await {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&s) {
                if let Some(v) = json.get("version").and_then(|v| v.as_u64()) {
                    version = v;
                }
            }
        }
        version += 1;
        let meta = serde_json::json!({"version": version, "updated_at": chrono::Utc::now()});
        fs::write(&path, serde_json::to_string_pretty(&meta)?.as_bytes()).await?;
        Ok(version)
    }

    async fn write_object<T: serde::Serialize>(&self, kind: &str, id: &str, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json.as_bytes()).await?;

        let version = self.bump_version(kind, id).await?;
        debug!(kind, id, version, "Saved object");

        self.set_pending().await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_battery(&mut self, battery: &Battery) -> Result<()> {
        let path = self.battery_path(battery.id);
        self.write_object("batteries", &battery.id.to_string(), &path, battery).await
    }

    async fn load_battery(&self, id: BatteryId) -> Result<Option<Battery>> {
        read_json(&self.battery_path(id)).await
    }

    async fn list_batteries(&self) -> Result<Vec<Battery>> {
        let mut batteries: Vec<Battery> = list_dir(&self.root.join("batteries")).await?;
        batteries.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(batteries)
    }

    async fn delete_battery(&mut self, id: BatteryId) -> Result<()> {
        fs::remove_file(self.battery_path(id)).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        self.set_pending().await;
        Ok(())
    }

    async fn save_worker(&mut self, worker: &Worker) -> Result<()> {
        let path = self.worker_path(worker.id);
        self.write_object("workers", &worker.id.to_string(), &path, worker).await
    }

    async fn load_worker(&self, id: WorkerId) -> Result<Option<Worker>> {
        read_json(&self.worker_path(id)).await
    }

    async fn find_worker_by_marketplace_id(&self, marketplace_id: &str) -> Result<Option<Worker>> {
        let all: Vec<Worker> = list_dir(&self.root.join("workers")).await?;
        Ok(all
            .into_iter()
            .find(|w| w.marketplace_id.as_deref() == Some(marketplace_id)))
    }

    async fn save_result(&mut self, result: &ExperimentResult) -> Result<()> {
        let path = self.result_path(result.id);
        self.write_object("results", &result.id.to_string(), &path, result).await
    }

    async fn list_results(&self, worker: WorkerId, battery: BatteryId) -> Result<Vec<ExperimentResult>> {
        let all = list_dir(&self.root.join("results")).await?;
        Ok(all
            .into_iter()
            .filter(|r: &ExperimentResult| r.worker_id == worker && r.battery_id == battery)
            .collect())
    }

    async fn commit(&mut self, message: &str) -> Result<()> {
        // No versioning backend; commit clears pending state.
        debug!("Commit: {}", message);
        *self.pending.lock().await = false;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        // Writes are already on disk; rollback only clears pending state.
        *self.pending.lock().await = false;
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}
