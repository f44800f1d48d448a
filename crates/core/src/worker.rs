//! Worker model.

use serde::{Deserialize, Serialize};
use crate::id::WorkerId;
use crate::Time;

/// Someone who can be served batteries and produces results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Local identifier
    pub id: WorkerId,

    /// Identifier assigned by the task marketplace, if any
    #[serde(default)]
    pub marketplace_id: Option<String>,

    /// First seen
    pub created_at: Time,
}

impl Worker {
    /// Worker known to the marketplace.
    pub fn from_marketplace(marketplace_id: impl Into<String>) -> Self {
        Self {
            id: WorkerId::new(),
            marketplace_id: Some(marketplace_id.into()),
            created_at: chrono::Utc::now(),
        }
    }

    /// Locally assigned worker (anonymous links).
    pub fn anonymous() -> Self {
        Self {
            id: WorkerId::new(),
            marketplace_id: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Whether the worker came through an anonymous link.
    pub fn is_anonymous(&self) -> bool {
        self.marketplace_id.is_none()
    }
}
