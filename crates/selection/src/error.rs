//! Error type for the selection layer.

use expdj_core::{BatteryId, PolicyError};
use expdj_storage::StorageError;

/// Result alias for selection operations.
pub type Result<T> = std::result::Result<T, SelectionError>;

/// Errors raised while tracking completion or selecting experiments.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// Repository failure, propagated unchanged
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A selector parameter is out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The battery does not accept new sessions
    #[error("Battery {0} is not active")]
    BatteryInactive(BatteryId),
}

impl From<PolicyError> for SelectionError {
    fn from(err: PolicyError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}
