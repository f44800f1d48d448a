//! Battery model - a deployable collection of experiments.

use serde::{Deserialize, Serialize};
use crate::experiment::{Experiment, ExperimentTemplate};
use crate::id::BatteryId;
use crate::Time;

/// A battery groups experiments into a session served to workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battery {
    /// Unique identifier
    pub id: BatteryId,

    /// Battery name
    pub name: String,

    /// Detailed description
    #[serde(default)]
    pub description: String,

    /// Experiment roster, in insertion order
    pub experiments: Vec<Experiment>,

    /// How a session is drawn from the roster
    pub selection: SelectionPolicy,

    /// Name of the marketplace credentials file
    #[serde(default)]
    pub credentials: Option<String>,

    /// Whether the battery accepts new sessions
    pub active: bool,

    /// Creation timestamp
    pub created_at: Time,

    /// Last update timestamp
    pub updated_at: Time,
}

impl Battery {
    /// Create an empty battery.
    pub fn new(name: impl Into<String>, selection: SelectionPolicy) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: BatteryId::new(),
            name: name.into(),
            description: String::new(),
            experiments: Vec::new(),
            selection,
            credentials: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a template to the roster.
    ///
    /// Returns `false` when an experiment with the same tag is already present.
    pub fn add_experiment(&mut self, template: ExperimentTemplate) -> bool {
        if self.contains(&template.exp_id) {
            return false;
        }
        self.experiments.push(Experiment::new(template));
        self.updated_at = chrono::Utc::now();
        true
    }

    /// Remove an experiment by tag. Returns the removed experiment, if any.
    pub fn remove_experiment(&mut self, exp_id: &str) -> Option<Experiment> {
        let pos = self.experiments.iter().position(|e| e.exp_id() == exp_id)?;
        self.updated_at = chrono::Utc::now();
        Some(self.experiments.remove(pos))
    }

    /// Whether the roster contains the tag.
    pub fn contains(&self, exp_id: &str) -> bool {
        self.experiments.iter().any(|e| e.exp_id() == exp_id)
    }

    /// Roster tags, in roster order.
    pub fn exp_ids(&self) -> impl Iterator<Item = &str> {
        self.experiments.iter().map(Experiment::exp_id)
    }

    /// Total roster duration in minutes.
    pub fn total_minutes(&self) -> u64 {
        self.experiments.iter().map(|e| u64::from(e.template.time)).sum()
    }
}

/// Policy for drawing a session out of a battery roster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Random experiments until the time ceiling is reached
    TimeBudget {
        /// Ceiling, in seconds
        max_seconds: f64,
    },

    /// A fixed number of random experiments
    FixedCount {
        /// Number of experiments to draw
        count: usize,
    },
}

/// A selection policy parameter is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// Budget is negative or not a number
    #[error("time budget must be a non-negative number of seconds, got {0}")]
    InvalidBudget(f64),
}

impl SelectionPolicy {
    /// Check the policy parameter.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match *self {
            Self::TimeBudget { max_seconds } if max_seconds.is_nan() || max_seconds < 0.0 => {
                Err(PolicyError::InvalidBudget(max_seconds))
            }
            _ => Ok(()),
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::TimeBudget { max_seconds: 3600.0 }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeBudget { max_seconds } => write!(f, "time budget ({max_seconds}s)"),
            Self::FixedCount { count } => write!(f, "fixed count ({count})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_experiment_ignores_duplicate_tag() {
        let mut battery = Battery::new("Self regulation", SelectionPolicy::default());
        assert!(battery.add_experiment(ExperimentTemplate::new("stroop", 10)));
        assert!(!battery.add_experiment(ExperimentTemplate::new("stroop", 12)));
        assert_eq!(battery.experiments.len(), 1);
        assert_eq!(battery.experiments[0].template.time, 10);
    }

    #[test]
    fn test_remove_experiment() {
        let mut battery = Battery::new("b", SelectionPolicy::default());
        battery.add_experiment(ExperimentTemplate::new("a", 1));
        battery.add_experiment(ExperimentTemplate::new("b", 2));

        let removed = battery.remove_experiment("a").unwrap();
        assert_eq!(removed.exp_id(), "a");
        assert!(battery.remove_experiment("a").is_none());
        assert_eq!(battery.exp_ids().collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(battery.total_minutes(), 2);
    }

    #[test]
    fn test_total_minutes_does_not_overflow() {
        let mut battery = Battery::new("long", SelectionPolicy::FixedCount { count: 3 });
        battery.add_experiment(ExperimentTemplate::new("a", u32::MAX));
        battery.add_experiment(ExperimentTemplate::new("b", u32::MAX));
        battery.add_experiment(ExperimentTemplate::new("c", 1));
        assert_eq!(battery.total_minutes(), 2 * u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_policy_validation() {
        assert!(SelectionPolicy::TimeBudget { max_seconds: 0.0 }.validate().is_ok());
        assert!(SelectionPolicy::FixedCount { count: 0 }.validate().is_ok());
        assert_eq!(
            SelectionPolicy::TimeBudget { max_seconds: -1.0 }.validate(),
            Err(PolicyError::InvalidBudget(-1.0))
        );
        assert!(SelectionPolicy::TimeBudget { max_seconds: f64::NAN }.validate().is_err());
    }

    #[test]
    fn test_policy_serde_shape() {
        let json = serde_json::to_value(SelectionPolicy::FixedCount { count: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "fixed_count", "count": 3}));

        let parsed: SelectionPolicy =
            serde_json::from_str(r#"{"kind":"time_budget","max_seconds":1200.0}"#).unwrap();
        assert_eq!(parsed, SelectionPolicy::TimeBudget { max_seconds: 1200.0 });
    }
}
