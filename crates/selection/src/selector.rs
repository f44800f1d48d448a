//! Experiment selection strategies.
//!
//! Every selector draws from an injected random source so callers (and tests)
//! control reproducibility.

use expdj_core::{Experiment, SelectionPolicy};
use rand::{Rng, RngCore};
use tracing::debug;
use crate::{Result, SelectionError};

/// Randomly assemble experiments whose total duration fits in `max_time_seconds`.
///
/// Candidates are drawn without replacement. A candidate that would overflow
/// the remaining budget is discarded and drawing continues with the rest of
/// the pool. Accepted experiments are returned in draw order.
pub fn select_experiments_time<R>(
    max_time_seconds: f64,
    experiments: &[Experiment],
    rng: &mut R,
) -> Result<Vec<Experiment>>
where
    R: Rng + ?Sized,
{
    if max_time_seconds.is_nan() || max_time_seconds < 0.0 {
        return Err(SelectionError::InvalidInput(format!(
            "maximum time must be a non-negative number of seconds, got {max_time_seconds}"
        )));
    }

    let mut pool = experiments.to_vec();
    let mut task_list = Vec::new();
    let mut total_time = 0.0;

    while total_time < max_time_seconds && !pool.is_empty() {
        let experiment = pool.remove(rng.random_range(0..pool.len()));
        let duration = experiment.duration_seconds();
        if total_time + duration <= max_time_seconds {
            total_time += duration;
            task_list.push(experiment);
        } else {
            debug!(exp_id = experiment.exp_id(), duration, total_time, "Skipping experiment over budget");
        }
    }

    Ok(task_list)
}

/// Uniformly sample `n` distinct experiments, clamping `n` to the pool size.
pub fn select_random_n<R>(experiments: &[Experiment], n: usize, rng: &mut R) -> Vec<Experiment>
where
    R: Rng + ?Sized,
{
    let n = n.min(experiments.len());
    rand::seq::index::sample(rng, experiments.len(), n)
        .into_iter()
        .map(|i| experiments[i].clone())
        .collect()
}

/// Strategy for choosing the experiments of one session.
pub trait ExperimentSelector: Send + Sync {
    /// Select a subset of `pool`.
    fn select(&self, pool: &[Experiment], rng: &mut dyn RngCore) -> Result<Vec<Experiment>>;
}

/// Fill a time ceiling with random experiments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBudgetSelector {
    max_seconds: f64,
}

impl TimeBudgetSelector {
    /// Create a selector with a ceiling in seconds.
    pub fn new(max_seconds: f64) -> Result<Self> {
        SelectionPolicy::TimeBudget { max_seconds }.validate()?;
        Ok(Self { max_seconds })
    }

    /// Create a selector with a ceiling in minutes.
    pub fn from_minutes(minutes: f64) -> Result<Self> {
        Self::new(minutes * 60.0)
    }

    /// Ceiling, in seconds.
    pub fn max_seconds(&self) -> f64 {
        self.max_seconds
    }
}

impl ExperimentSelector for TimeBudgetSelector {
    fn select(&self, pool: &[Experiment], rng: &mut dyn RngCore) -> Result<Vec<Experiment>> {
        select_experiments_time(self.max_seconds, pool, rng)
    }
}

/// Pick a fixed number of random experiments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedCountSelector {
    count: usize,
}

impl FixedCountSelector {
    /// Create a selector drawing `count` experiments.
    pub fn new(count: usize) -> Self {
        Self { count }
    }

    /// Create from an untrusted signed count.
    pub fn from_signed(count: i64) -> Result<Self> {
        usize::try_from(count)
            .map(Self::new)
            .map_err(|_| SelectionError::InvalidInput(format!("experiment count must be non-negative, got {count}")))
    }

    /// Number of experiments drawn.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl ExperimentSelector for FixedCountSelector {
    fn select(&self, pool: &[Experiment], rng: &mut dyn RngCore) -> Result<Vec<Experiment>> {
        Ok(select_random_n(pool, self.count, rng))
    }
}

/// Selector strategies available.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectorStrategy {
    /// Time-budgeted selection
    TimeBudget(TimeBudgetSelector),
    /// Fixed-count selection
    FixedCount(FixedCountSelector),
}

impl SelectorStrategy {
    /// Build the selector a battery policy asks for.
    pub fn from_policy(policy: &SelectionPolicy) -> Result<Self> {
        match *policy {
            SelectionPolicy::TimeBudget { max_seconds } => {
                Ok(Self::TimeBudget(TimeBudgetSelector::new(max_seconds)?))
            }
            SelectionPolicy::FixedCount { count } => Ok(Self::FixedCount(FixedCountSelector::new(count))),
        }
    }
}

impl ExperimentSelector for SelectorStrategy {
    fn select(&self, pool: &[Experiment], rng: &mut dyn RngCore) -> Result<Vec<Experiment>> {
        match self {
            Self::TimeBudget(s) => s.select(pool, rng),
            Self::FixedCount(s) => s.select(pool, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expdj_core::ExperimentTemplate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn pool(minutes: &[u32]) -> Vec<Experiment> {
        minutes
            .iter()
            .enumerate()
            .map(|(i, m)| Experiment::new(ExperimentTemplate::new(format!("exp_{i}"), *m)))
            .collect()
    }

    fn assert_subset_without_duplicates(selected: &[Experiment], input: &[Experiment]) {
        let ids: HashSet<_> = selected.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), selected.len(), "duplicate experiment selected");
        assert!(selected.iter().all(|e| input.contains(e)));
    }

    fn total_seconds(selected: &[Experiment]) -> f64 {
        selected.iter().map(Experiment::duration_seconds).sum()
    }

    #[test]
    fn test_random_n_cardinality_clamp() {
        let experiments = pool(&[5, 5, 5, 5, 5]);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            for n in 0..8 {
                let selected = select_random_n(&experiments, n, &mut rng);
                assert_eq!(selected.len(), n.min(experiments.len()));
                assert_subset_without_duplicates(&selected, &experiments);
            }
        }
    }

    #[test]
    fn test_random_n_covers_whole_pool() {
        let experiments = pool(&[1, 2, 3, 4]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for e in select_random_n(&experiments, 1, &mut rng) {
                seen.insert(e.id);
            }
        }
        assert_eq!(seen.len(), experiments.len());
    }

    #[test]
    fn test_random_n_empty_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(select_random_n(&[], 5, &mut rng).is_empty());
        assert!(select_random_n(&pool(&[3, 4]), 0, &mut rng).is_empty());
    }

    #[test]
    fn test_random_n_is_reproducible_with_seed() {
        let experiments = pool(&[1, 2, 3, 4, 5, 6]);
        let a = select_random_n(&experiments, 3, &mut ChaCha8Rng::seed_from_u64(42));
        let b = select_random_n(&experiments, 3, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_time_budget_respected() {
        let experiments = pool(&[10, 20, 30]);
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let selected = select_experiments_time(1200.0, &experiments, &mut rng).unwrap();
            assert!(total_seconds(&selected) <= 1200.0);
            assert!(!selected.is_empty());
            assert_subset_without_duplicates(&selected, &experiments);
            assert!(selected.iter().all(|e| e.template.time != 30));
        }
    }

    #[test]
    fn test_time_budget_accumulates_accepted_durations() {
        // Three 10 minute experiments against a 20 minute ceiling: the third
        // would overflow once the first two are counted.
        let experiments = pool(&[10, 10, 10]);
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let selected = select_experiments_time(1200.0, &experiments, &mut rng).unwrap();
            assert_eq!(selected.len(), 2);
            assert_eq!(total_seconds(&selected), 1200.0);
        }
    }

    #[test]
    fn test_time_budget_skips_oversized_and_continues() {
        let experiments = pool(&[60, 60, 60, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let selected = select_experiments_time(300.0, &experiments, &mut rng).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].template.time, 1);
    }

    #[test]
    fn test_time_budget_edge_cases() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(select_experiments_time(100.0, &[], &mut rng).unwrap().is_empty());
        assert!(select_experiments_time(0.0, &pool(&[1, 2]), &mut rng).unwrap().is_empty());
    }

    #[test]
    fn test_time_budget_does_not_mutate_input() {
        let experiments = pool(&[1, 2, 3]);
        let before = experiments.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let _ = select_experiments_time(10_000.0, &experiments, &mut rng).unwrap();
        assert_eq!(experiments, before);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            select_experiments_time(-1.0, &pool(&[1]), &mut rng),
            Err(SelectionError::InvalidInput(_))
        ));
        assert!(matches!(
            select_experiments_time(f64::NAN, &pool(&[1]), &mut rng),
            Err(SelectionError::InvalidInput(_))
        ));
        assert!(matches!(FixedCountSelector::from_signed(-3), Err(SelectionError::InvalidInput(_))));
        assert!(matches!(TimeBudgetSelector::new(-0.5), Err(SelectionError::InvalidInput(_))));
        assert_eq!(FixedCountSelector::from_signed(4).unwrap().count(), 4);
    }

    #[test]
    fn test_strategy_from_policy() {
        let experiments = pool(&[10, 10, 10, 10]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let by_count = SelectorStrategy::from_policy(&SelectionPolicy::FixedCount { count: 3 }).unwrap();
        assert_eq!(by_count.select(&experiments, &mut rng).unwrap().len(), 3);

        let by_time = SelectorStrategy::from_policy(&SelectionPolicy::TimeBudget { max_seconds: 1800.0 }).unwrap();
        assert_eq!(by_time.select(&experiments, &mut rng).unwrap().len(), 3);

        assert!(SelectorStrategy::from_policy(&SelectionPolicy::TimeBudget { max_seconds: -5.0 }).is_err());
    }

    #[test]
    fn test_time_budget_from_minutes() {
        let selector = TimeBudgetSelector::from_minutes(20.0).unwrap();
        assert_eq!(selector.max_seconds(), 1200.0);
    }
}
