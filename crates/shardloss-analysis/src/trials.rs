//! Repeated placement and estimation runs
//!
//! Trial `i` seeds its generator with `base_seed + i`, so a summary is
//! reproducible from the base seed no matter how trials are scheduled.

use crate::loss::{LossEstimator, LossReport, round_half_even};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use shardloss_common::{Config, Error, Result};
use shardloss_placement::PlacementStrategy;
use tracing::debug;

/// Result of one placement plus estimation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TrialOutcome {
    /// Seed the trial's generator started from
    pub seed: u64,
    /// Fill attempts the placement needed
    pub attempts: u32,
    /// Pairwise loss analysis
    pub report: LossReport,
}

/// Aggregate over all trials
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrialSummary {
    /// Number of trials run
    pub trials: u32,
    /// Mean of the per-trial percents, rounded half to even
    pub mean_percent: u32,
    /// Lowest per-trial percent
    pub min_percent: u32,
    /// Highest per-trial percent
    pub max_percent: u32,
    /// Fill attempts summed over all trials
    pub total_attempts: u64,
    /// Per-trial results, ordered by seed
    pub outcomes: Vec<TrialOutcome>,
}

/// Place once from `seed`, verify the assignment and estimate its loss
pub fn run_trial(strategy: &dyn PlacementStrategy, config: &Config, seed: u64) -> Result<TrialOutcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let (assignment, attempts) = strategy.place_counted(config, &mut rng)?;
    assignment.verify(config)?;

    let report = LossEstimator::analyze(&assignment);
    debug!(
        strategy = strategy.name(),
        seed,
        attempts,
        failure_pairs = report.failure_pairs,
        total_pairs = report.total_pairs,
        percent = report.percent,
        "trial finished"
    );

    Ok(TrialOutcome {
        seed,
        attempts,
        report,
    })
}

/// Run `trials` independent trials in parallel and summarize them
///
/// Fails with the first error any trial hits; no partial summary is returned.
pub fn run_trials(
    strategy: &dyn PlacementStrategy,
    config: &Config,
    base_seed: u64,
    trials: u32,
) -> Result<TrialSummary> {
    if trials == 0 {
        return Err(Error::invalid_configuration("at least one trial is required"));
    }
    strategy.validate(config)?;

    let outcomes = (0..trials)
        .into_par_iter()
        .map(|i| run_trial(strategy, config, base_seed.wrapping_add(u64::from(i))))
        .collect::<Result<Vec<_>>>()?;

    let percents = || outcomes.iter().map(|outcome| outcome.report.percent);
    let sum: u64 = percents().map(u64::from).sum();

    Ok(TrialSummary {
        trials,
        mean_percent: round_half_even(sum, u64::from(trials)) as u32,
        min_percent: percents().min().unwrap_or(0),
        max_percent: percents().max().unwrap_or(0),
        total_attempts: outcomes.iter().map(|outcome| u64::from(outcome.attempts)).sum(),
        outcomes,
    })
}
