//! ShardLoss Analysis - data-loss estimation
//!
//! Given an [`Assignment`](shardloss_placement::Assignment), the
//! [`LossEstimator`] counts the server pairs whose simultaneous loss wipes
//! out every replica of some shard. [`run_trials`] repeats placement and
//! estimation over independent seeds.

pub mod loss;
pub mod trials;

pub use loss::{LossEstimator, LossReport, estimate_loss_percent};
pub use trials::{TrialOutcome, TrialSummary, run_trial, run_trials};
