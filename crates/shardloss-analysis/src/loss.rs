//! Pairwise data-loss estimation
//!
//! Models exactly two servers failing at once. A pair of servers is a
//! failure pair when their shard sets intersect: with two replicas per
//! shard, losing both servers loses every copy of the shared shard. The
//! loss percent is the share of failure pairs among all unordered pairs.

use serde::Serialize;
use shardloss_common::{Error, Result, ServerId};
use shardloss_placement::Assignment;

/// Outcome of a pairwise analysis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LossReport {
    /// Server pairs sharing at least one shard
    pub failure_pairs: u64,
    /// All unordered pairs of distinct servers
    pub total_pairs: u64,
    /// `100 * failure_pairs / total_pairs`, rounded half to even
    pub percent: u32,
}

/// Stateless pairwise estimator
#[derive(Clone, Copy, Debug, Default)]
pub struct LossEstimator;

impl LossEstimator {
    /// Count failure pairs over every `(i, j)` with `i < j`
    #[must_use]
    pub fn analyze(assignment: &Assignment) -> LossReport {
        let n = u64::from(assignment.server_count());
        let total_pairs = n * n.saturating_sub(1) / 2;
        let failure_pairs = Self::failure_pairs(assignment).count() as u64;

        let percent = if total_pairs == 0 {
            0
        } else {
            round_half_even(failure_pairs * 100, total_pairs) as u32
        };

        LossReport {
            failure_pairs,
            total_pairs,
            percent,
        }
    }

    /// Iterate over the failure pairs, lower server id first
    pub fn failure_pairs(assignment: &Assignment) -> impl Iterator<Item = (ServerId, ServerId)> + '_ {
        assignment.iter().flat_map(move |(left, left_shards)| {
            assignment
                .iter()
                .skip(left.index() + 1)
                .filter(move |(_, right_shards)| !left_shards.is_disjoint(right_shards))
                .map(move |(right, _)| (left, right))
        })
    }
}

/// Percentage of server pairs whose joint loss destroys a shard
///
/// `server_count` must match the assignment and be at least 2.
pub fn estimate_loss_percent(assignment: &Assignment, server_count: u32) -> Result<u32> {
    if server_count < 2 {
        return Err(Error::invalid_configuration(format!(
            "pairwise loss needs at least 2 servers, got {server_count}"
        )));
    }
    if assignment.server_count() != server_count {
        return Err(Error::invalid_configuration(format!(
            "assignment covers {} servers, expected {server_count}",
            assignment.server_count()
        )));
    }
    Ok(LossEstimator::analyze(assignment).percent)
}

/// Divide and round to the nearest integer, ties to even
pub(crate) const fn round_half_even(numerator: u64, denominator: u64) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}
