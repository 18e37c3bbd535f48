//! Capacity-constrained random placement
//!
//! Replicas are placed round by round, and within a round shard by shard in
//! ascending id order. Each replica goes to a server picked uniformly from
//! those that still have a free slot and do not hold the shard yet.
//!
//! Because the shard order is fixed, the last shards of the last round are
//! the ones most likely to find only full servers or servers that already
//! hold them. Such a fill is abandoned and restarted from scratch with a
//! fresh seed drawn from the caller's generator.

use crate::assignment::Assignment;
use crate::strategy::PlacementStrategy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use shardloss_common::{Config, Error, Result, ServerId, ShardId};
use tracing::{debug, info, warn};

/// A fill attempt ran out of eligible servers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PlacementDeadEnd {
    /// Replica round (1-based)
    round: u32,
    /// Shard that could not be placed
    shard: ShardId,
}

/// Greedy random fill with bounded global retry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomPlacement {
    max_attempts: u32,
}

impl RandomPlacement {
    /// Create a random placement that gives up after `max_attempts` fills
    #[must_use]
    pub const fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Retry budget
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run one fill from an empty assignment
    fn try_fill(config: &Config, rng: &mut StdRng) -> std::result::Result<Assignment, PlacementDeadEnd> {
        let capacity = config.capacity() as usize;
        let mut assignment = Assignment::empty(config.server_count());
        let mut available = Vec::with_capacity(config.server_count() as usize);

        for round in 1..=config.replication_factor() {
            for shard in ShardId::all(config.shard_count()) {
                available.clear();
                available.extend(ServerId::all(config.server_count()).filter(|&server| {
                    assignment.load(server) < capacity && !assignment.holds(server, shard)
                }));

                let Some(&server) = available.choose(rng) else {
                    return Err(PlacementDeadEnd { round, shard });
                };
                assignment.insert(server, shard);
            }
        }

        Ok(assignment)
    }
}

impl PlacementStrategy for RandomPlacement {
    fn name(&self) -> &'static str {
        "random"
    }

    fn validate(&self, config: &Config) -> Result<()> {
        if !config.shards_divide_evenly() {
            return Err(Error::invalid_configuration(format!(
                "{} shards cannot be shared evenly among {} servers in random mode",
                config.shard_count(),
                config.server_count()
            )));
        }
        if self.max_attempts == 0 {
            return Err(Error::invalid_configuration(
                "random placement needs a retry budget of at least one attempt",
            ));
        }
        Ok(())
    }

    fn place(&self, config: &Config, rng: &mut dyn RngCore) -> Result<Assignment> {
        self.place_counted(config, rng).map(|(assignment, _)| assignment)
    }

    fn place_counted(&self, config: &Config, rng: &mut dyn RngCore) -> Result<(Assignment, u32)> {
        self.validate(config)?;

        for attempt in 1..=self.max_attempts {
            let seed = rng.next_u64();
            let mut attempt_rng = StdRng::seed_from_u64(seed);
            match Self::try_fill(config, &mut attempt_rng) {
                Ok(assignment) => {
                    info!(attempt, seed, "random placement filled every server");
                    return Ok((assignment, attempt));
                }
                Err(dead_end) => {
                    debug!(
                        attempt,
                        seed,
                        round = dead_end.round,
                        shard = %dead_end.shard,
                        "no eligible server left, reseeding"
                    );
                }
            }
        }

        warn!(
            attempts = self.max_attempts,
            shards = config.shard_count(),
            servers = config.server_count(),
            "random placement exhausted its retry budget"
        );
        Err(Error::PlacementExhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_fills_every_server_exactly() {
        for servers in [2, 4, 10, 20, 50] {
            let config = Config::new(100, 2, servers).unwrap();
            let placement = RandomPlacement::new(10_000);
            let assignment = placement.place(&config, &mut rng(u64::from(servers))).unwrap();
            assignment.verify(&config).unwrap();
        }
    }

    #[test]
    fn test_generic_over_replication_factor() {
        let config = Config::new(30, 3, 6).unwrap();
        let assignment = RandomPlacement::new(10_000)
            .place(&config, &mut rng(3))
            .unwrap();
        assignment.verify(&config).unwrap();
        for shard in ShardId::all(30) {
            assert_eq!(assignment.replicas_of(shard).len(), 3);
        }
    }

    #[test]
    fn test_same_seed_same_assignment() {
        let config = Config::new(100, 2, 10).unwrap();
        let placement = RandomPlacement::new(10_000);
        let first = placement.place(&config, &mut rng(99)).unwrap();
        let second = placement.place(&config, &mut rng(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let config = Config::new(100, 2, 10).unwrap();
        let placement = RandomPlacement::new(10_000);
        let first = placement.place(&config, &mut rng(1)).unwrap();
        let second = placement.place(&config, &mut rng(2)).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_dead_end_is_retried() {
        // With 4 servers of capacity 4 the last replica of shard 8 often
        // only finds a free slot on the server that already holds it.
        let config = Config::new(8, 2, 4).unwrap();
        let placement = RandomPlacement::new(10_000);

        let mut retried = 0;
        for seed in 0..200 {
            let (assignment, attempts) = placement.place_counted(&config, &mut rng(seed)).unwrap();
            assignment.verify(&config).unwrap();
            if attempts > 1 {
                retried += 1;
            }
        }
        assert!(retried > 0, "expected at least one seed to hit a dead end");
    }

    #[test]
    fn test_tight_layout_terminates() {
        // capacity 2 over 4 servers: the last replicas regularly dead-end
        let config = Config::new(4, 2, 4).unwrap();
        let placement = RandomPlacement::new(10_000);
        let mut retried = false;
        for seed in 0..100 {
            let (assignment, attempts) = placement.place_counted(&config, &mut rng(seed)).unwrap();
            assignment.verify(&config).unwrap();
            retried |= attempts > 1;
        }
        assert!(retried);
    }

    #[test]
    fn test_try_fill_reports_dead_end() {
        let config = Config::new(8, 2, 4).unwrap();
        let dead_end = (0..500)
            .find_map(|seed| RandomPlacement::try_fill(&config, &mut rng(seed)).err())
            .expect("some seed should dead-end");
        assert_eq!(dead_end.round, 2);
    }

    #[test]
    fn test_exhausted_budget() {
        let config = Config::new(8, 2, 4).unwrap();
        // A single attempt per call: over many seeds some call must fail
        let placement = RandomPlacement::new(1);
        let exhausted = (0..500)
            .find_map(|seed| placement.place(&config, &mut rng(seed)).err())
            .expect("some seed should exhaust a one-attempt budget");
        assert!(matches!(exhausted, Error::PlacementExhausted { attempts: 1 }));
    }

    #[test]
    fn test_uneven_split_rejected() {
        // capacity 25 is exact, but 50 shards do not divide over 4 servers
        let config = Config::new(50, 2, 4).unwrap();
        let err = RandomPlacement::new(10)
            .place(&config, &mut rng(0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = Config::new(100, 2, 10).unwrap();
        let err = RandomPlacement::new(0).validate(&config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }
}
