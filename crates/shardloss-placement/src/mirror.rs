//! Deterministic mirror placement
//!
//! Servers form mirror pairs `(2k-1, 2k)`. The shard range is cut into
//! contiguous slices of `capacity` shards, and pair `k` holds slice `k` on
//! both of its servers. Each partner gets its own copy of the slice.

use crate::assignment::Assignment;
use crate::strategy::PlacementStrategy;
use rand::RngCore;
use shardloss_common::{Config, Error, Result, ServerId, ShardId};
use std::collections::BTreeSet;

/// Contiguous-range duplication across mirror pairs (replication factor 2 only)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MirrorPlacement;

impl MirrorPlacement {
    /// Build the mirror layout; needs no randomness
    pub fn layout(&self, config: &Config) -> Result<Assignment> {
        self.validate(config)?;

        let shards: Vec<ShardId> = ShardId::all(config.shard_count()).collect();
        let pairs = config.server_count() / 2;
        let mut assignment = Assignment::empty(config.server_count());

        for (pair, slice) in (0..pairs).zip(shards.chunks(config.capacity() as usize)) {
            let primary = ServerId::new(2 * pair + 1);
            let mirror = ServerId::new(2 * pair + 2);
            let set: BTreeSet<ShardId> = slice.iter().copied().collect();
            assignment.assign(mirror, set.clone());
            assignment.assign(primary, set);
        }

        Ok(assignment)
    }
}

impl PlacementStrategy for MirrorPlacement {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn validate(&self, config: &Config) -> Result<()> {
        if config.replication_factor() != 2 {
            return Err(Error::UnsupportedReplicationFactor {
                strategy: self.name(),
                factor: config.replication_factor(),
            });
        }
        Ok(())
    }

    fn place(&self, config: &Config, _rng: &mut dyn RngCore) -> Result<Assignment> {
        self.layout(config)
    }
}
