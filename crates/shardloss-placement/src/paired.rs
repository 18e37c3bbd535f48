//! Parity-balanced random placement
//!
//! Servers are split into two parity classes by id. Each shard gets exactly
//! one replica on an even-id server and one on an odd-id server, so the two
//! replicas of a shard never share a class. Each class has exactly
//! `shard_count` slots and every shard takes one slot per class, so the
//! fill cannot run out of servers.

use crate::assignment::Assignment;
use crate::strategy::PlacementStrategy;
use rand::RngCore;
use rand::seq::SliceRandom;
use shardloss_common::{Config, Error, Parity, Result, ServerId, ShardId};

/// Random fill with one replica per parity class (replication factor 2 only)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PairedRandomPlacement;

impl PlacementStrategy for PairedRandomPlacement {
    fn name(&self) -> &'static str {
        "paired-random"
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

    fn place(&self, config: &Config, rng: &mut dyn RngCore) -> Result<Assignment> {
        self.validate(config)?;

        let capacity = config.capacity() as usize;
        let mut assignment = Assignment::empty(config.server_count());

        let mut order: Vec<ShardId> = ShardId::all(config.shard_count()).collect();
        order.shuffle(rng);
        let mut open: Vec<ServerId> = ServerId::all(config.server_count()).collect();

        for shard in order {
            open.shuffle(rng);
            open.retain(|&server| assignment.load(server) < capacity);

            let mut even = None;
            let mut odd = None;
            for &server in &open {
                match server.parity() {
                    Parity::Even if even.is_none() => even = Some(server),
                    Parity::Odd if odd.is_none() => odd = Some(server),
                    _ => {}
                }
                if even.is_some() && odd.is_some() {
                    break;
                }
            }

            let (Some(even), Some(odd)) = (even, odd) else {
                let missing = if even.is_none() { Parity::Even } else { Parity::Odd };
                return Err(Error::internal(format!(
                    "no {missing} server with a free slot left for shard {shard}"
                )));
            };
            assignment.insert(even, shard);
            assignment.insert(odd, shard);
        }

        Ok(assignment)
    }
}
