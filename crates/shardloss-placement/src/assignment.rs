//! Server to shard assignment

use serde::Serialize;
use shardloss_common::{Config, Error, Result, ServerId, ShardId};
use std::collections::BTreeSet;

/// Mapping from every server to the set of shards it holds
///
/// Built by a single placement call and read-only afterwards: the mutators
/// are crate-private, so an `Assignment` handed to a caller cannot change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Shard sets indexed by `ServerId::index`
    servers: Vec<BTreeSet<ShardId>>,
}

impl Assignment {
    /// Create an assignment with `server_count` empty servers
    pub(crate) fn empty(server_count: u32) -> Self {
        Self {
            servers: vec![BTreeSet::new(); server_count as usize],
        }
    }

    /// Build an assignment from explicit shard sets, server 1 first
    ///
    /// No invariants are checked here; use [`Assignment::verify`] for that.
    pub fn from_shard_sets<I, S>(sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = u32>,
    {
        Self {
            servers: sets
                .into_iter()
                .map(|set| set.into_iter().map(ShardId::new).collect())
                .collect(),
        }
    }

    /// Number of servers
    #[must_use]
    pub fn server_count(&self) -> u32 {
        self.servers.len() as u32
    }

    /// Shards held by a server, `None` if the id is out of range
    #[must_use]
    pub fn shards(&self, server: ServerId) -> Option<&BTreeSet<ShardId>> {
        if server.get() == 0 {
            return None;
        }
        self.servers.get(server.index())
    }

    /// Number of shards a server holds
    #[must_use]
    pub fn load(&self, server: ServerId) -> usize {
        self.shards(server).map_or(0, BTreeSet::len)
    }

    /// Whether a server holds a shard
    #[must_use]
    pub fn holds(&self, server: ServerId, shard: ShardId) -> bool {
        self.shards(server).is_some_and(|shards| shards.contains(&shard))
    }

    /// Iterate over servers in ascending id order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (ServerId, &BTreeSet<ShardId>)> {
        self.servers
            .iter()
            .enumerate()
            .map(|(i, shards)| (ServerId::new(i as u32 + 1), shards))
    }

    /// Servers holding a replica of a shard, ascending
    #[must_use]
    pub fn replicas_of(&self, shard: ShardId) -> Vec<ServerId> {
        self.iter()
            .filter(|(_, shards)| shards.contains(&shard))
            .map(|(server, _)| server)
            .collect()
    }

    /// Add a shard to a server; returns false if it was already there
    pub(crate) fn insert(&mut self, server: ServerId, shard: ShardId) -> bool {
        self.servers[server.index()].insert(shard)
    }

    /// Replace a server's whole shard set
    pub(crate) fn assign(&mut self, server: ServerId, shards: BTreeSet<ShardId>) {
        self.servers[server.index()] = shards;
    }

    /// Check the assignment against the invariants every placement must meet
    ///
    /// Every server holds exactly `capacity` shards, every shard id is in
    /// range, and every shard has exactly `replication_factor` replicas.
    /// Duplicates on one server cannot be represented.
    pub fn verify(&self, config: &Config) -> Result<()> {
        if self.server_count() != config.server_count() {
            return Err(Error::invariant_violation(format!(
                "assignment covers {} servers, config has {}",
                self.server_count(),
                config.server_count()
            )));
        }

        let capacity = config.capacity() as usize;
        let mut replicas = vec![0_u32; config.shard_count() as usize];
        for (server, shards) in self.iter() {
            if shards.len() != capacity {
                return Err(Error::invariant_violation(format!(
                    "server {server} holds {} shards, capacity is {capacity}",
                    shards.len()
                )));
            }
            for shard in shards {
                let slot = (shard.get() as usize)
                    .checked_sub(1)
                    .and_then(|i| replicas.get_mut(i))
                    .ok_or_else(|| {
                        Error::invariant_violation(format!(
                            "server {server} holds unknown shard {shard}"
                        ))
                    })?;
                *slot += 1;
            }
        }

        if let Some((i, count)) = replicas
            .iter()
            .enumerate()
            .find(|&(_, &count)| count != config.replication_factor())
        {
            return Err(Error::invariant_violation(format!(
                "shard {} has {count} replicas, expected {}",
                i + 1,
                config.replication_factor()
            )));
        }

        Ok(())
    }
}
