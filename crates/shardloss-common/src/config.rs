//! Configuration types for ShardLoss
//!
//! [`Settings`] holds the simulation constants that are loaded from
//! defaults, an optional file and the environment. [`Config`] is the
//! validated, immutable parameter set a single placement run works with.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of shards to distribute
pub const DEFAULT_SHARD_COUNT: u32 = 100;
/// Default number of replicas per shard
pub const DEFAULT_REPLICATION_FACTOR: u32 = 2;
/// Default number of simultaneously lost servers shown in the report
pub const DEFAULT_LOST_SERVERS_COUNT: u32 = 2;
/// Default retry budget for random placement
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// Simulation constants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Total number of shards
    pub shard_count: u32,
    /// Number of distinct servers holding each shard
    pub replication_factor: u32,
    /// Number of killed servers printed in the report.
    /// Display only: the estimator always models two lost servers.
    pub lost_servers_count: u32,
    /// Maximum number of random placement attempts before giving up
    pub max_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            lost_servers_count: DEFAULT_LOST_SERVERS_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Settings {
    /// Build a validated [`Config`] for the given number of servers
    ///
    /// On top of the checks in [`Config::new`], a simulation run needs
    /// strictly fewer servers than shards.
    pub fn config(&self, server_count: u32) -> Result<Config> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_configuration(
                "max_attempts must allow at least one placement attempt",
            ));
        }
        if server_count >= self.shard_count {
            return Err(Error::invalid_configuration(format!(
                "too many servers ({server_count}) for {} shards",
                self.shard_count
            )));
        }
        Config::new(self.shard_count, self.replication_factor, server_count)
    }
}

/// Validated simulation parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Config {
    shard_count: u32,
    replication_factor: u32,
    server_count: u32,
    capacity: u32,
}

impl Config {
    /// Validate the parameters and derive the per-server capacity
    ///
    /// Checks the constraints every placement strategy relies on. The
    /// strategy-specific preconditions are checked by the strategies, and
    /// the fewer-servers-than-shards bound by [`Settings::config`].
    pub fn new(shard_count: u32, replication_factor: u32, server_count: u32) -> Result<Self> {
        if shard_count == 0 {
            return Err(Error::invalid_configuration("shard count must be positive"));
        }
        if replication_factor == 0 {
            return Err(Error::invalid_configuration(
                "replication factor must be positive",
            ));
        }
        if server_count <= 1 {
            return Err(Error::invalid_configuration(format!(
                "at least 2 servers are needed to run a simulation, got {server_count}"
            )));
        }
        if server_count % 2 != 0 {
            return Err(Error::invalid_configuration(format!(
                "server count must be even for mirror pairs and parity classes, got {server_count}"
            )));
        }
        if replication_factor > server_count {
            return Err(Error::invalid_configuration(format!(
                "replication factor {replication_factor} needs at least as many servers, got {server_count}"
            )));
        }

        let slots = u64::from(shard_count) * u64::from(replication_factor);
        if slots % u64::from(server_count) != 0 {
            return Err(Error::invalid_configuration(format!(
                "{slots} shard replicas cannot be spread evenly over {server_count} servers"
            )));
        }
        let capacity = u32::try_from(slots / u64::from(server_count)).map_err(|_| {
            Error::invalid_configuration(format!("per-server capacity overflows: {slots} replicas"))
        })?;

        Ok(Self {
            shard_count,
            replication_factor,
            server_count,
            capacity,
        })
    }

    /// Total number of shards
    #[must_use]
    pub const fn shard_count(&self) -> u32 {
        self.shard_count
    }

    /// Number of replicas per shard
    #[must_use]
    pub const fn replication_factor(&self) -> u32 {
        self.replication_factor
    }

    /// Number of servers
    #[must_use]
    pub const fn server_count(&self) -> u32 {
        self.server_count
    }

    /// Exact number of shards every server holds
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether shards divide evenly among servers, as random placement requires
    #[must_use]
    pub const fn shards_divide_evenly(&self) -> bool {
        self.shard_count % self.server_count == 0
    }
}
