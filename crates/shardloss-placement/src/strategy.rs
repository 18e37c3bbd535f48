//! Placement strategy interface

use crate::assignment::Assignment;
use crate::mirror::MirrorPlacement;
use crate::paired::PairedRandomPlacement;
use crate::random::RandomPlacement;
use rand::RngCore;
use shardloss_common::{Config, Result};
use std::fmt;

/// A way of distributing shard replicas over servers
pub trait PlacementStrategy: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    /// Check the strategy-specific preconditions on a config
    ///
    /// Called before any placement work starts.
    fn validate(&self, config: &Config) -> Result<()>;

    /// Produce a complete assignment
    ///
    /// Never returns a partially filled assignment.
    fn place(&self, config: &Config, rng: &mut dyn RngCore) -> Result<Assignment>;

    /// Produce a complete assignment together with the number of fill
    /// attempts it took
    fn place_counted(&self, config: &Config, rng: &mut dyn RngCore) -> Result<(Assignment, u32)> {
        self.place(config, rng).map(|assignment| (assignment, 1))
    }
}

/// Selector for the built-in strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Greedy random fill with bounded retry
    Random,
    /// Random fill with one replica per parity class
    PairedRandom,
    /// Deterministic mirror pairs
    Mirror,
}

impl Strategy {
    /// Instantiate the strategy; `max_attempts` only applies to [`Strategy::Random`]
    #[must_use]
    pub fn build(self, max_attempts: u32) -> Box<dyn PlacementStrategy> {
        match self {
            Self::Random => Box::new(RandomPlacement::new(max_attempts)),
            Self::PairedRandom => Box::new(PairedRandomPlacement),
            Self::Mirror => Box::new(MirrorPlacement),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => write!(f, "random"),
            Self::PairedRandom => write!(f, "paired-random"),
            Self::Mirror => write!(f, "mirror"),
        }
    }
}
