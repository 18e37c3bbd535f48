//! Core type definitions for ShardLoss
//!
//! Shards and servers are both identified by 1-based integers. The newtypes
//! keep the two id spaces from being mixed up in placement code.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Identifier of a shard (`1..=shard_count`)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0}")]
pub struct ShardId(u32);

impl ShardId {
    /// Create a shard id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// All shard ids for a given shard count, ascending
    pub fn all(shard_count: u32) -> impl DoubleEndedIterator<Item = Self> + Clone {
        (1..=shard_count).map(Self)
    }
}

/// Identifier of a server (`1..=server_count`)
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[display("{_0}")]
pub struct ServerId(u32);

impl ServerId {
    /// Create a server id
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw id
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Zero-based slot of this server in dense per-server tables
    ///
    /// Server ids start at 1. The invalid id 0 saturates to slot 0, so
    /// callers that accept arbitrary ids must reject it first.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// Parity class this server belongs to
    #[must_use]
    pub const fn parity(self) -> Parity {
        if self.0 % 2 == 0 { Parity::Even } else { Parity::Odd }
    }

    /// All server ids for a given server count, ascending
    pub fn all(server_count: u32) -> impl DoubleEndedIterator<Item = Self> + Clone {
        (1..=server_count).map(Self)
    }
}

/// Parity class of a server id
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Parity {
    #[display("even")]
    Even,
    #[display("odd")]
    Odd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_parity() {
        assert_eq!(ServerId::new(1).parity(), Parity::Odd);
        assert_eq!(ServerId::new(2).parity(), Parity::Even);
        assert_eq!(ServerId::new(99).parity(), Parity::Odd);
    }

    #[test]
    fn test_server_index_is_zero_based() {
        assert_eq!(ServerId::new(1).index(), 0);
        assert_eq!(ServerId::new(10).index(), 9);
        assert_eq!(ServerId::new(0).index(), 0);
    }

    #[test]
    fn test_id_ranges() {
        let shards: Vec<u32> = ShardId::all(4).map(ShardId::get).collect();
        assert_eq!(shards, vec![1, 2, 3, 4]);
        assert_eq!(ServerId::all(0).count(), 0);
        assert_eq!(ServerId::all(6).last(), Some(ServerId::new(6)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ShardId::new(7).to_string(), "7");
        assert_eq!(ServerId::new(3).to_string(), "3");
        assert_eq!(Parity::Even.to_string(), "even");
    }
}
