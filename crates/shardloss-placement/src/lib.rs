//! ShardLoss Placement - shard distribution strategies
//!
//! This crate distributes `shard_count` shards over `server_count` servers
//! so that every shard has `replication_factor` replicas on distinct servers
//! and every server is filled to exactly its capacity.
//!
//! # Strategies
//!
//! ## Random
//! Greedy random fill in a fixed shard order. A fill can dead-end when the
//! only servers with free slots already hold the shard; the whole fill is
//! then reseeded and retried, up to a bounded number of attempts.
//!
//! ## Paired random
//! Random fill for replication factor 2 that always puts one replica on an
//! even-id server and the other on an odd-id server. Never dead-ends.
//!
//! ## Mirror
//! Deterministic layout: servers `2k-1` and `2k` both hold the `k`-th
//! contiguous slice of the shard range.
//!
//! # Example
//! ```ignore
//! use rand::{SeedableRng, rngs::StdRng};
//! use shardloss_common::Config;
//! use shardloss_placement::{PlacementStrategy, Strategy};
//!
//! let config = Config::new(100, 2, 10)?;
//! let placement = Strategy::Random.build(10_000);
//! let assignment = placement.place(&config, &mut StdRng::seed_from_u64(7))?;
//! ```

pub mod assignment;
pub mod mirror;
pub mod paired;
pub mod random;
pub mod strategy;

pub use assignment::Assignment;
pub use mirror::MirrorPlacement;
pub use paired::PairedRandomPlacement;
pub use random::RandomPlacement;
pub use strategy::{PlacementStrategy, Strategy};
