//! ShardLoss Common - Shared types and utilities
//!
//! This crate provides the identifiers, simulation parameters and error
//! definitions used across all ShardLoss components.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, Settings};
pub use error::{Error, Result};
pub use types::*;
