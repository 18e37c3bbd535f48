//! Error types for ShardLoss
//!
//! This module defines the common error types used throughout the system.

use thiserror::Error;

/// Common result type for ShardLoss operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for ShardLoss
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{strategy} placement requires replication factor 2, got {factor}")]
    UnsupportedReplicationFactor { strategy: &'static str, factor: u32 },

    #[error("failed to load settings: {0}")]
    Settings(String),

    // Placement errors
    #[error("placement exhausted after {attempts} attempts without filling every server")]
    PlacementExhausted { attempts: u32 },

    #[error("assignment invariant violated: {0}")]
    InvariantViolation(String),

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an invariant violation error
    pub fn invariant_violation(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this error was caused by the parameters the user supplied
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_)
                | Self::UnsupportedReplicationFactor { .. }
                | Self::Settings(_)
        )
    }
}
