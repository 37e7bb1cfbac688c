//! Hub construction errors.

use thiserror::Error;

/// Errors raised while constructing a [`crate::Hub`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    /// The hub was created outside of a tokio runtime, so effect tasks
    /// have nowhere to run.
    #[error("hub requires a tokio runtime: {reason}")]
    NoRuntime {
        /// Underlying runtime lookup failure
        reason: String,
    },

    /// The supplied configuration cannot be used.
    #[error("invalid hub configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration
        reason: String,
    },
}

impl HubError {
    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
