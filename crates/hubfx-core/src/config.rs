//! Hub configuration.

use crate::HubError;

/// Configuration for a [`crate::Hub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Capacity of the input and output broadcast channels.
    ///
    /// A subscriber that falls further behind than this skips messages
    /// (logged at `warn`).
    pub channel_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

impl HubConfig {
    pub(crate) fn validate(&self) -> Result<(), HubError> {
        if self.channel_capacity == 0 {
            return Err(HubError::invalid_config("channel_capacity must be non-zero"));
        }
        Ok(())
    }
}
