//! # Player Configuration
//!
//! Tunable settings shared by the backend adapters. Configuration is built
//! through chained setters and validated before a player is constructed, so
//! misconfiguration surfaces at startup instead of mid-playback.
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::config::PlayerConfig;
//! use std::time::Duration;
//!
//! let config = PlayerConfig::new()
//!     .with_progress_interval(Duration::from_millis(250));
//!
//! config.validate().expect("invalid player configuration");
//! ```

use crate::error::{Error, Result};
use std::time::Duration;

/// Default interval between progress snapshots.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Intervals below this are rejected outright.
pub const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(10);

/// Intervals below this are accepted but logged as aggressive.
const AGGRESSIVE_PROGRESS_INTERVAL: Duration = Duration::from_millis(50);

/// Configuration for a playback adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Cadence of progress snapshots while media is playing.
    pub progress_interval: Duration,
    /// Per-subscriber buffer size of the diagnostics channel.
    pub diagnostics_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            diagnostics_buffer: crate::events::DEFAULT_DIAGNOSTICS_BUFFER,
        }
    }
}

impl PlayerConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the progress snapshot interval.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Set the diagnostics channel buffer size.
    pub fn with_diagnostics_buffer(mut self, capacity: usize) -> Self {
        self.diagnostics_buffer = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the progress interval is below
    /// [`MIN_PROGRESS_INTERVAL`] or the diagnostics buffer is zero.
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval < MIN_PROGRESS_INTERVAL {
            return Err(Error::Config(format!(
                "progress interval {:?} is below the minimum of {:?}",
                self.progress_interval, MIN_PROGRESS_INTERVAL
            )));
        }

        if self.progress_interval < AGGRESSIVE_PROGRESS_INTERVAL {
            tracing::warn!(
                interval_ms = self.progress_interval.as_millis() as u64,
                "Aggressive progress interval configured; expect elevated wakeup load"
            );
        }

        if self.diagnostics_buffer == 0 {
            return Err(Error::Config(
                "diagnostics buffer must hold at least one event".to_string(),
            ));
        }

        Ok(())
    }
}
