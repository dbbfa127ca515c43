//! Engine configuration.

use std::time::Duration;

use formcheck_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tunables for the frame analysis loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum time between two committed phase transitions (milliseconds)
    pub min_dwell_ms: u64,

    /// Posture and movement checks run on every Nth frame
    pub analysis_interval: u64,

    /// Number of feedback items surfaced for display
    pub feedback_display_limit: usize,

    /// Buffered events per subscriber before the slowest one lags
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_dwell_ms: 300,
            analysis_interval: 15,
            feedback_display_limit: 2,
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file, with `FORMCHECK_*` environment overrides
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("FORMCHECK"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("FORMCHECK"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let config: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis_interval == 0 {
            return Err(Error::Config("analysis_interval must be at least 1".into()));
        }
        if self.feedback_display_limit == 0 {
            return Err(Error::Config(
                "feedback_display_limit must be at least 1".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".into()));
        }
        Ok(())
    }

    pub fn min_dwell(&self) -> Duration {
        Duration::from_millis(self.min_dwell_ms)
    }

    pub(crate) fn min_dwell_nanos(&self) -> i64 {
        i64::try_from(self.min_dwell().as_nanos()).unwrap_or(i64::MAX)
    }
}
