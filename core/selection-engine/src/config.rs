//! FILENAME: core/selection-engine/src/config.rs
//! Session configuration.

use serde::{Deserialize, Serialize};
use crate::error::SelectionError;

/// The service rejects result sets above this many cells.
pub const DEFAULT_HARD_LIMIT: u64 = 800_000;

/// Selections above this many cells are flagged but still allowed.
pub const DEFAULT_WARN_THRESHOLD: u64 = 600_000;

fn default_hard_limit() -> u64 {
    DEFAULT_HARD_LIMIT
}

fn default_warn_threshold() -> u64 {
    DEFAULT_WARN_THRESHOLD
}

fn default_true() -> bool {
    true
}

/// Thresholds for the cardinality estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_hard_limit")]
    pub hard_limit: u64,

    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        EstimatorConfig {
            hard_limit: DEFAULT_HARD_LIMIT,
            warn_threshold: DEFAULT_WARN_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Emit explicit codes of time dimensions in ascending index order.
    #[serde(default = "default_true")]
    pub sort_time_chronologically: bool,

    /// List time dimension categories newest first in the interactive view.
    #[serde(default = "default_true")]
    pub time_newest_first: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            estimator: EstimatorConfig::default(),
            sort_time_chronologically: true,
            time_newest_first: true,
        }
    }
}

impl SessionConfig {
    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SelectionError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.estimator.hard_limit == 0 {
            return Err(SelectionError::Config("hard_limit must be positive".to_string()));
        }
        if self.estimator.warn_threshold > self.estimator.hard_limit {
            return Err(SelectionError::Config(format!(
                "warn_threshold {} is above hard_limit {}",
                self.estimator.warn_threshold, self.estimator.hard_limit
            )));
        }
        Ok(())
    }
}
