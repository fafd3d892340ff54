//! Engine configuration.
//!
//! Everything is passed explicitly to
//! [`Repository::with_config`](crate::Repository::with_config); there are no
//! process-wide switches.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use docket_core::Result;
use docket_core::error::{Error, InvalidInputError};

/// Deadlines for each class of store call, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub insert_ms: u64,
    pub delete_ms: u64,
    /// Find-and-update and find-and-delete.
    pub modify_ms: u64,
    /// Finds and cursor reads.
    pub read_ms: u64,
    /// Index listing, creation and removal.
    pub index_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            insert_ms: 5_000,
            delete_ms: 5_000,
            modify_ms: 10_000,
            read_ms: 10_000,
            index_ms: 10_000,
        }
    }
}

impl Timeouts {
    pub fn insert(&self) -> Duration {
        Duration::from_millis(self.insert_ms)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_millis(self.delete_ms)
    }

    pub fn modify(&self) -> Duration {
        Duration::from_millis(self.modify_ms)
    }

    pub fn read(&self) -> Duration {
        Duration::from_millis(self.read_ms)
    }

    pub fn index(&self) -> Duration {
        Duration::from_millis(self.index_ms)
    }
}

/// Profiling of repository operations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    /// Measure elapsed time.
    pub enabled: bool,
    /// Also log each measurement at `info`.
    pub log: bool,
}

/// Top-level configuration.
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub timeouts: Timeouts,
    pub profiling: ProfilingConfig,
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Config {
                message: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Config {
                message: format!("{}: {}", path.display(), e),
            })
        })?;
        Self::from_json_str(&content)
    }

    /// Reject zero deadlines.
    pub fn validate(&self) -> Result<()> {
        let t = &self.timeouts;
        for (name, value) in [
            ("insert_ms", t.insert_ms),
            ("delete_ms", t.delete_ms),
            ("modify_ms", t.modify_ms),
            ("read_ms", t.read_ms),
            ("index_ms", t.index_ms),
        ] {
            if value == 0 {
                return Err(InvalidInputError::Config {
                    message: format!("timeouts.{name} must be greater than zero"),
                }
                .into());
            }
        }
        Ok(())
    }
}
