//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Collection store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// SQLite database file. Collections live in a single table; every
    /// multi-collection write runs in one transaction.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// In-memory store. Contents vanish on restart, like the browser-local
    /// storage the original frontend used. Intended for tests and demos.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/paulocell.db"),
        }
    }
}

/// Trash retention and sweep configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrashConfig {
    /// Days a soft-deleted record stays recoverable before the sweeper
    /// purges it permanently.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Seconds between background sweeps.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Run the background sweeper (an immediate sweep at startup, then one
    /// per interval). Disable to drive sweeps manually.
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
}

fn default_retention_days() -> u32 {
    crate::DEFAULT_RETENTION_DAYS
}

fn default_sweep_interval_secs() -> u64 {
    crate::DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_sweep_enabled() -> bool {
    true
}

impl Default for TrashConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_enabled: default_sweep_enabled(),
        }
    }
}

impl TrashConfig {
    /// Get the retention window as a Duration.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(u64::from(self.retention_days) * 24 * 60 * 60)
    }

    /// Get the sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Validate trash configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.retention_days == 0 {
            return Err(
                "trash.retention_days cannot be 0; records would be purged the moment \
                 they are deleted, making restore impossible"
                    .to_string(),
            );
        }

        // A zero interval would make tokio::time::interval panic.
        if self.sweep_enabled && self.sweep_interval_secs == 0 {
            return Err(
                "trash.sweep_interval_secs cannot be 0 when the sweeper is enabled. \
                 Use a value >= 1 second."
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Collection store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Trash retention configuration.
    #[serde(default)]
    pub trash: TrashConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses the in-memory store and disables the
    /// background sweeper so tests drive sweeps themselves.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::Memory,
            trash: TrashConfig {
                sweep_enabled: false,
                ..Default::default()
            },
        }
    }
}
