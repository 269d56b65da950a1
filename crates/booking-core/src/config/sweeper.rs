//! Expiry sweeper configuration.

use serde::{Deserialize, Serialize};

/// Background expiry sweep settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweeper is scheduled at startup.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Six-field cron expression (with seconds) for the sweep.
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_schedule(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "*/30 * * * * *".to_string()
}
