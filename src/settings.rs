use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::models::DEFAULT_POMODORO_DURATION_SECS;

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Tunables for coordinators created by a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerSettings {
    /// Period of the live update tick while a session runs. Must be at most
    /// one second.
    pub tick_interval_ms: u64,
    /// Target used by `start_pomodoro` when the caller gives none.
    pub default_pomodoro_duration_secs: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            default_pomodoro_duration_secs: DEFAULT_POMODORO_DURATION_SECS,
        }
    }
}

impl TrackerSettings {
    pub fn from_json(contents: &str) -> Result<Self> {
        let settings: Self =
            serde_json::from_str(contents).context("Failed to parse tracker settings")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads settings from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&contents)
            .with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > DEFAULT_TICK_INTERVAL_MS {
            bail!(
                "tickIntervalMs must be between 1 and {} (got {})",
                DEFAULT_TICK_INTERVAL_MS,
                self.tick_interval_ms
            );
        }
        if self.default_pomodoro_duration_secs == 0 {
            bail!("defaultPomodoroDurationSecs must be positive");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
