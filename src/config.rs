//! Configuration for the session orchestrator
//!
//! TOML-deserializable with built-in defaults defined in code. Missing keys
//! fall back to the defaults, so an empty file (or `Default::default()`)
//! gives the reference behavior: 10 second idle delay, 30 second ambient
//! ceiling.

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    /// Idle period before the watchdog fires, in milliseconds
    #[serde(default = "default_idle_delay_ms")]
    pub idle_delay_ms: u64,

    /// Hard ceiling on ambient clip playback, in milliseconds
    ///
    /// When the ceiling elapses before the sink's completion signal, the
    /// watchdog forces the stream to stop.
    #[serde(default = "default_ambient_ceiling_ms")]
    pub ambient_ceiling_ms: u64,

    /// Directory scanned for ambient audio clips (optional)
    ///
    /// When unset or empty, the watchdog disconnects without playing
    /// anything.
    #[serde(default)]
    pub ambient_dir: Option<PathBuf>,

    /// Maximum number of pending tracks included in a status snapshot
    #[serde(default = "default_queue_display_limit")]
    pub queue_display_limit: usize,
}

fn default_idle_delay_ms() -> u64 {
    10_000
}

fn default_ambient_ceiling_ms() -> u64 {
    30_000
}

fn default_queue_display_limit() -> usize {
    10
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            idle_delay_ms: default_idle_delay_ms(),
            ambient_ceiling_ms: default_ambient_ceiling_ms(),
            ambient_dir: None,
            queue_display_limit: default_queue_display_limit(),
        }
    }
}

impl OrchestratorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Idle delay as a [`Duration`]
    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    /// Ambient playback ceiling as a [`Duration`]
    pub fn ambient_ceiling(&self) -> Duration {
        Duration::from_millis(self.ambient_ceiling_ms)
    }
}
