use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::orchestrator::OrchestratorSettings;
use crate::transport::TransportDelays;
use crate::watcher::WatchSettings;

pub const DEFAULT_CONFIG_PATH: &str = ".deskprompt.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub delays: DelayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub app_name: String,
    /// Navigation entry that starts a fresh conversation; never listed.
    pub new_conversation_label: String,
    pub osascript: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            app_name: "ChatGPT".to_string(),
            new_conversation_label: "New chat".to_string(),
            osascript: "osascript".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub poll_interval_ms: u64,
    pub stable_samples: u32,
    pub max_wait_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 3_000,
            stable_samples: 3,
            max_wait_ms: 120_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub activate_settle_ms: u64,
    pub launch_settle_ms: u64,
    pub conversation_settle_ms: u64,
    pub post_submit_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            activate_settle_ms: 1_000,
            launch_settle_ms: 2_000,
            conversation_settle_ms: 1_000,
            post_submit_ms: 1_000,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise falls back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.target.app_name.trim().is_empty() {
            anyhow::bail!("target.app_name cannot be empty");
        }
        if self.watch.poll_interval_ms == 0 {
            anyhow::bail!("watch.poll_interval_ms must be greater than zero");
        }
        if self.watch.stable_samples == 0 {
            anyhow::bail!("watch.stable_samples must be at least 1");
        }
        Ok(())
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            poll_interval: Duration::from_millis(self.watch.poll_interval_ms),
            required_stable_samples: self.watch.stable_samples,
            max_wait: Duration::from_millis(self.watch.max_wait_ms),
        }
    }

    pub fn transport_delays(&self) -> TransportDelays {
        TransportDelays {
            activate_settle: Duration::from_millis(self.delays.activate_settle_ms),
            conversation_settle: Duration::from_millis(self.delays.conversation_settle_ms),
        }
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            min_interval: Duration::from_millis(self.pacing.min_interval_ms),
            launch_settle: Duration::from_millis(self.delays.launch_settle_ms),
            post_submit: Duration::from_millis(self.delays.post_submit_ms),
            new_conversation_label: self.target.new_conversation_label.clone(),
            transport: self.transport_delays(),
            watch: self.watch_settings(),
        }
    }
}
