use drafter_document::{BindingTarget, RefKind};
use drafter_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "drafter.config.json";

/// Drafter project configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document snapshot used to seed commands
    #[serde(default = "default_snapshot")]
    pub snapshot: String,

    /// Directory mirrored by `drafter sync`
    #[serde(default = "default_buffer_dir")]
    pub buffer_dir: String,

    /// Tokens and data fields bindings may reference
    #[serde(default)]
    pub targets: Vec<TargetConfig>,

    #[serde(default)]
    pub sync: SyncConfig,
}

fn default_snapshot() -> String {
    "document.json".to_string()
}

fn default_buffer_dir() -> String {
    "buffer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    pub kind: RefKind,
    pub id: String,
    pub name: String,

    /// Text shown when the binding is rendered as content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl From<&TargetConfig> for BindingTarget {
    fn from(target: &TargetConfig) -> Self {
        BindingTarget {
            kind: target.kind,
            id: target.id.clone(),
            name: target.name.clone(),
            default_display: target.display.clone(),
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn get_snapshot_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.snapshot)
    }

    pub fn get_buffer_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.buffer_dir)
    }

    pub fn binding_targets(&self) -> Vec<BindingTarget> {
        self.targets.iter().map(BindingTarget::from).collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            buffer_dir: default_buffer_dir(),
            targets: vec![],
            sync: SyncConfig::default(),
        }
    }
}
