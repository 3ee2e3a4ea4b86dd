use crate::error::SyncResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Timing and file layout of the external editor buffer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// How often the buffer is polled for edits
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Quiet period an edit must survive before it is parsed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Upper bound on debounce rounds while the user keeps typing
    #[serde(default = "default_max_debounce_rounds")]
    pub max_debounce_rounds: u32,

    /// Buffer path of the generated source module
    #[serde(default = "default_source_path")]
    pub source_path: String,

    /// Buffer path of the props artifact
    #[serde(default = "default_props_path")]
    pub props_path: String,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_debounce_rounds() -> u32 {
    10
}

fn default_source_path() -> String {
    "App.jsx".to_string()
}

fn default_props_path() -> String {
    "props.js".to_string()
}

impl SyncConfig {
    pub fn from_json(source: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load from a JSON file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> SyncResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            debounce_ms: default_debounce_ms(),
            max_debounce_rounds: default_max_debounce_rounds(),
            source_path: default_source_path(),
            props_path: default_props_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let config = SyncConfig::from_json(r#"{ "pollIntervalMs": 500, "sourcePath": "Screen.jsx" }"#)
            .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.source_path, "Screen.jsx");
        assert_eq!(config.props_path, "props.js");
        assert_eq!(config.debounce_ms, 300);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = SyncConfig::load(Path::new("/nonexistent/drafter.sync.json")).unwrap();
        assert_eq!(config, SyncConfig::default());
    }
}
