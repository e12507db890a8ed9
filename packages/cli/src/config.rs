use blockmail_editor::EditorConfig;
use blockmail_resolver::{ResolverConfig, DEFAULT_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "blockmail.config.json";

/// Blockmail configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Fill empty blocks with placeholder content in previews
    pub simulate_content: bool,

    /// Upper bound on each offer decision or profile lookup
    pub offer_timeout_ms: u64,

    /// Undo snapshots kept per session (0 = unbounded)
    pub history_limit: usize,

    /// Indent generated HTML
    pub pretty_html: bool,

    /// Output directory for rendered files
    pub out_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            simulate_content: true,
            offer_timeout_ms: DEFAULT_TIMEOUT_MS,
            history_limit: 100,
            pretty_html: false,
            out_dir: "dist".to_string(),
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults.
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig {
            history_limit: self.history_limit,
            simulate_content: self.simulate_content,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::with_timeout_ms(self.offer_timeout_ms)
    }
}
