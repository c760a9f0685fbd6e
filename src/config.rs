use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::composer::DEFAULT_MAX_ATTEMPTS;
use crate::error::{self, GroupingError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_group_size")]
    pub group_size: usize,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_balance_gender")]
    pub balance_gender: bool,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
    #[serde(default = "default_groups_file")]
    pub groups_file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

fn default_group_size() -> usize {
    3
}
fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}
fn default_balance_gender() -> bool {
    true
}
fn default_history_file() -> PathBuf {
    PathBuf::from("history.json")
}
fn default_groups_file() -> PathBuf {
    PathBuf::from("groups.md")
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_roles() -> Vec<String> {
    ["Manager", "Scribe", "Reporter", "Skeptic"]
        .iter()
        .map(|r| r.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            group_size: default_group_size(),
            max_attempts: default_max_attempts(),
            balance_gender: default_balance_gender(),
            history_file: default_history_file(),
            groups_file: default_groups_file(),
            log_level: default_log_level(),
            seed: None,
            roles: default_roles(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the user config dir when `path` is `None`.
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?;
            Ok(config)
        } else if explicit {
            anyhow::bail!("Config file {} does not exist", path.display())
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("groupwise")
            .join("config.toml")
    }

    pub fn validate(&self) -> error::Result<()> {
        if self.group_size == 0 {
            return Err(GroupingError::InvalidConfiguration(
                "group_size must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(GroupingError::InvalidConfiguration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
