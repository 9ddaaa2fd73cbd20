use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fuzzy-picker executable.
    pub picker: String,
    /// How long `gh` may reuse a cached pull request response.
    pub cache_ttl: String,
    /// Pretty-printer for pull request descriptions, fed on stdin. Empty disables it.
    pub markdown_viewer: String,
    /// Highlighter for pull request diffs, fed on stdin. Empty disables it.
    pub diff_viewer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            picker: "fzf".to_string(),
            cache_ttl: "5m".to_string(),
            markdown_viewer: "glow -s dark -".to_string(),
            diff_viewer: "delta".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`; a missing file yields the defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gh-branch").join("config.toml"))
    }
}
