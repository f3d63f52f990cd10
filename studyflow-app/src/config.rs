use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deck file; the app data dir is used when unset
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Timestamped backups kept next to the deck file (default: 10)
    #[serde(default = "default_max_backups")]
    pub max_backups: usize,

    /// Reveal the answer automatically after this many seconds
    #[serde(default)]
    pub auto_flip_secs: Option<u32>,

    /// tracing filter used when STUDYFLOW_LOG is unset (default: "warn")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_max_backups() -> usize {
    10
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            max_backups: default_max_backups(),
            auto_flip_secs: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Loads `explicit` (which must exist) or the default config file, falling
    /// back to defaults when the latter is absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    return Ok(Config::default());
                }
                p
            }
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "studyflow", "StudyFlow")
            .map(|pd| pd.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
