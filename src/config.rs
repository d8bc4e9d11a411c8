use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::quiz::QuizConfig;
use crate::sink::notion::DEFAULT_TIMEOUT_SECS;

pub const TOKEN_ENV: &str = "NOTION_TOKEN";
pub const DATABASE_ENV: &str = "NOTION_DATABASE_ID";

/// Where completed sessions are recorded
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Notion,
    Csv,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotionSettings {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub quiz: QuizConfig,
    pub sink: SinkKind,
    pub notion: NotionSettings,
    pub csv_path: Option<PathBuf>,
}

impl Config {
    /// Fill Notion credentials from the environment when present
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(token) = lookup(TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.notion.token = Some(token);
        }
        if let Some(id) = lookup(DATABASE_ENV).filter(|v| !v.is_empty()) {
            self.notion.database_id = Some(id);
        }
    }

    pub fn csv_path(&self) -> PathBuf {
        self.csv_path
            .clone()
            .unwrap_or_else(AppDirs::results_csv_path)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => warn!(path = %self.path.display(), error = %e, "ignoring unreadable config"),
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}
