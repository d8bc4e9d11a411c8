use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "mmath";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("mmath_config.json"))
    }

    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("mmath.log"))
    }

    pub fn results_csv_path() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("results.csv"))
            .unwrap_or_else(|| PathBuf::from("mmath_results.csv"))
    }
}
