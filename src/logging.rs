//! File-backed tracing setup. The terminal belongs to the quiz, so log
//! lines go to `<state dir>/mmath.log`.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MMATH_LOG";
const DEFAULT_FILTER: &str = "info";

pub fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `path`.
///
/// Returns an error if the file cannot be opened or a subscriber is
/// already installed; callers carry on without logging in that case.
pub fn init(path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("mmath.log");

        // A subscriber may already be installed by another test in this
        // process; the file must exist either way.
        let _ = init(&path);
        assert!(path.exists());
    }
}
