use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{ResultSink, SinkError};
use crate::quiz::SessionRecord;

/// Appends each record as a row of a local CSV log
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ResultSink for CsvSink {
    fn name(&self) -> &str {
        "CSV log"
    }

    fn send(&mut self, record: &SessionRecord) -> Result<(), SinkError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Columns follow the record's fields; a new file gets them as a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        writer.serialize(record)?;
        writer.flush()?;

        info!(path = %self.path.display(), "record appended to csv log");
        Ok(())
    }
}
