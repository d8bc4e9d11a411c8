//! Destinations for completed session records.

pub mod csv;
pub mod notion;

use thiserror::Error;
use tracing::warn;

use crate::config::{Config, SinkKind};
use crate::quiz::SessionRecord;

pub use self::csv::CsvSink;
pub use self::notion::NotionSink;

/// Errors a sink can report. None of them are fatal to the quiz.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The sink is missing settings it needs (credentials, paths).
    #[error("sink not configured: {0}")]
    NotConfigured(String),

    /// The remote service rejected the credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote service rejected the record itself.
    #[error("record rejected: {0}")]
    Validation(String),

    /// Any other non-success response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("network error: {0}")]
    Network(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] ::csv::Error),
}

/// Receives one record per completed batch
pub trait ResultSink {
    /// Human readable name shown in the result banners
    fn name(&self) -> &str;

    fn send(&mut self, record: &SessionRecord) -> Result<(), SinkError>;
}

impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(&mut self, record: &SessionRecord) -> Result<(), SinkError> {
        (**self).send(record)
    }
}

/// Accepts and discards every record
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ResultSink for NoopSink {
    fn name(&self) -> &str {
        "nowhere"
    }

    fn send(&mut self, _record: &SessionRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Stand-in for a sink that could not be built. Every send fails with the
/// reason, so the problem shows up next to the score instead of at startup.
#[derive(Debug, Clone)]
pub struct UnavailableSink {
    name: String,
    reason: String,
}

impl UnavailableSink {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl ResultSink for UnavailableSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, _record: &SessionRecord) -> Result<(), SinkError> {
        Err(SinkError::NotConfigured(self.reason.clone()))
    }
}

/// Build the sink selected in `config`.
///
/// A sink that cannot be built is replaced by an [`UnavailableSink`], so a
/// bad setup costs the record, never the quiz.
pub fn from_config(config: &Config) -> Box<dyn ResultSink> {
    match config.sink {
        SinkKind::Notion => match NotionSink::from_settings(&config.notion) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                warn!(error = %e, "Notion sink unavailable");
                Box::new(UnavailableSink::new("Notion", e.to_string()))
            }
        },
        SinkKind::Csv => Box::new(CsvSink::new(config.csv_path())),
        SinkKind::None => Box::new(NoopSink),
    }
}
