//! Error taxonomy for a reconciliation run.
//!
//! Configuration, rule loading and classification errors are fatal: the run
//! stops before a report is written. Staging errors are per file and are
//! collected by the staging pipeline instead of being propagated.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, DedupError>;

#[derive(Error, Debug)]
pub enum DedupError {
    /// Library, incoming or output location unusable at start
    #[error("Configuration error for '{}': {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },

    /// Transliteration rule table missing or malformed
    #[error("Failed to load transliteration rules from {source_name}: {reason}")]
    RuleLoad { source_name: String, reason: String },

    /// A single file could not be copied into the Upload tree
    #[error("Failed to stage '{}' -> '{}': {source}", src.display(), dst.display())]
    Staging {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An incoming track could not be turned into a classification input
    #[error("Cannot classify '{}': {reason}", path.display())]
    Classification { path: PathBuf, reason: String },

    /// The JSON report could not be serialized or written
    #[error("Failed to write report '{}': {reason}", path.display())]
    Report { path: PathBuf, reason: String },
}

impl DedupError {
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        DedupError::Configuration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn rule_load(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        DedupError::RuleLoad {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the run may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DedupError::Staging { .. })
    }
}
