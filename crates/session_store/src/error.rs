use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a session manager while accepting, persisting or
/// reading transcript records.
#[derive(Debug, Error)]
pub enum SessionManagerError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON at line {line}: {source}")]
    JsonLineParse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize transcript record: {source}")]
    JsonSerialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("missing session header line")]
    MissingHeader,

    #[error("line {line} must be a session header record")]
    InvalidHeaderRecord { line: usize },

    #[error("line {line} must be an entry record")]
    InvalidEntryRecord { line: usize },

    #[error("line {line} has unsupported session version {found}; expected 1")]
    UnsupportedVersion { line: usize, found: u32 },

    #[error("line {line} was written by runtime '{found}'; expected '{expected}'")]
    RuntimeMismatch {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("line {line} contains a duplicate entry id '{id}'")]
    DuplicateEntryId { line: usize, id: String },

    #[error("session backend failure: {message}")]
    Backend { message: String },
}

impl SessionManagerError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn json_line(line: usize, source: serde_json::Error) -> Self {
        Self::JsonLineParse { line, source }
    }

    #[must_use]
    pub fn json_serialize(source: serde_json::Error) -> Self {
        Self::JsonSerialize { source }
    }

    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
