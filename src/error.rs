//! Error type shared by every pipeline stage.
//!
//! Each variant carries enough context (row position, path, table count) to
//! diagnose a failure without re-running at a higher verbosity.

use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ErdError>;

/// Errors raised by ingestion, graph building, rendering and filtering.
#[derive(Debug, thiserror::Error)]
pub enum ErdError {
    /// The metadata source could not be reached or read.
    #[error("metadata source unreachable: {}", path.display())]
    Connectivity {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited row did not match the declared header or field types.
    #[error("malformed row in {source_name} at line {line}: {reason}")]
    MalformedRow {
        source_name: String,
        line: usize,
        reason: String,
    },

    /// Filtering left no tables to render.
    #[error("no tables left to render ({before_filter} tables before filtering)")]
    EmptySchema { before_filter: usize },

    /// A key or column record points at something absent from the graph.
    #[error("dangling reference: {0}")]
    MissingReference(String),

    /// A foreign key whose column pairs disagree on the table pair.
    #[error("foreign key {constraint} spans more than one table pair")]
    InconsistentForeignKey { constraint: String },

    /// A stage was started without the artifact an earlier stage produces.
    #[error("{stage}: missing upstream artifact {}", path.display())]
    MissingUpstreamArtifact { stage: &'static str, path: PathBuf },

    /// An output artifact could not be persisted.
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file unreadable or invalid.
    #[error("invalid config {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// A schema or table filter pattern is not a valid glob.
    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Delimited output could not be produced.
    #[error("failed to write delimited output")]
    Csv(#[from] csv::Error),

    /// Persisted diagram model could not be decoded.
    #[error("invalid diagram model {}: {reason}", path.display())]
    InvalidModel { path: PathBuf, reason: String },
}

impl ErdError {
    pub(crate) fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> Self {
        ErdError::MalformedRow {
            source_name: source_name.to_string(),
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_message_names_line() {
        let err = ErdError::malformed("columns.csv", 7, "expected 9 fields, found 8");
        assert_eq!(
            err.to_string(),
            "malformed row in columns.csv at line 7: expected 9 fields, found 8"
        );
    }

    #[test]
    fn test_io_source_is_chained_not_repeated() {
        let err = ErdError::Write {
            path: "out/schema.dbml".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "Is a directory"),
        };
        assert_eq!(err.to_string(), "failed to write out/schema.dbml");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Is a directory"));
    }

    #[test]
    fn test_empty_schema_message_carries_count() {
        let err = ErdError::EmptySchema { before_filter: 12 };
        assert!(err.to_string().contains("12 tables before filtering"));
    }
}
