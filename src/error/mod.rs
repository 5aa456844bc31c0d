use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::ErrorExt;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, AggregationError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a map function on a single record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("malformed field '{field}' ({value:?}): {reason}")]
    MalformedField {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl MappingError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn malformed(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedField {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> u16 {
        match self {
            Self::MissingField { .. } => ErrorCode::MAPPING_MISSING_FIELD,
            Self::MalformedField { .. } => ErrorCode::MAPPING_MALFORMED_FIELD,
            Self::Other(_) => ErrorCode::MAPPING_OTHER,
        }
    }
}

/// Failure of a reduce function on a single key
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReductionError {
    #[error("aggregate overflowed after {count} values")]
    Overflow { count: usize },

    #[error("{0}")]
    Other(String),
}

impl ReductionError {
    pub fn code(&self) -> u16 {
        match self {
            Self::Overflow { .. } => ErrorCode::REDUCTION_OVERFLOW,
            Self::Other(_) => ErrorCode::REDUCTION_OTHER,
        }
    }
}

/// The unified error type for aggregation runs
#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Source error: {message}")]
    Source {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Sink error: {message}")]
    Sink {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{:04}] Mapping failed at record {record}: {source}", .source.code())]
    Mapping {
        /// 1-based position of the record in the input batch
        record: usize,
        #[source]
        source: MappingError,
    },

    #[error("[E{:04}] Reduction failed for key {key}: {source}", .source.code())]
    Reduction {
        key: String,
        #[source]
        source: ReductionError,
    },
}

impl AggregationError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::config_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a source error with specific code and path
    pub fn source_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Source {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a sink error with specific code and path
    pub fn sink_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Sink {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn mapping(record: usize, source: MappingError) -> Self {
        Self::Mapping { record, source }
    }

    pub fn reduction(key: impl Display, source: ReductionError) -> Self {
        Self::Reduction {
            key: key.to_string(),
            source,
        }
    }

    /// Add a source error to this error
    ///
    /// Mapping and reduction errors already carry their cause and are
    /// returned unchanged.
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Source { source: src, .. }
            | Self::Sink { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Mapping { .. } | Self::Reduction { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Source { message, .. }
            | Self::Sink { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
            Self::Reduction { key, .. } => {
                *key = format!("{} ({})", key, context);
            }
            Self::Mapping { .. } => {}
        }
        self
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Source { .. } => 3,
            Self::Sink { .. } => 4,
            Self::Mapping { .. } => 5,
            Self::Reduction { .. } => 6,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. } | Self::Source { code, .. } | Self::Sink { code, .. } => {
                *code
            }
            Self::Mapping { source, .. } => source.code(),
            Self::Reduction { source, .. } => source.code(),
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Source { message, path, .. } => match path {
                Some(p) => format!("Could not read {}: {}", p.display(), message),
                None => format!("Could not read input: {}", message),
            },
            Self::Sink { message, path, .. } => match path {
                Some(p) => format!("Could not write {}: {}", p.display(), message),
                None => format!("Could not write output: {}", message),
            },
            Self::Mapping { record, source } => {
                format!("Record {} could not be mapped: {}", record, source)
            }
            Self::Reduction { key, source } => {
                format!("Values for {} could not be reduced: {}", key, source)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_mapping_error_display_includes_code_and_record() {
        let err = AggregationError::mapping(3, MappingError::missing("Quantity"));
        let rendered = err.to_string();
        assert!(rendered.starts_with("[E4001]"), "{rendered}");
        assert!(rendered.contains("record 3"));
        assert!(rendered.contains("Quantity"));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_reduction_error_code() {
        let err = AggregationError::reduction("k", ReductionError::Overflow { count: 2 });
        assert_eq!(err.code(), ErrorCode::REDUCTION_OVERFLOW);
        assert_eq!(err.exit_code(), 6);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_with_context_and_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AggregationError::config("bad file")
            .with_context("settings.toml")
            .with_source(io);

        assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);
        assert!(err.to_string().contains("bad file: settings.toml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_user_message_mentions_path() {
        let err = AggregationError::sink_with_code(
            ErrorCode::SINK_IO_ERROR,
            "disk full",
            Some(PathBuf::from("/tmp/out.csv")),
        );
        assert_eq!(err.user_message(), "Could not write /tmp/out.csv: disk full");
    }
}
