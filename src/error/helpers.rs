use super::{AggregationError, ErrorCode};
use std::path::Path;

/// Extension trait for converting foreign errors into [`AggregationError`]
pub trait ErrorExt<T> {
    fn to_config_error(self, message: impl Into<String>) -> Result<T, AggregationError>;
    fn to_source_error(self, code: u16, path: &Path) -> Result<T, AggregationError>;
    fn to_sink_error(self, code: u16, path: &Path) -> Result<T, AggregationError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_config_error(self, message: impl Into<String>) -> Result<T, AggregationError> {
        self.map_err(|e| AggregationError::config(message).with_source(e))
    }

    fn to_source_error(self, code: u16, path: &Path) -> Result<T, AggregationError> {
        self.map_err(|e| {
            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
            AggregationError::source_with_code(code, e.to_string(), Some(path.to_path_buf()))
                .with_source(e)
        })
    }

    fn to_sink_error(self, code: u16, path: &Path) -> Result<T, AggregationError> {
        self.map_err(|e| {
            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
            AggregationError::sink_with_code(code, e.to_string(), Some(path.to_path_buf()))
                .with_source(e)
        })
    }
}

/// Create a not found error for a configuration file
pub fn config_not_found(path: impl AsRef<Path>) -> AggregationError {
    AggregationError::config_with_code(
        ErrorCode::CONFIG_NOT_FOUND,
        format!("Configuration file not found: {}", path.as_ref().display()),
    )
}
