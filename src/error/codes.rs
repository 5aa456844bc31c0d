/// Error code registry for demandflow
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Source (input) errors
/// - 3000-3999: Sink (output) errors
/// - 4000-4999: Mapping errors
/// - 5000-5999: Reduction errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;
    pub const CONFIG_UNSUPPORTED_SOURCE: u16 = 1004;

    // Source errors (2000-2999)
    pub const SOURCE_NOT_FOUND: u16 = 2001;
    pub const SOURCE_IO_ERROR: u16 = 2002;
    pub const SOURCE_PARSE_ERROR: u16 = 2003;

    // Sink errors (3000-3999)
    pub const SINK_IO_ERROR: u16 = 3001;
    pub const SINK_SERIALIZATION_ERROR: u16 = 3002;

    // Mapping errors (4000-4999)
    pub const MAPPING_MISSING_FIELD: u16 = 4001;
    pub const MAPPING_MALFORMED_FIELD: u16 = 4002;
    pub const MAPPING_OTHER: u16 = 4099;

    // Reduction errors (5000-5999)
    pub const REDUCTION_OVERFLOW: u16 = 5001;
    pub const REDUCTION_OTHER: u16 = 5099;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        ErrorCode::CONFIG_GENERIC => "General configuration error",
        ErrorCode::CONFIG_NOT_FOUND => "Configuration file not found",
        ErrorCode::CONFIG_INVALID_TOML => "Configuration file is not valid TOML",
        ErrorCode::CONFIG_INVALID_VALUE => "Invalid configuration value",
        ErrorCode::CONFIG_UNSUPPORTED_SOURCE => "Unsupported data source type",

        ErrorCode::SOURCE_NOT_FOUND => "Data source not found",
        ErrorCode::SOURCE_IO_ERROR => "Failed to read data source",
        ErrorCode::SOURCE_PARSE_ERROR => "Data source is not valid delimited text",

        ErrorCode::SINK_IO_ERROR => "Failed to write output",
        ErrorCode::SINK_SERIALIZATION_ERROR => "Failed to serialize output row",

        ErrorCode::MAPPING_MISSING_FIELD => "Record is missing a required field",
        ErrorCode::MAPPING_MALFORMED_FIELD => "Record field could not be parsed",
        ErrorCode::MAPPING_OTHER => "Record could not be mapped",

        ErrorCode::REDUCTION_OVERFLOW => "Aggregate value overflowed",
        ErrorCode::REDUCTION_OTHER => "Values could not be reduced",

        _ => "Unknown error",
    }
}
