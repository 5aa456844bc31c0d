use crate::error::{AggregationError, ErrorCode};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

pub mod loader;

pub use loader::ConfigLoader;

/// Default location of the aggregated output table
pub const DEFAULT_OUTPUT_PATH: &str = "dataset/data_processed/demand_processed.csv";

/// Shortest series (in days) considered worth forecasting
pub const DEFAULT_MIN_SERIES_DAYS: usize = 60;

/// Get the global demandflow directory holding `config.toml`
pub fn get_global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "demandflow", "demandflow")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Names of the input columns read by the demand mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub date: String,
    pub country: String,
    pub description: String,
    pub quantity: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "InvoiceDate".to_string(),
            country: "Country".to_string(),
            description: "Description".to_string(),
            quantity: "Quantity".to_string(),
        }
    }
}

impl ColumnMapping {
    fn names(&self) -> [(&'static str, &str); 4] {
        [
            ("date", self.date.as_str()),
            ("country", self.country.as_str()),
            ("description", self.description.as_str()),
            ("quantity", self.quantity.as_str()),
        ]
    }
}

/// What the driver does with a record the mapper rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFailurePolicy {
    /// Abort the whole batch on the first rejected record
    #[default]
    Stop,
    /// Log the record, leave it out, and keep going
    Skip,
}

impl FromStr for RecordFailurePolicy {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(Self::Stop),
            "skip" => Ok(Self::Skip),
            other => Err(AggregationError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                format!("Unknown record failure policy '{}', expected 'stop' or 'skip'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    pub columns: ColumnMapping,
    pub output_path: PathBuf,
    pub on_record_failure: RecordFailurePolicy,
    pub min_series_days: usize,
    pub log_level: Option<String>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMapping::default(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            on_record_failure: RecordFailurePolicy::default(),
            min_series_days: DEFAULT_MIN_SERIES_DAYS,
            log_level: Some("info".to_string()),
        }
    }
}

impl AggregatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `DEMANDFLOW_*` environment overrides
    pub fn merge_env_vars(&mut self) -> Result<(), AggregationError> {
        self.merge_vars(|name| std::env::var(name).ok())
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), AggregationError> {
        if let Some(path) = var("DEMANDFLOW_OUTPUT_PATH") {
            self.output_path = PathBuf::from(path);
        }

        if let Some(level) = var("DEMANDFLOW_LOG_LEVEL") {
            self.log_level = Some(level);
        }

        if let Some(policy) = var("DEMANDFLOW_ON_RECORD_FAILURE") {
            self.on_record_failure = policy.parse()?;
        }

        Ok(())
    }

    /// Reject column mappings the mapper could not use
    pub fn validate(&self) -> Result<(), AggregationError> {
        let mut seen = HashSet::new();
        for (role, name) in self.columns.names() {
            if name.trim().is_empty() {
                return Err(AggregationError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("Column name for '{}' must not be empty", role),
                ));
            }
            if !seen.insert(name) {
                return Err(AggregationError::config_with_code(
                    ErrorCode::CONFIG_INVALID_VALUE,
                    format!("Column '{}' is mapped to more than one field", name),
                ));
            }
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(AggregationError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "Output path must not be empty",
            ));
        }

        Ok(())
    }
}
