//! Reading input rows from delimited text
//!
//! Rows are parsed eagerly into [`Record`]s keyed by header name. Short rows
//! are accepted here; the mapper decides whether a missing column matters.

use crate::error::{AggregationError, ErrorCode, ErrorExt, Result};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One input row with named fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    row: usize,
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new(row: usize, fields: HashMap<String, String>) -> Self {
        Self { row, fields }
    }

    pub fn from_pairs<I, K, V>(row: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            row,
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// 1-based data row number, header excluded
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
}

impl SourceFormat {
    /// Detect the format from the file extension
    pub fn detect(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xls" => Err(AggregationError::config_with_code(
                ErrorCode::CONFIG_UNSUPPORTED_SOURCE,
                format!(
                    "Spreadsheet sources are not supported, export {} to CSV first",
                    path.display()
                ),
            )),
            other => Err(AggregationError::config_with_code(
                ErrorCode::CONFIG_UNSUPPORTED_SOURCE,
                format!("Unsupported file type: '.{}'", other),
            )),
        }
    }

    fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

/// Read every row of the file at `path`
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let format = SourceFormat::detect(path)?;

    if !path.exists() {
        return Err(AggregationError::source_with_code(
            ErrorCode::SOURCE_NOT_FOUND,
            "data source does not exist",
            Some(path.to_path_buf()),
        ));
    }

    let file = File::open(path).to_source_error(ErrorCode::SOURCE_IO_ERROR, path)?;
    let records = parse_records(file, format)
        .map_err(|e| e.with_context(path.display()))?;

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Parse delimited text with a header row
pub fn parse_records<R: Read>(reader: R, format: SourceFormat) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter())
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers().map_err(parse_error)?.clone();
    let mut seen = HashSet::new();
    if let Some(duplicate) = headers.iter().find(|header| !seen.insert(*header)) {
        return Err(AggregationError::source_with_code(
            ErrorCode::SOURCE_PARSE_ERROR,
            format!("duplicate column '{}' in header", duplicate),
            None,
        ));
    }

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = result.map_err(parse_error)?;
        if row.len() > headers.len() {
            debug!(
                row = index + 1,
                "Ignoring {} fields beyond the {} header columns",
                row.len() - headers.len(),
                headers.len()
            );
        }
        let fields = headers
            .iter()
            .zip(row.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        records.push(Record::new(index + 1, fields));
    }

    Ok(records)
}

fn parse_error(e: csv::Error) -> AggregationError {
    AggregationError::source_with_code(ErrorCode::SOURCE_PARSE_ERROR, e.to_string(), None)
        .with_source(e)
}
