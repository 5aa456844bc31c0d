//! Writing the aggregated table
//!
//! The table has three columns, `Date,context,Quantity`, one row per key,
//! sorted by date and then context.

use crate::demand::{DemandKey, Quantity};
use crate::engine::AggregateResult;
use crate::error::{AggregationError, ErrorCode, ErrorExt, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Serialize)]
struct OutputRow {
    #[serde(rename = "Date")]
    date: String,
    context: String,
    #[serde(rename = "Quantity")]
    quantity: Quantity,
}

/// Write the table to `path`, creating parent directories
///
/// Returns the number of rows written.
pub fn write_results(result: &AggregateResult<DemandKey, Quantity>, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).to_sink_error(ErrorCode::SINK_IO_ERROR, parent)?;
    }

    let file = File::create(path).to_sink_error(ErrorCode::SINK_IO_ERROR, path)?;
    let rows = write_table(result, file).map_err(|e| e.with_context(path.display()))?;

    debug!("Wrote {} rows to {}", rows, path.display());
    Ok(rows)
}

/// Write the table to any writer
pub fn write_table<W: Write>(result: &AggregateResult<DemandKey, Quantity>, writer: W) -> Result<usize> {
    let mut entries: Vec<_> = result.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut writer = csv::Writer::from_writer(writer);
    if entries.is_empty() {
        writer
            .write_record(["Date", "context", "Quantity"])
            .map_err(serialization_error)?;
    }

    for (key, quantity) in &entries {
        writer
            .serialize(OutputRow {
                date: key.date.format("%Y-%m-%d").to_string(),
                context: key.context.to_literal(),
                quantity: **quantity,
            })
            .map_err(serialization_error)?;
    }

    writer.flush().map_err(|e| {
        AggregationError::sink_with_code(ErrorCode::SINK_IO_ERROR, e.to_string(), None).with_source(e)
    })?;

    Ok(entries.len())
}

fn serialization_error(e: csv::Error) -> AggregationError {
    AggregationError::sink_with_code(ErrorCode::SINK_SERIALIZATION_ERROR, e.to_string(), None)
        .with_source(e)
}
