//! Demand-specific instantiation of the engine
//!
//! Records are keyed by calendar day and context (country, product
//! description); quantities are summed per key.

pub mod mapper;
pub mod reducer;

pub use mapper::{parse_day, parse_quantity, DemandMapper};
pub use reducer::SumReducer;

use crate::engine::MapReduceEngine;
use crate::error::MappingError;
use crate::source::Record;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantity type carried through the pipeline
pub type Quantity = i64;

/// One demand time series: a product in a country
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Context {
    pub country: String,
    pub description: String,
}

impl Context {
    pub fn new(country: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            description: description.into(),
        }
    }

    /// Serialized form used in the output table, a Python tuple literal
    /// such as `('UK', 'MUG')`
    ///
    /// Elements are quoted and escaped the way Python's `repr` does, so
    /// `ast.literal_eval` reads the pair back as a tuple.
    pub fn to_literal(&self) -> String {
        format!(
            "({}, {})",
            python_str_literal(&self.country),
            python_str_literal(&self.description)
        )
    }
}

/// Single quotes unless the text has a single quote and no double quote
fn python_str_literal(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut literal = String::with_capacity(text.len() + 2);
    literal.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c == quote => {
                literal.push('\\');
                literal.push(c);
            }
            c if c.is_ascii_control() => literal.push_str(&format!("\\x{:02x}", c as u32)),
            c => literal.push(c),
        }
    }
    literal.push(quote);
    literal
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.country, self.description)
    }
}

/// Aggregation key: a calendar day within one context
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DemandKey {
    pub date: NaiveDate,
    pub context: Context,
}

impl DemandKey {
    pub fn new(date: NaiveDate, context: Context) -> Self {
        Self { date, context }
    }
}

impl fmt::Display for DemandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.context)
    }
}

/// Engine wired with the demand mapper and the sum reducer
pub type DemandEngine = MapReduceEngine<DemandMapper, SumReducer>;

/// Build the operational demand engine
pub fn demand_engine(mapper: DemandMapper) -> DemandEngine {
    MapReduceEngine::new(mapper, SumReducer)
}

/// Trimmed, non-empty value of `column`
pub(crate) fn require<'r>(record: &'r Record, column: &str) -> Result<&'r str, MappingError> {
    match record.get(column).map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MappingError::missing(column)),
    }
}
