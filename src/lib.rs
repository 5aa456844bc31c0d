//! # demandflow
//!
//! Aggregates transactional demand records into per-context daily time
//! series, ready to be handed to a forecasting process.
//!
//! ## Usage
//!
//! ```bash
//! demandflow aggregate <data_source> [-o output.csv] [-c config.toml] [--skip-invalid]
//! ```
//!
//! ## Modules
//!
//! - `engine` - Generic map/shuffle/reduce batch engine
//! - `demand` - Demand mapper, sum reducer and the (date, context) key
//! - `source` - Reading input rows from delimited text
//! - `sink` - Writing the aggregated `Date,context,Quantity` table
//! - `timeseries` - Dense per-context daily series
//! - `pipeline` - Orchestration of a full run and record failure policy
//! - `config` - Layered TOML/environment configuration
//! - `error` - Error types and codes
pub mod config;
pub mod demand;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod timeseries;

pub use engine::{AggregateResult, MapReduceEngine, Mapper, Reducer};
pub use error::{AggregationError, MappingError, ReductionError};
