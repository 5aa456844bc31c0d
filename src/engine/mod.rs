//! Batch map/shuffle/reduce engine
//!
//! The engine is generic over two pluggable behaviours:
//!
//! - a [`Mapper`] turning one record into zero or more `(key, value)` pairs
//! - a [`Reducer`] combining every value of one key into an aggregate
//!
//! Both are implemented for plain closures, so an engine can be built from
//! functions as well as from dedicated types.
//!
//! ```text
//! records ──map──▶ [(K, V)] ──shuffle──▶ K → [V] ──reduce──▶ K → O
//! ```
//!
//! Execution is synchronous and holds the whole batch in memory. The first
//! failing record or key aborts the run and no partial result is returned.

pub mod stages;
pub mod types;

pub use stages::{map_stage, reduce_stage, shuffle_stage};
pub use types::{AggregateResult, Grouped};

use crate::error::{MappingError, ReductionError, Result};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

/// Per-record map behaviour
pub trait Mapper<R, K, V> {
    fn map(&self, record: &R) -> std::result::Result<Vec<(K, V)>, MappingError>;
}

impl<R, K, V, F> Mapper<R, K, V> for F
where
    F: Fn(&R) -> std::result::Result<Vec<(K, V)>, MappingError>,
{
    fn map(&self, record: &R) -> std::result::Result<Vec<(K, V)>, MappingError> {
        self(record)
    }
}

/// Per-key reduce behaviour
pub trait Reducer<K, V, O> {
    fn reduce(&self, key: &K, values: &[V]) -> std::result::Result<O, ReductionError>;
}

impl<K, V, O, F> Reducer<K, V, O> for F
where
    F: Fn(&K, &[V]) -> std::result::Result<O, ReductionError>,
{
    fn reduce(&self, key: &K, values: &[V]) -> std::result::Result<O, ReductionError> {
        self(key, values)
    }
}

/// Map/shuffle/reduce pipeline over an in-memory batch
#[derive(Debug, Clone)]
pub struct MapReduceEngine<M, Rd> {
    mapper: M,
    reducer: Rd,
}

impl<M, Rd> MapReduceEngine<M, Rd> {
    pub fn new(mapper: M, reducer: Rd) -> Self {
        Self { mapper, reducer }
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Run all three stages over `records`
    ///
    /// An empty batch yields an empty result.
    pub fn execute<'a, R, K, V, O, I>(&self, records: I) -> Result<AggregateResult<K, O>>
    where
        R: 'a,
        I: IntoIterator<Item = &'a R>,
        K: Hash + Eq + Debug,
        M: Mapper<R, K, V>,
        Rd: Reducer<K, V, O>,
    {
        let mapped = map_stage(&self.mapper, records)?;
        debug!("Map stage emitted {} pairs", mapped.len());

        let grouped = shuffle_stage(mapped);
        debug!("Shuffle stage produced {} keys", grouped.len());

        let reduced = reduce_stage(&self.reducer, grouped)?;
        debug!("Reduce stage produced {} aggregates", reduced.len());

        Ok(reduced)
    }
}
