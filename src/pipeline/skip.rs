use crate::engine::Mapper;
use crate::error::MappingError;
use crate::source::Record;
use std::cell::Cell;
use tracing::warn;

/// Mapper adapter that turns a rejected record into "no pairs"
///
/// The engine itself treats every mapping error as fatal; this wrapper is
/// how the driver opts into per-record isolation. Not `Sync`: one wrapper
/// per run.
#[derive(Debug)]
pub struct SkipInvalid<M> {
    inner: M,
    skipped: Cell<usize>,
}

impl<M> SkipInvalid<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            skipped: Cell::new(0),
        }
    }

    /// Records rejected so far
    pub fn skipped(&self) -> usize {
        self.skipped.get()
    }
}

impl<M, K, V> Mapper<Record, K, V> for SkipInvalid<M>
where
    M: Mapper<Record, K, V>,
{
    fn map(&self, record: &Record) -> Result<Vec<(K, V)>, MappingError> {
        match self.inner.map(record) {
            Ok(pairs) => Ok(pairs),
            Err(e) => {
                warn!(row = record.row(), "Skipping record: {}", e);
                self.skipped.set(self.skipped.get() + 1);
                Ok(Vec::new())
            }
        }
    }
}
