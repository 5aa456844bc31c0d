//! Reduce stage for demand quantities

use super::Quantity;
use crate::engine::Reducer;
use crate::error::ReductionError;

/// Sums the quantities of one key; an empty sequence sums to zero
#[derive(Debug, Clone, Copy, Default)]
pub struct SumReducer;

impl SumReducer {
    /// Exact sum of `values`
    ///
    /// Accumulates in `i128`, so only a total outside the `Quantity` range
    /// fails, whatever the order of the values.
    pub fn sum(values: &[Quantity]) -> Result<Quantity, ReductionError> {
        let total: i128 = values.iter().map(|&value| i128::from(value)).sum();
        Quantity::try_from(total).map_err(|_| ReductionError::Overflow {
            count: values.len(),
        })
    }
}

impl<K> Reducer<K, Quantity, Quantity> for SumReducer {
    fn reduce(&self, _key: &K, values: &[Quantity]) -> Result<Quantity, ReductionError> {
        Self::sum(values)
    }
}
