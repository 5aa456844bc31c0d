//! Pure stage functions composed by [`MapReduceEngine::execute`]
//!
//! [`MapReduceEngine::execute`]: super::MapReduceEngine::execute

use super::types::{AggregateResult, Grouped};
use super::{Mapper, Reducer};
use crate::error::{AggregationError, Result};
use std::fmt::Debug;
use std::hash::Hash;

/// Map every record in input order and flatten the emitted pairs
///
/// Stops at the first record the mapper rejects. The error carries the
/// 1-based position of that record.
pub fn map_stage<'a, R, K, V, M, I>(mapper: &M, records: I) -> Result<Vec<(K, V)>>
where
    R: 'a,
    M: Mapper<R, K, V> + ?Sized,
    I: IntoIterator<Item = &'a R>,
{
    let mut mapped = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let pairs = mapper
            .map(record)
            .map_err(|e| AggregationError::mapping(index + 1, e))?;
        mapped.extend(pairs);
    }
    Ok(mapped)
}

/// Group pair values by key in a single pass
pub fn shuffle_stage<K, V>(pairs: Vec<(K, V)>) -> Grouped<K, V>
where
    K: Hash + Eq,
{
    let mut grouped = Grouped::new();
    for (key, value) in pairs {
        grouped.push(key, value);
    }
    grouped
}

/// Reduce each key's full value sequence into one aggregate
pub fn reduce_stage<K, V, O, Rd>(
    reducer: &Rd,
    grouped: Grouped<K, V>,
) -> Result<AggregateResult<K, O>>
where
    K: Hash + Eq + Debug,
    Rd: Reducer<K, V, O> + ?Sized,
{
    let mut reduced = AggregateResult::with_capacity(grouped.len());
    for (key, values) in grouped {
        let output = reducer
            .reduce(&key, &values)
            .map_err(|e| AggregationError::reduction(format!("{:?}", key), e))?;
        reduced.insert_unique(key, output);
    }
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MappingError, ReductionError};

    fn split_words(line: &String) -> std::result::Result<Vec<(String, u32)>, MappingError> {
        Ok(line
            .split_whitespace()
            .map(|word| (word.to_string(), 1))
            .collect())
    }

    #[test]
    fn test_map_stage_preserves_order_within_and_across_records() {
        let lines = vec!["a b".to_string(), "".to_string(), "c a".to_string()];
        let mapped = map_stage(&split_words, &lines).unwrap();

        let keys: Vec<&str> = mapped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_map_stage_reports_failing_record_position() {
        let records = vec![1, 2, -1, 4];
        let mapper = |n: &i32| -> std::result::Result<Vec<(i32, i32)>, MappingError> {
            if *n < 0 {
                Err(MappingError::Other("negative".into()))
            } else {
                Ok(vec![(*n, *n)])
            }
        };

        match map_stage(&mapper, &records) {
            Err(AggregationError::Mapping { record, .. }) => assert_eq!(record, 3),
            other => panic!("expected mapping error, got {other:?}"),
        }
    }

    #[test]
    fn test_shuffle_stage_keeps_emission_order() {
        let grouped = shuffle_stage(vec![("k", 3), ("j", 1), ("k", 1), ("k", 2)]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get(&"k"), Some(&[3, 1, 2][..]));
    }

    #[test]
    fn test_reduce_stage_sees_full_sequence() {
        let grouped = shuffle_stage(vec![("x", 1), ("x", 2), ("y", 5)]);
        let concat = |_: &&str, values: &[i32]| -> std::result::Result<String, ReductionError> {
            Ok(values.iter().map(i32::to_string).collect::<Vec<_>>().join(","))
        };

        let reduced = reduce_stage(&concat, grouped).unwrap();
        assert_eq!(reduced.get(&"x").map(String::as_str), Some("1,2"));
        assert_eq!(reduced.get(&"y").map(String::as_str), Some("5"));
    }

    #[test]
    fn test_reduce_stage_propagates_failure_with_key() {
        let grouped = shuffle_stage(vec![("bad", 1)]);
        let failing = |_: &&str, _: &[i32]| -> std::result::Result<i32, ReductionError> {
            Err(ReductionError::Other("nope".into()))
        };

        match reduce_stage(&failing, grouped) {
            Err(AggregationError::Reduction { key, .. }) => assert_eq!(key, "\"bad\""),
            other => panic!("expected reduction error, got {other:?}"),
        }
    }
}
