//! Dense per-context daily series built from the aggregate
//!
//! Days without demand between a context's first and last observation are
//! filled with zero.

use crate::demand::{Context, DemandKey, Quantity};
use crate::engine::AggregateResult;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySeries {
    context: Context,
    start: NaiveDate,
    values: Vec<Quantity>,
}

impl DailySeries {
    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.values.len() as i64 - 1)
    }

    /// Number of days covered, zero-filled days included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Quantity] {
        &self.values
    }

    pub fn total(&self) -> Quantity {
        self.values.iter().fold(0, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Quantity)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(offset, value)| (self.start + Duration::days(offset as i64), *value))
    }
}

/// One series per context, ordered by context
pub fn build_daily_series(result: &AggregateResult<DemandKey, Quantity>) -> Vec<DailySeries> {
    let mut by_context: BTreeMap<&Context, BTreeMap<NaiveDate, Quantity>> = BTreeMap::new();
    for (key, quantity) in result.iter() {
        let day = by_context
            .entry(&key.context)
            .or_default()
            .entry(key.date)
            .or_insert(0);
        *day = day.saturating_add(*quantity);
    }

    by_context
        .into_iter()
        .filter_map(|(context, days)| {
            let (&start, _) = days.first_key_value()?;
            let (&end, _) = days.last_key_value()?;
            let span = (end - start).num_days() as usize + 1;

            let mut values = vec![0; span];
            for (date, quantity) in days {
                values[(date - start).num_days() as usize] = quantity;
            }

            Some(DailySeries {
                context: context.clone(),
                start,
                values,
            })
        })
        .collect()
}

/// Series long enough to be handed to a forecasting model
pub fn eligible(series: &[DailySeries], min_days: usize) -> impl Iterator<Item = &DailySeries> {
    series.iter().filter(move |s| s.len() >= min_days)
}
