//! Orchestration of a demand aggregation run
//!
//! Reads the data source, runs the engine under the configured record
//! failure policy, writes the aggregated table and reports a summary.

pub mod skip;

pub use skip::SkipInvalid;

use crate::config::{AggregatorConfig, RecordFailurePolicy};
use crate::demand::{demand_engine, DemandKey, DemandMapper, Quantity, SumReducer};
use crate::engine::{AggregateResult, MapReduceEngine};
use crate::error::Result;
use crate::sink::write_results;
use crate::source::{read_records, Record};
use crate::timeseries::{build_daily_series, eligible};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Engine output plus what the failure policy left out
#[derive(Debug)]
pub struct Aggregation {
    pub result: AggregateResult<DemandKey, Quantity>,
    pub records_skipped: usize,
}

/// Outcome of [`run_demand_analysis`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub records_read: usize,
    pub records_skipped: usize,
    pub keys: usize,
    pub contexts: usize,
    pub eligible_series: usize,
    pub rows_written: usize,
    pub output_path: PathBuf,
}

/// Aggregate in-memory records under the configured policy
pub fn aggregate_records(records: &[Record], config: &AggregatorConfig) -> Result<Aggregation> {
    let mapper = DemandMapper::new(config.columns.clone());

    match config.on_record_failure {
        RecordFailurePolicy::Stop => Ok(Aggregation {
            result: demand_engine(mapper).execute(records)?,
            records_skipped: 0,
        }),
        RecordFailurePolicy::Skip => {
            let engine = MapReduceEngine::new(SkipInvalid::new(mapper), SumReducer);
            let result = engine.execute(records)?;
            let records_skipped = engine.mapper().skipped();
            if records_skipped > 0 {
                warn!("Skipped {} of {} records", records_skipped, records.len());
            }
            Ok(Aggregation {
                result,
                records_skipped,
            })
        }
    }
}

/// Read `data_source`, aggregate it and write the table to the configured path
pub fn run_demand_analysis(data_source: &Path, config: &AggregatorConfig) -> Result<RunSummary> {
    info!(
        "Running demand analysis by context (date, country, description) on {}",
        data_source.display()
    );

    let records = read_records(data_source)?;
    let Aggregation {
        result,
        records_skipped,
    } = aggregate_records(&records, config)?;

    let contexts: HashSet<_> = result.keys().map(|key| &key.context).collect();
    let series = build_daily_series(&result);
    let eligible_series = eligible(&series, config.min_series_days).count();

    let rows_written = write_results(&result, &config.output_path)?;
    info!("Results saved to {}", config.output_path.display());

    Ok(RunSummary {
        records_read: records.len(),
        records_skipped,
        keys: result.len(),
        contexts: contexts.len(),
        eligible_series,
        rows_written,
        output_path: config.output_path.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AggregationError, MappingError};
    use std::fs;
    use tempfile::TempDir;

    const SALES: &str = "InvoiceDate,Country,Description,Quantity\n\
        2011-01-01 08:26,UK,MUG,3\n\
        2011-01-01 09:00,UK,MUG,5\n\
        2011-01-02,UK,MUG,\n\
        2011-01-01,FR,MUG,2\n";

    fn config_in(dir: &TempDir, policy: RecordFailurePolicy) -> AggregatorConfig {
        AggregatorConfig {
            output_path: dir.path().join("out").join("demand_processed.csv"),
            on_record_failure: policy,
            min_series_days: 1,
            ..AggregatorConfig::default()
        }
    }

    #[test]
    fn test_stop_policy_aborts_without_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sales.csv");
        fs::write(&input, SALES).unwrap();
        let config = config_in(&dir, RecordFailurePolicy::Stop);

        let err = run_demand_analysis(&input, &config).unwrap_err();

        match err {
            AggregationError::Mapping { record, source } => {
                assert_eq!(record, 3);
                assert_eq!(source, MappingError::missing("Quantity"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_skip_policy_reports_skipped_records() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sales.csv");
        fs::write(&input, SALES).unwrap();
        let config = config_in(&dir, RecordFailurePolicy::Skip);

        let summary = run_demand_analysis(&input, &config).unwrap();

        assert_eq!(
            summary,
            RunSummary {
                records_read: 4,
                records_skipped: 1,
                keys: 2,
                contexts: 2,
                eligible_series: 2,
                rows_written: 2,
                output_path: config.output_path.clone(),
            }
        );
        let table = fs::read_to_string(&config.output_path).unwrap();
        assert!(table.contains("2011-01-01,\"('UK', 'MUG')\",8"));
    }

    #[test]
    fn test_min_series_days_filters_short_series() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sales.csv");
        fs::write(
            &input,
            "InvoiceDate,Country,Description,Quantity\n2011-01-01,UK,MUG,1\n2011-01-03,UK,MUG,1\n2011-01-01,FR,MUG,1\n",
        )
        .unwrap();
        let mut config = config_in(&dir, RecordFailurePolicy::Stop);
        config.min_series_days = 3;

        let summary = run_demand_analysis(&input, &config).unwrap();
        assert_eq!(summary.contexts, 2);
        assert_eq!(summary.eligible_series, 1);
    }

    #[test]
    fn test_aggregate_records_with_stop_policy() {
        let records = vec![Record::from_pairs(
            1,
            [
                ("InvoiceDate", "2011-01-01"),
                ("Country", "UK"),
                ("Description", "MUG"),
                ("Quantity", "4"),
            ],
        )];

        let aggregation = aggregate_records(&records, &AggregatorConfig::default()).unwrap();
        assert_eq!(aggregation.records_skipped, 0);
        assert_eq!(aggregation.result.len(), 1);
    }
}
