use anyhow::Context;
use clap::{Parser, Subcommand};
use demandflow::config::{AggregatorConfig, ConfigLoader, RecordFailurePolicy};
use demandflow::error::{describe_error_code, AggregationError};
use demandflow::pipeline::{run_demand_analysis, RunSummary};
use std::path::{Path, PathBuf};
use tracing::{debug, error, trace};

/// Aggregate demand records into per-context daily series
#[derive(Parser)]
#[command(name = "demandflow")]
#[command(about = "Aggregate demand records by date and context", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum quantities per (date, country, description) and write the table
    Aggregate {
        /// Input file (.csv or .tsv) with a header row
        data_source: PathBuf,

        /// Output table path (default: dataset/data_processed/demand_processed.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to configuration file
        #[arg(short = 'c', long)]
        config: Option<PathBuf>,

        /// Skip records that cannot be mapped instead of aborting
        #[arg(long)]
        skip_invalid: bool,

        /// Minimum series length in days to count as forecastable
        #[arg(long)]
        min_series_days: Option<usize>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Aggregate {
            data_source,
            output,
            config,
            skip_invalid,
            min_series_days,
            json,
        } => load_config(config, output, skip_invalid, min_series_days)
            .map_err(anyhow::Error::from)
            .and_then(|config| {
                init_tracing(cli.verbose, config.log_level.as_deref());
                run_aggregate(&data_source, &config, json)
            }),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        match e.downcast_ref::<AggregationError>() {
            Some(agg) => {
                eprintln!("Error: {}", agg.user_message());
                eprintln!("  [E{:04}] {}", agg.code(), describe_error_code(agg.code()));
                std::process::exit(agg.exit_code());
            }
            None => {
                eprintln!("Error: {e:#}");
                std::process::exit(1);
            }
        }
    }
}

fn init_tracing(verbose: u8, configured: Option<&str>) {
    let log_level = match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 2)
        .init();

    debug!("demandflow started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

fn load_config(
    path: Option<PathBuf>,
    output: Option<PathBuf>,
    skip_invalid: bool,
    min_series_days: Option<usize>,
) -> Result<AggregatorConfig, AggregationError> {
    let mut loader = ConfigLoader::new().load_global()?;
    if let Some(path) = path {
        loader = loader.load_file(&path)?;
    }
    let mut config = loader.with_env().build()?;

    if let Some(output) = output {
        config.output_path = output;
    }
    if skip_invalid {
        config.on_record_failure = RecordFailurePolicy::Skip;
    }
    if let Some(days) = min_series_days {
        config.min_series_days = days;
    }

    Ok(config)
}

fn run_aggregate(data_source: &Path, config: &AggregatorConfig, json: bool) -> anyhow::Result<()> {
    let summary = run_demand_analysis(data_source, config)?;

    if json {
        let text = serde_json::to_string_pretty(&summary).context("Failed to render run summary")?;
        println!("{}", text);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Records read:     {}", summary.records_read);
    if summary.records_skipped > 0 {
        println!("Records skipped:  {}", summary.records_skipped);
    }
    println!("Aggregated keys:  {}", summary.keys);
    println!(
        "Contexts:         {} ({} with enough history to forecast)",
        summary.contexts, summary.eligible_series
    );
    println!("\nResults saved to {}", summary.output_path.display());
}
