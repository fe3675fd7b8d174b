//! provstat: command-line interface for provstat-core
//!
//! This binary loads the province-level sources from a data directory,
//! harmonizes them and prints one view of the result. It supports dataset
//! statistics, region and province listings, per-province details, headline
//! summaries, crime trends, top-N rankings, scatter pairs, styled choropleth
//! GeoJSON, the global organized-crime index and a master-table export.
//!
//! Usage examples
//! --------------
//!
//! - Show what was loaded
//!   $ provstat --data-dir ./data stats
//!
//! - Summary for a region, or for one province
//!   $ provstat --region "Bali & Nusa Tenggara" summary
//!   $ provstat --province "Metro Jaya" summary
//!
//! - Ten highest 2023 crime rates, as JSON
//!   $ provstat --json top
//!
//! - Choropleth of the Gini ratio written to a file
//!   $ provstat map --metric gini --output gini.geojson
//!
//! - Indonesia in the organized crime index, 2021 vs 2023
//!   $ provstat rank --country Indonesia
//!
//! Data source
//! -----------
//!
//! Files are looked up under `--data-dir` (default: the current directory)
//! using the fixed source filenames in `dataset/` and `map/`. A JSON file
//! passed with `--config` can override filenames, delimiters and view
//! settings; `--data-dir` still wins over the config's directory.
use anyhow::Context;
use clap::Parser;
use provstat_cli::args::CliArgs;
use provstat_cli::logging::init_logging;
use provstat_cli::report::Report;
use provstat_core::{DashboardConfig, Dataset};
use std::io::{self, BufWriter, Write};
use tracing::debug;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config.sources.data_dir = dir.clone();
    }

    let dataset = Dataset::load(&config.sources).with_context(|| {
        format!(
            "loading dataset from {}",
            config.sources.data_dir.display()
        )
    })?;
    let selection = args.selection();
    debug!(command = ?args.command, ?selection, "running");

    let stdout = io::stdout();
    let mut report = Report {
        dataset: &dataset,
        view: &config.view,
        selection: &selection,
        json: args.json,
        out: BufWriter::new(stdout.lock()),
    };
    report.run(&args.command)?;
    report.out.flush()?;

    Ok(())
}
