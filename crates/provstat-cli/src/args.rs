use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use provstat_core::{Metric, Region, Selection};
use std::path::PathBuf;

/// CLI arguments for provstat
#[derive(Debug, Parser)]
#[command(
    name = "provstat",
    version,
    about = "CLI for inspecting harmonized Indonesian provincial crime and socioeconomic statistics"
)]
pub struct CliArgs {
    /// Directory holding `dataset/` and `map/` (default: current directory)
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// JSON config file with source and view settings
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Restrict views to one region (e.g. "Sumatra", "Bali & Nusa Tenggara")
    #[arg(short = 'r', long = "region", global = true)]
    pub region: Option<Region>,

    /// Restrict views to one province (any source spelling, e.g. "Kep. Riau")
    #[arg(short = 'p', long = "province", global = true)]
    pub province: Option<String>,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print JSON instead of text
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn selection(&self) -> Selection {
        let mut selection = Selection::all();
        if let Some(region) = self.region {
            selection = selection.with_region(region);
        }
        if let Some(province) = &self.province {
            selection = selection.with_province(province);
        }
        selection
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    Csv,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of what was loaded
    Stats,

    /// List the regions present in the data
    Regions,

    /// List provinces (within --region if given)
    Provinces,

    /// Show every indicator for one province
    Province {
        /// Province name in any source spelling
        name: String,
    },

    /// Headline metrics for the current selection
    Summary,

    /// Crime-rate trend for the current selection
    Trend,

    /// Provinces with the highest 2023 crime rate
    Top {
        /// Number of provinces (default: view.top_n from the config)
        #[arg(short = 'n', long = "limit")]
        limit: Option<usize>,
    },

    /// Pairs of indicator values per province
    Scatter {
        /// Metric on the X axis (crime_rate, population, gini_ratio, income, education)
        #[arg(long = "x")]
        x: Metric,

        /// Metric on the Y axis
        #[arg(long = "y", default_value = "crime_rate")]
        y: Metric,
    },

    /// Styled choropleth as GeoJSON
    Map {
        /// Metric to colour by
        #[arg(short = 'm', long = "metric", default_value = "crime_rate")]
        metric: Metric,

        /// Write the GeoJSON here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },

    /// Global organized-crime index ranking
    Rank {
        /// Index year (2021 or 2023)
        #[arg(long = "year", default_value_t = 2023)]
        year: u16,

        /// Compare one country between the two index years
        #[arg(long = "country")]
        country: Option<String>,
    },

    /// Export the (filtered) master table
    Table {
        #[arg(short = 'f', long = "format", value_enum, default_value_t = TableFormat::Csv)]
        format: TableFormat,
    },
}
