//! Command line interface.

pub mod command;

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    download::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    reading::Format,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Contains the commands
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
/// Options shared by every command.
pub struct SettingsArgs {
    /// SQLite database file [default: ~/ukclimate.sqlite]
    #[arg(long, global = true, env = "UKCLIMATE_DB")]
    pub database: Option<PathBuf>,

    /// Root URL of the series datasets
    #[arg(long, global = true, env = "UKCLIMATE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "UKCLIMATE_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch and store series; every region and parameter unless both are given
    Ingest {
        #[arg(long, requires = "parameter")]
        region: Option<String>,
        #[arg(long, requires = "region")]
        parameter: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Store a series from a local file
    Load {
        #[arg(long)]
        region: String,
        #[arg(long)]
        parameter: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// List regions
    Regions {},
    /// List parameters
    Parameters {},
    /// List observations, newest first
    Observations {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        parameter: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        year_from: Option<i32>,
        #[arg(long)]
        year_to: Option<i32>,
        #[arg(long, default_value_t = 100)]
        limit: usize,
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Show one observation
    Observation { id: i64 },
    /// Summarise one series
    Summary {
        #[arg(long, default_value = "UK")]
        region: String,
        #[arg(long, default_value = "Tmean")]
        parameter: String,
    },
    /// List data sources
    Sources {},
    /// Print a series as chart labels and values
    Chart {
        #[arg(long, default_value = "UK")]
        region: String,
        #[arg(long, default_value = "Tmean")]
        parameter: String,
    },
    /// Show store totals
    Stats {},
    /// Export observations to a parquet file
    Export {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        parameter: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Creates a spinner.
pub fn create_spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner().with_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));

    bar
}

/// Creates a progress bar.
pub fn create_progress_bar(size: u64, message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("[{eta_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    ProgressBar::new(size).with_message(message).with_style(style)
}
