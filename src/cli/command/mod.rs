pub mod export;
pub mod ingest;
pub mod query;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use serde::Serialize;

pub use export::export;
pub use ingest::{ingest, load};

use super::SettingsArgs;
use crate::db::Database;

const DATABASE_FILE_NAME: &str = "ukclimate.sqlite";

/// Resolved configuration for a command run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: PathBuf,
    pub base_url: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_args(args: &SettingsArgs) -> Result<Self> {
        let database = match &args.database {
            Some(path) => path.clone(),
            None => home_dir()?.join(DATABASE_FILE_NAME),
        };

        Ok(Settings {
            database,
            base_url: args.base_url.clone(),
            timeout: Duration::from_secs(args.timeout),
        })
    }

    pub fn open_database(&self) -> Result<Database> {
        Database::open(&self.database)
            .with_context(|| format!("failed to open database `{}`", self.database.display()))
    }
}

pub fn make_parquet_file_name(dataset: &str) -> Result<PathBuf> {
    let today = Local::now();
    let file_name = format!(
        "ukclimate-{}-{}-{:02}-{:02}.parquet",
        dataset,
        today.year(),
        today.month(),
        today.day()
    );

    Ok(home_dir()?.join(file_name))
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// -- Tests -------------------------------------------------------------------
