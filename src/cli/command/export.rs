use std::path::PathBuf;

use anyhow::Result;

use super::{make_parquet_file_name, Settings};
use crate::{cli::create_spinner, db::ObservationFilter, parquet};

/// Writes the selected observations to a parquet file and returns its path.
pub fn export(
    settings: &Settings,
    region: Option<String>,
    parameter: Option<String>,
    output: Option<PathBuf>,
) -> Result<String> {
    let db = settings.open_database()?;
    let filter = ObservationFilter {
        region,
        parameter,
        ..Default::default()
    };

    let bar = create_spinner("Reading observations...".to_string());
    let observations = db.list_observations(&filter)?;
    bar.finish_with_message(format!("{} observations read", observations.len()));

    let file_path = match output {
        Some(path) => path,
        None => make_parquet_file_name("observations")?,
    };
    parquet::save_observations(&observations, &file_path)?;

    Ok(file_path.to_string_lossy().to_string())
}
