use std::{fs, path::Path};

use anyhow::{Context, Result};

use super::{print_json, Settings};
use crate::{
    catalog::ensure_catalog,
    cli::create_progress_bar,
    download::HttpFetcher,
    ingest::{self, IngestResult, Ingestor},
    reading::Format,
};

/// Ingests one series, or sweeps all of them when no pair is given.
pub async fn ingest(
    settings: &Settings,
    region: Option<String>,
    parameter: Option<String>,
    json: bool,
) -> Result<()> {
    let db = settings.open_database()?;
    let fetcher = HttpFetcher::new(settings.timeout).context("failed to build HTTP client")?;

    let results = match (region, parameter) {
        (Some(region), Some(parameter)) => {
            ensure_catalog(&db)?;
            let ingestor = Ingestor::new(&db, fetcher, settings.base_url.as_str());
            println!("Parsing data for {region} - {parameter}...");
            vec![ingestor.ingest_one(&region, &parameter).await]
        }
        _ => {
            println!("Parsing all weather data...");
            let progress = create_progress_bar(0, "Ingesting series".to_string());
            Ingestor::new(&db, fetcher, settings.base_url.as_str())
                .with_progress(progress)
                .ingest_all()
                .await
        }
    };

    if json {
        return print_json(&results);
    }

    print_report(&results);

    Ok(())
}

/// Stores a series read from a local file.
pub fn load(
    settings: &Settings,
    region: &str,
    parameter: &str,
    file: &Path,
    format: Format,
) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read `{}`", file.display()))?;
    let source = format!("file://{}", fs::canonicalize(file)?.display());

    let db = settings.open_database()?;
    ensure_catalog(&db)?;

    let result = ingest::load(&db, region, parameter, &source, &content, format);

    print_report(std::slice::from_ref(&result));

    Ok(())
}

fn print_report(results: &[IngestResult]) {
    if let [result] = results {
        println!("{}", result.message);
        return;
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    println!(
        "Completed parsing. {}/{} operations successful.",
        succeeded,
        results.len()
    );

    for result in results.iter().filter(|r| !r.success) {
        println!(
            "Failed: {} - {}: {}",
            result.region,
            result.parameter,
            result.error.as_deref().unwrap_or("Unknown error")
        );
    }
}
