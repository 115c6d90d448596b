//! Fetch, decode and reconcile series, one region and parameter at a time.
//!
//! Nothing here returns an error: every attempt ends in an [`IngestResult`],
//! so one unreachable or malformed file never stops a sweep.

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    catalog::{ensure_catalog, Parameter, Region},
    db::Database,
    download::{data_url, Fetch},
    error::Result,
    reading::{self, Format},
    reconcile::{reconcile, Reconciliation},
};

/// The outcome of one ingestion attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResult {
    pub success: bool,
    pub region: String,
    pub parameter: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_records: Option<usize>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestResult {
    fn succeeded(region: &str, parameter: &str, url: &str, total: usize, outcome: &Reconciliation) -> Self {
        IngestResult {
            success: true,
            region: region.to_string(),
            parameter: parameter.to_string(),
            url: url.to_string(),
            total_records: Some(total),
            saved_records: Some(outcome.saved),
            message: format!(
                "Successfully parsed and saved {} records for {} {}",
                outcome.saved, region, parameter
            ),
            error: None,
        }
    }

    fn failed(region: &str, parameter: &str, url: &str, error: String) -> Self {
        IngestResult {
            success: false,
            region: region.to_string(),
            parameter: parameter.to_string(),
            url: url.to_string(),
            total_records: None,
            saved_records: None,
            message: format!("Failed to parse data for {region} {parameter}: {error}"),
            error: Some(error),
        }
    }
}

/// Drives ingestion against one store and one source of series files.
pub struct Ingestor<'a, F> {
    db: &'a Database,
    fetcher: F,
    base_url: String,
    progress: ProgressBar,
}

impl<'a, F: Fetch> Ingestor<'a, F> {
    pub fn new(db: &'a Database, fetcher: F, base_url: impl Into<String>) -> Self {
        Ingestor {
            db,
            fetcher,
            base_url: base_url.into(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports sweep progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn url(&self, region: &str, parameter: &str) -> String {
        data_url(&self.base_url, region, parameter)
    }

    /// Fetches, decodes and stores the series for one region and parameter.
    pub async fn ingest_one(&self, region: &str, parameter: &str) -> IngestResult {
        let url = self.url(region, parameter);

        let outcome = match self.fetcher.fetch(&url).await {
            Ok(content) => apply(self.db, region, parameter, &url, &content, Format::Text),
            Err(e) => Err(e.into()),
        };

        report(region, parameter, &url, outcome)
    }

    /// Ensures the catalog, then ingests every region and parameter pair.
    ///
    /// Regions form the outer loop and parameters the inner one, in catalog
    /// order. One result is returned per pair.
    pub async fn ingest_all(&self) -> Vec<IngestResult> {
        if let Err(e) = ensure_catalog(self.db) {
            error!(error = %e, "failed to initialise catalog");
        }

        let total = Region::ALL.len() * Parameter::ALL.len();
        self.progress.set_length(total as u64);

        let mut results = Vec::with_capacity(total);
        for region in Region::ALL {
            for parameter in Parameter::ALL {
                self.progress
                    .set_message(format!("{} {}", region.code(), parameter.code()));
                results.push(self.ingest_one(region.code(), parameter.code()).await);
                self.progress.inc(1);
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        self.progress
            .finish_with_message(format!("{succeeded}/{total} series ingested"));

        results
    }
}

/// Stores series content obtained elsewhere, e.g. read from a local file.
/// `source` is recorded as the series' URL.
pub fn load(
    db: &Database,
    region: &str,
    parameter: &str,
    source: &str,
    content: &str,
    format: Format,
) -> IngestResult {
    let outcome = apply(db, region, parameter, source, content, format);
    report(region, parameter, source, outcome)
}

fn apply(
    db: &Database,
    region: &str,
    parameter: &str,
    url: &str,
    content: &str,
    format: Format,
) -> Result<(usize, Reconciliation)> {
    let observations = reading::decode(content, format)?;
    let outcome = reconcile(db, region, parameter, url, &observations)?;

    Ok((observations.len(), outcome))
}

fn report(
    region: &str,
    parameter: &str,
    url: &str,
    outcome: Result<(usize, Reconciliation)>,
) -> IngestResult {
    match outcome {
        Ok((total, reconciliation)) => {
            info!(region, parameter, total, saved = reconciliation.saved, "ingested series");
            IngestResult::succeeded(region, parameter, url, total, &reconciliation)
        }
        Err(e) => {
            warn!(region, parameter, error = %e, "ingestion failed");
            IngestResult::failed(region, parameter, url, e.to_string())
        }
    }
}

// -- Tests -------------------------------------------------------------------
