//! Applies decoded observations to the store.
//!
//! Each observation is upserted on its own, so a bad record costs only
//! itself. After [`MAX_RECORD_ERRORS`] failures the rest of the batch is
//! abandoned; whatever was applied before stays applied.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    db::{Database, Upsert},
    error::{IngestError, Result},
    reading::Observation,
};

/// Failed upserts tolerated in one call before the batch is abandoned.
pub const MAX_RECORD_ERRORS: usize = 5;

/// Outcome counts for one reconciliation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Rows created by this call.
    pub saved: usize,
    /// Rows that existed and were rewritten.
    pub updated: usize,
    /// Upserts issued, successful or not.
    pub attempted: usize,
    /// Observations outside the accepted period, never sent to the store.
    pub skipped: usize,
    /// Upserts the store rejected.
    pub failed: usize,
    /// Set when the error cap cut the batch short.
    pub aborted: bool,
}

/// Upserts `observations` for a series and records `url` as its source.
///
/// Fails only if the region or parameter is not in the catalog, or the
/// catalog cannot be read.
pub fn reconcile(
    db: &Database,
    region_code: &str,
    parameter_code: &str,
    url: &str,
    observations: &[Observation],
) -> Result<Reconciliation> {
    let region = db
        .region(region_code)?
        .ok_or_else(|| IngestError::RegionNotFound(region_code.to_string()))?;
    let parameter = db
        .parameter(parameter_code)?
        .ok_or_else(|| IngestError::ParameterNotFound(parameter_code.to_string()))?;

    let mut outcome = Reconciliation::default();

    for (idx, observation) in observations.iter().enumerate() {
        if !observation.is_valid() {
            debug!(?observation, "skipping observation outside accepted period");
            outcome.skipped += 1;
            continue;
        }

        outcome.attempted += 1;
        match db.upsert_observation(region.id, parameter.id, observation, Utc::now()) {
            Ok(Upsert::Created) => outcome.saved += 1,
            Ok(Upsert::Updated) => outcome.updated += 1,
            Err(e) => {
                outcome.failed += 1;
                warn!(record = idx + 1, ?observation, error = %e, "failed to save record");
                if outcome.failed >= MAX_RECORD_ERRORS {
                    warn!(
                        region = region_code,
                        parameter = parameter_code,
                        remaining = observations.len() - idx - 1,
                        "too many errors, abandoning batch"
                    );
                    outcome.aborted = true;
                    break;
                }
            }
        }
    }

    if let Err(e) = db.upsert_source(region.id, parameter.id, url, Utc::now()) {
        warn!(region = region_code, parameter = parameter_code, error = %e, "failed to update data source");
    }

    info!(
        region = region_code,
        parameter = parameter_code,
        saved = outcome.saved,
        updated = outcome.updated,
        total = observations.len(),
        "reconciled series"
    );

    Ok(outcome)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{catalog::ensure_catalog, db::ObservationFilter};

    const URL: &str = "https://example.org/Tmean/date/UK.txt";

    fn catalog() -> Database {
        let db = Database::open_in_memory().unwrap();
        ensure_catalog(&db).unwrap();
        db
    }

    fn year_of(values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .zip(1..)
            .map(|(v, month)| Observation::new(2023, month, *v))
            .collect()
    }

    #[test]
    fn should_save_new_observations() {
        let db = catalog();
        let observations = year_of(&[5.2, 6.1, 7.0]);

        let outcome = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert_eq!(outcome.saved, 3);
        assert_eq!(outcome.attempted, 3);
        assert!(!outcome.aborted);

        let rows = db
            .list_observations(&ObservationFilter::series("UK", "Tmean"))
            .unwrap();
        let stored: Vec<(i32, u32, f64)> = rows.iter().rev().map(|r| (r.year, r.month, r.value)).collect();
        assert_eq!(stored, vec![(2023, 1, 5.2), (2023, 2, 6.1), (2023, 3, 7.0)]);
    }

    #[test]
    fn should_be_idempotent() {
        let db = catalog();
        let observations = year_of(&[1.0, 2.0, 3.0, 4.0]);

        let first = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();
        let second = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert_eq!(first.saved, 4);
        assert_eq!(second.saved, 0);
        assert_eq!(second.updated, 4);
        assert_eq!(db.count_observations(&ObservationFilter::default()).unwrap(), 4);
    }

    #[test]
    fn should_keep_last_duplicate() {
        let db = catalog();
        let observations = vec![Observation::new(2023, 1, 1.0), Observation::new(2023, 1, 9.0)];

        let outcome = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert_eq!(outcome.saved, 1);
        assert_eq!(outcome.updated, 1);
        let rows = db.list_observations(&ObservationFilter::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 9.0);
    }

    #[test]
    fn should_abort_after_five_failures() {
        let db = catalog();
        let mut observations = year_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        for observation in &mut observations[2..7] {
            observation.value = f64::NAN;
        }

        let outcome = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert_eq!(outcome.saved, 2);
        assert_eq!(outcome.failed, 5);
        assert_eq!(outcome.attempted, 7);
        assert!(outcome.aborted);

        let months: Vec<u32> = db
            .list_observations(&ObservationFilter::default())
            .unwrap()
            .iter()
            .map(|r| r.month)
            .collect();
        assert_eq!(months, vec![2, 1]);
    }

    #[test]
    fn should_count_failures_in_total() {
        let db = catalog();
        let mut observations = year_of(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
        for idx in [0, 2, 4, 6, 8] {
            observations[idx].value = f64::NAN;
        }

        let outcome = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert!(outcome.aborted);
        assert_eq!(outcome.attempted, 9);
        assert_eq!(outcome.saved, 4);
    }

    #[test]
    fn should_skip_out_of_period_observations() {
        let db = catalog();
        let observations = vec![
            Observation::new(1884, 1, 3.1),
            Observation::new(1884, 2, 3.4),
            Observation::new(1990, 1, 4.0),
        ];

        let outcome = reconcile(&db, "UK", "Tmean", URL, &observations).unwrap();

        assert_eq!(outcome.skipped, 2);
        assert_eq!(outcome.saved, 1);
        assert_eq!(outcome.failed, 0);
    }

    #[test]
    fn should_fail_for_unknown_region() {
        let db = catalog();

        let err = reconcile(&db, "ZZ", "Tmean", URL, &year_of(&[1.0])).unwrap_err();

        assert!(matches!(err, IngestError::RegionNotFound(ref code) if code == "ZZ"));
        assert_eq!(db.count_observations(&ObservationFilter::default()).unwrap(), 0);
        assert!(db.list_sources().unwrap().is_empty());
    }

    #[test]
    fn should_fail_for_unknown_parameter() {
        let db = catalog();

        let err = reconcile(&db, "UK", "Tavg", URL, &[]).unwrap_err();

        assert_eq!(err.to_string(), "parameter not found: Tavg");
    }

    #[test]
    fn should_record_source_even_when_batch_fails() {
        let db = catalog();
        let observations = vec![Observation::new(2000, 1, f64::NAN); 6];

        let outcome = reconcile(&db, "Wales", "Rainfall", URL, &observations).unwrap();

        assert!(outcome.aborted);
        let sources = db.list_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].region_code, "Wales");
        assert_eq!(sources[0].url, URL);
        assert!(sources[0].last_updated.is_some());
    }
}
