//! Read-only commands; each prints its result as JSON.

use anyhow::{bail, Result};

use super::{print_json, Settings};
use crate::db::ObservationFilter;

pub fn regions(settings: &Settings) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.list_regions()?)
}

pub fn parameters(settings: &Settings) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.list_parameters()?)
}

pub fn observations(settings: &Settings, filter: &ObservationFilter) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.page_observations(filter)?)
}

pub fn observation(settings: &Settings, id: i64) -> Result<()> {
    let db = settings.open_database()?;
    match db.get_observation(id)? {
        Some(row) => print_json(&row),
        None => bail!("observation {id} not found"),
    }
}

pub fn summary(settings: &Settings, region: &str, parameter: &str) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.summary(region, parameter)?)
}

pub fn sources(settings: &Settings) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.list_sources()?)
}

pub fn chart(settings: &Settings, region: &str, parameter: &str) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.chart_series(region, parameter)?)
}

pub fn stats(settings: &Settings) -> Result<()> {
    let db = settings.open_database()?;
    print_json(&db.dashboard_stats()?)
}
