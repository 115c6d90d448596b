//! The fixed set of regions and parameters published by the Met Office.
//!
//! See the [HadUK-Grid dataset page](https://www.metoffice.gov.uk/research/climate/maps-and-data/uk-and-regional-series)
//! for the series these codes name. The codes must match the path segments of
//! the remote files exactly.

use crate::{db::Database, error::Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A region with its own monthly series.
pub enum Region {
    Uk,
    England,
    Wales,
    Scotland,
    NorthernIreland,
}

impl Region {
    /// All regions, in sweep order.
    pub const ALL: [Region; 5] = [
        Region::Uk,
        Region::England,
        Region::Wales,
        Region::Scotland,
        Region::NorthernIreland,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Region::Uk => "UK",
            Region::England => "England",
            Region::Wales => "Wales",
            Region::Scotland => "Scotland",
            Region::NorthernIreland => "Northern_Ireland",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Region::Uk => "United Kingdom",
            Region::England => "England",
            Region::Wales => "Wales",
            Region::Scotland => "Scotland",
            Region::NorthernIreland => "Northern Ireland",
        }
    }

    pub fn description(&self) -> String {
        format!("Weather data for {}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// A measured quantity.
pub enum Parameter {
    Tmax,
    Tmin,
    Tmean,
    Sunshine,
    Rainfall,
}

impl Parameter {
    /// All parameters, in sweep order.
    pub const ALL: [Parameter; 5] = [
        Parameter::Tmax,
        Parameter::Tmin,
        Parameter::Tmean,
        Parameter::Sunshine,
        Parameter::Rainfall,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Parameter::Tmax => "Tmax",
            Parameter::Tmin => "Tmin",
            Parameter::Tmean => "Tmean",
            Parameter::Sunshine => "Sunshine",
            Parameter::Rainfall => "Rainfall",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Parameter::Tmax => "Maximum Temperature",
            Parameter::Tmin => "Minimum Temperature",
            Parameter::Tmean => "Mean Temperature",
            Parameter::Sunshine => "Sunshine Hours",
            Parameter::Rainfall => "Rainfall",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Parameter::Tmax | Parameter::Tmin | Parameter::Tmean => "°C",
            Parameter::Sunshine => "hours",
            Parameter::Rainfall => "mm",
        }
    }

    pub fn description(&self) -> String {
        format!("{} measurements in {}", self.name(), self.unit())
    }
}

/// Inserts any known region or parameter missing from the store.
///
/// Rows that already exist are left untouched, so administrative edits to
/// names and descriptions survive repeated runs.
pub fn ensure_catalog(db: &Database) -> Result<()> {
    let mut created = 0;

    for region in Region::ALL {
        if db.insert_region(region.code(), region.name(), &region.description())? {
            created += 1;
        }
    }

    for parameter in Parameter::ALL {
        if db.insert_parameter(
            parameter.code(),
            parameter.name(),
            parameter.unit(),
            &parameter.description(),
        )? {
            created += 1;
        }
    }

    tracing::debug!(created, "catalog ensured");

    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn should_use_remote_path_codes() {
        let regions: Vec<&str> = Region::ALL.iter().map(|r| r.code()).collect();
        assert_eq!(
            regions,
            vec!["UK", "England", "Wales", "Scotland", "Northern_Ireland"]
        );

        let parameters: Vec<&str> = Parameter::ALL.iter().map(|p| p.code()).collect();
        assert_eq!(parameters, vec!["Tmax", "Tmin", "Tmean", "Sunshine", "Rainfall"]);
    }

    #[test]
    fn should_describe_parameters() {
        assert_eq!(Parameter::Rainfall.unit(), "mm");
        assert_eq!(
            Parameter::Sunshine.description(),
            "Sunshine Hours measurements in hours"
        );
        assert_eq!(Region::Uk.description(), "Weather data for United Kingdom");
    }

    #[test]
    fn should_seed_catalog_once() {
        let db = Database::open_in_memory().unwrap();

        ensure_catalog(&db).unwrap();
        ensure_catalog(&db).unwrap();

        assert_eq!(db.list_regions().unwrap().len(), 5);
        assert_eq!(db.list_parameters().unwrap().len(), 5);
    }

    #[test]
    fn should_not_overwrite_edited_rows() {
        let db = Database::open_in_memory().unwrap();
        db.insert_region("UK", "Great Britain and NI", "edited")
            .unwrap();

        ensure_catalog(&db).unwrap();

        let uk = db.region("UK").unwrap().unwrap();
        assert_eq!(uk.name, "Great Britain and NI");
        assert_eq!(uk.description, "edited");
    }
}
