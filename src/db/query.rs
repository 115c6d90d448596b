//! Read-side queries: listings with filters and summary aggregates.

use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, types::Value, OptionalExtension, Result, Row};
use serde::Serialize;

use super::{Database, ParameterRow, RegionRow};

const OBSERVATION_COLUMNS: &str = "
    o.id, r.code, r.name, p.code, p.name, p.unit,
    o.year, o.month, o.value, o.created_at, o.updated_at
    FROM observations o
    JOIN regions r ON r.id = o.region_id
    JOIN parameters p ON p.id = o.parameter_id";

/// Restricts an observation listing. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ObservationFilter {
    pub region: Option<String>,
    pub parameter: Option<String>,
    pub year: Option<i32>,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ObservationFilter {
    pub fn series(region: &str, parameter: &str) -> Self {
        ObservationFilter {
            region: Some(region.to_string()),
            parameter: Some(parameter.to_string()),
            ..Default::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(region) = &self.region {
            values.push(Value::Text(region.clone()));
            conditions.push(format!("r.code = ?{}", values.len()));
        }
        if let Some(parameter) = &self.parameter {
            values.push(Value::Text(parameter.clone()));
            conditions.push(format!("p.code = ?{}", values.len()));
        }
        if let Some(year) = self.year {
            values.push(Value::Integer(year.into()));
            conditions.push(format!("o.year = ?{}", values.len()));
        }
        if let Some(year_from) = self.year_from {
            values.push(Value::Integer(year_from.into()));
            conditions.push(format!("o.year >= ?{}", values.len()));
        }
        if let Some(year_to) = self.year_to {
            values.push(Value::Integer(year_to.into()));
            conditions.push(format!("o.year <= ?{}", values.len()));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }

    fn limit_clause(&self) -> String {
        if self.limit.is_none() && self.offset.is_none() {
            return String::new();
        }

        let limit = self.limit.map(|l| l as i64).unwrap_or(-1);
        format!(" LIMIT {} OFFSET {}", limit, self.offset.unwrap_or(0))
    }
}

/// An observation joined with its region and parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationRow {
    pub id: i64,
    pub region_code: String,
    pub region_name: String,
    pub parameter_code: String,
    pub parameter_name: String,
    pub parameter_unit: String,
    pub year: i32,
    pub month: u32,
    pub value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ObservationRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(ObservationRow {
            id: row.get(0)?,
            region_code: row.get(1)?,
            region_name: row.get(2)?,
            parameter_code: row.get(3)?,
            parameter_name: row.get(4)?,
            parameter_unit: row.get(5)?,
            year: row.get(6)?,
            month: row.get(7)?,
            value: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

/// One page of a filtered listing, with the number of rows the filter
/// matches before paging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationPage {
    pub count: i64,
    pub results: Vec<ObservationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRow {
    pub id: i64,
    pub url: String,
    pub region_code: String,
    pub region_name: String,
    pub parameter_code: String,
    pub parameter_name: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataRange {
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub avg_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyAverage {
    pub year: i32,
    pub avg_value: f64,
}

/// Aggregates over one series, plus the catalog for context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub region: String,
    pub parameter: String,
    pub total_records: i64,
    pub data_range: DataRange,
    pub regions: Vec<RegionRow>,
    pub parameters: Vec<ParameterRow>,
    pub summary: Vec<YearlyAverage>,
}

/// A series laid out for plotting, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub region: String,
    pub parameter: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_records: i64,
    pub earliest_year: Option<i32>,
    pub latest_year: Option<i32>,
    pub regions: i64,
    pub parameters: i64,
}

impl Database {
    pub fn list_regions(&self) -> Result<Vec<RegionRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, name, description FROM regions ORDER BY name")?;
        let rows = stmt.query_map([], RegionRow::from_row)?;
        rows.collect()
    }

    pub fn list_parameters(&self) -> Result<Vec<ParameterRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, code, name, unit, description FROM parameters ORDER BY code")?;
        let rows = stmt.query_map([], ParameterRow::from_row)?;
        rows.collect()
    }

    /// Lists observations matching `filter`, newest first.
    pub fn list_observations(&self, filter: &ObservationFilter) -> Result<Vec<ObservationRow>> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT {OBSERVATION_COLUMNS}{where_clause} ORDER BY o.year DESC, o.month DESC{}",
            filter.limit_clause()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), ObservationRow::from_row)?;
        rows.collect()
    }

    pub fn get_observation(&self, id: i64) -> Result<Option<ObservationRow>> {
        self.conn
            .query_row(
                &format!("SELECT {OBSERVATION_COLUMNS} WHERE o.id = ?1"),
                [id],
                ObservationRow::from_row,
            )
            .optional()
    }

    pub fn count_observations(&self, filter: &ObservationFilter) -> Result<i64> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT COUNT(*) FROM observations o
             JOIN regions r ON r.id = o.region_id
             JOIN parameters p ON p.id = o.parameter_id{where_clause}"
        );

        self.conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))
    }

    pub fn page_observations(&self, filter: &ObservationFilter) -> Result<ObservationPage> {
        Ok(ObservationPage {
            count: self.count_observations(filter)?,
            results: self.list_observations(filter)?,
        })
    }

    pub fn list_sources(&self) -> Result<Vec<SourceRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.url, r.code, r.name, p.code, p.name, s.last_updated, s.is_active
             FROM sources s
             JOIN regions r ON r.id = s.region_id
             JOIN parameters p ON p.id = s.parameter_id
             ORDER BY r.name, p.name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SourceRow {
                id: row.get(0)?,
                url: row.get(1)?,
                region_code: row.get(2)?,
                region_name: row.get(3)?,
                parameter_code: row.get(4)?,
                parameter_name: row.get(5)?,
                last_updated: row.get(6)?,
                is_active: row.get(7)?,
            })
        })?;
        rows.collect()
    }

    /// Summarises one series: record count, value range and yearly means.
    pub fn summary(&self, region: &str, parameter: &str) -> Result<Summary> {
        let filter = ObservationFilter::series(region, parameter);
        let (where_clause, values) = filter.where_clause();
        let from = format!(
            "FROM observations o
             JOIN regions r ON r.id = o.region_id
             JOIN parameters p ON p.id = o.parameter_id{where_clause}"
        );

        let (total_records, data_range) = self.conn.query_row(
            &format!(
                "SELECT COUNT(*), MIN(o.year), MAX(o.year), MIN(o.value), MAX(o.value), AVG(o.value) {from}"
            ),
            params_from_iter(values.iter()),
            |row| {
                Ok((
                    row.get(0)?,
                    DataRange {
                        min_year: row.get(1)?,
                        max_year: row.get(2)?,
                        min_value: row.get(3)?,
                        max_value: row.get(4)?,
                        avg_value: row.get(5)?,
                    },
                ))
            },
        )?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT o.year, AVG(o.value) {from} GROUP BY o.year ORDER BY o.year"
        ))?;
        let summary = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                let avg: f64 = row.get(1)?;
                Ok(YearlyAverage {
                    year: row.get(0)?,
                    avg_value: round2(avg),
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(Summary {
            region: region.to_string(),
            parameter: parameter.to_string(),
            total_records,
            data_range,
            regions: self.list_regions()?,
            parameters: self.list_parameters()?,
            summary,
        })
    }

    pub fn chart_series(&self, region: &str, parameter: &str) -> Result<ChartSeries> {
        let mut stmt = self.conn.prepare(
            "SELECT o.year, o.month, o.value FROM observations o
             JOIN regions r ON r.id = o.region_id
             JOIN parameters p ON p.id = o.parameter_id
             WHERE r.code = ?1 AND p.code = ?2
             ORDER BY o.year, o.month",
        )?;

        let mut series = ChartSeries {
            region: region.to_string(),
            parameter: parameter.to_string(),
            labels: Vec::new(),
            values: Vec::new(),
        };

        let rows = stmt.query_map([region, parameter], |row| {
            Ok((row.get::<_, i32>(0)?, row.get::<_, u32>(1)?, row.get::<_, f64>(2)?))
        })?;
        for row in rows {
            let (year, month, value) = row?;
            series.labels.push(format!("{year}-{month:02}"));
            series.values.push(value);
        }

        Ok(series)
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM observations),
                (SELECT MIN(year) FROM observations),
                (SELECT MAX(year) FROM observations),
                (SELECT COUNT(*) FROM regions),
                (SELECT COUNT(*) FROM parameters)",
            [],
            |row| {
                Ok(DashboardStats {
                    total_records: row.get(0)?,
                    earliest_year: row.get(1)?,
                    latest_year: row.get(2)?,
                    regions: row.get(3)?,
                    parameters: row.get(4)?,
                })
            },
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// -- Tests -------------------------------------------------------------------
