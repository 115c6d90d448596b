//! SQLite persistence for the catalog, observations and source records.

pub mod query;
mod schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::Serialize;

use crate::reading::Observation;

pub use query::{ObservationFilter, ObservationRow};

/// Whether an upsert inserted a new row or rewrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
}

impl RegionRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(RegionRow {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterRow {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub description: String,
}

impl ParameterRow {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(ParameterRow {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            unit: row.get(3)?,
            description: row.get(4)?,
        })
    }
}

/// A connection to the observation store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Database { conn })
    }

    /// Inserts a region unless one with the same code exists. Returns `true`
    /// if a row was created.
    pub fn insert_region(&self, code: &str, name: &str, description: &str) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT INTO regions (code, name, description) VALUES (?1, ?2, ?3)
             ON CONFLICT(code) DO NOTHING",
            params![code, name, description],
        )?;

        Ok(changed == 1)
    }

    /// Inserts a parameter unless one with the same code exists. Returns
    /// `true` if a row was created.
    pub fn insert_parameter(
        &self,
        code: &str,
        name: &str,
        unit: &str,
        description: &str,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "INSERT INTO parameters (code, name, unit, description) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(code) DO NOTHING",
            params![code, name, unit, description],
        )?;

        Ok(changed == 1)
    }

    pub fn region(&self, code: &str) -> Result<Option<RegionRow>> {
        self.conn
            .query_row(
                "SELECT id, code, name, description FROM regions WHERE code = ?1",
                [code],
                RegionRow::from_row,
            )
            .optional()
    }

    pub fn parameter(&self, code: &str) -> Result<Option<ParameterRow>> {
        self.conn
            .query_row(
                "SELECT id, code, name, unit, description FROM parameters WHERE code = ?1",
                [code],
                ParameterRow::from_row,
            )
            .optional()
    }

    /// Creates or updates the observation for `(region, parameter, year,
    /// month)`, setting its value.
    ///
    /// Runs in its own transaction so the existence check and the write are
    /// atomic.
    pub fn upsert_observation(
        &self,
        region_id: i64,
        parameter_id: i64,
        observation: &Observation,
        now: DateTime<Utc>,
    ) -> Result<Upsert> {
        let tx = self.conn.unchecked_transaction()?;
        let Observation { year, month, value } = *observation;

        let inserted = tx.execute(
            "INSERT INTO observations
                (region_id, parameter_id, year, month, value, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             ON CONFLICT(region_id, parameter_id, year, month) DO NOTHING",
            params![region_id, parameter_id, year, month, value, now],
        )?;

        if inserted == 0 {
            tx.execute(
                "UPDATE observations SET value = ?5, updated_at = ?6
                 WHERE region_id = ?1 AND parameter_id = ?2 AND year = ?3 AND month = ?4",
                params![region_id, parameter_id, year, month, value, now],
            )?;
        }

        tx.commit()?;

        Ok(if inserted == 1 {
            Upsert::Created
        } else {
            Upsert::Updated
        })
    }

    /// Records where a series was last read from.
    pub fn upsert_source(
        &self,
        region_id: i64,
        parameter_id: i64,
        url: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sources (region_id, parameter_id, url, last_updated, is_active)
             VALUES (?1, ?2, ?3, ?4, 1)
             ON CONFLICT(region_id, parameter_id) DO UPDATE SET
                url = excluded.url,
                last_updated = excluded.last_updated,
                is_active = 1",
            params![region_id, parameter_id, url, now],
        )?;

        Ok(())
    }
}

// -- Tests -------------------------------------------------------------------
