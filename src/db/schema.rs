//! SQL schema for the observation store.
//!
//! Executed on every open; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS regions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    code        TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS parameters (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    code        TEXT NOT NULL UNIQUE
                CHECK (code IN ('Tmax', 'Tmin', 'Tmean', 'Sunshine', 'Rainfall')),
    name        TEXT NOT NULL,
    unit        TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS observations (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    region_id    INTEGER NOT NULL REFERENCES regions(id) ON DELETE CASCADE,
    parameter_id INTEGER NOT NULL REFERENCES parameters(id) ON DELETE CASCADE,
    year         INTEGER NOT NULL CHECK (year BETWEEN 1900 AND 2030),
    month        INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    value        REAL NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (region_id, parameter_id, year, month)
);

-- One row per series; rewritten after every ingestion attempt.
CREATE TABLE IF NOT EXISTS sources (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    url          TEXT NOT NULL,
    region_id    INTEGER NOT NULL REFERENCES regions(id) ON DELETE CASCADE,
    parameter_id INTEGER NOT NULL REFERENCES parameters(id) ON DELETE CASCADE,
    last_updated TEXT,
    is_active    INTEGER NOT NULL DEFAULT 1,
    UNIQUE (region_id, parameter_id)
);

CREATE INDEX IF NOT EXISTS observations_period_idx ON observations(year, month);
";
