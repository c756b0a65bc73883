// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use ticketpad_app::HistoryEntry;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

pub const APP_NAME: &str = "ticketpad";

/// Storage key holding the JSON array of saved entries.
pub const HISTORY_KEY: &str = "history";
/// Unparseable history is parked here before it can be overwritten.
pub const CORRUPT_HISTORY_KEY: &str = "history.corrupt";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("kv", &["key", "value", "updated_at"])];

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
            .with_context(|| format!("read key {key}"))
    }

    pub fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO kv (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key, value, now],
            )
            .with_context(|| format!("upsert key {key}"))?;
        Ok(())
    }

    /// Reads the saved history.
    ///
    /// A missing key is an empty history. A value that is not a JSON array of
    /// entries also yields an empty history; the raw value is copied to
    /// [`CORRUPT_HISTORY_KEY`] first so it survives the next save.
    pub fn load_history(&self) -> Result<Vec<HistoryEntry>> {
        let Some(raw) = self.get_value(HISTORY_KEY)? else {
            debug!("no stored history");
            return Ok(Vec::new());
        };

        match parse_history(&raw) {
            Ok(entries) => {
                debug!(count = entries.len(), "loaded history");
                Ok(entries)
            }
            Err(error) => {
                warn!(%error, "stored history is not valid JSON; starting empty");
                self.put_value(CORRUPT_HISTORY_KEY, &raw)?;
                Ok(Vec::new())
            }
        }
    }

    pub fn save_history(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries).context("serialize history")?;
        self.put_value(HISTORY_KEY, &raw)?;
        debug!(count = entries.len(), "saved history");
        Ok(())
    }

    pub fn export_history_json(&self) -> Result<String> {
        let entries = self.load_history()?;
        serde_json::to_string_pretty(&entries).context("serialize history for export")
    }

    pub fn history_updated_at(&self) -> Result<Option<OffsetDateTime>> {
        let raw = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv WHERE key = ?",
                params![HISTORY_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .context("read history timestamp")?;
        raw.map(|value| {
            OffsetDateTime::parse(&value, &Rfc3339)
                .with_context(|| format!("parse history timestamp {value:?}"))
        })
        .transpose()
    }
}

pub fn parse_history(raw: &str) -> Result<Vec<HistoryEntry>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("parse history JSON")?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).context("decode history entries")
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("TICKETPAD_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let app_dir = data_dir()?;
    Ok(app_dir.join("ticketpad.db"))
}

pub fn data_dir() -> Result<PathBuf> {
    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set TICKETPAD_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir)
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at a ticketpad database"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; move the file aside to start fresh",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;

    let names = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;
    Ok(names)
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}
