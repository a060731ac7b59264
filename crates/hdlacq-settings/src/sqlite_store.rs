//! SQLite backend.
//!
//! # Storage layout
//!
//! | column | type | description                                  |
//! |--------|------|----------------------------------------------|
//! | key    | TEXT | full setting path, primary key               |
//! | value  | TEXT | JSON encoding of the [`SettingValue`]        |
//!
//! JSON has no infinities or NaN, so non-finite doubles are stored as
//! `{"f64_bits": <u64>}` holding the exact bit pattern.
//!
//! Every write is committed immediately, so `sync` is a no-op.

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::SettingsError;
use crate::store::SettingsStore;
use crate::value::SettingValue;

/// On-disk form of a value.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    NonFinite { f64_bits: u64 },
    Plain(SettingValue),
}

fn encode(value: SettingValue) -> Result<String, SettingsError> {
    let stored = match value {
        SettingValue::Double(d) if !d.is_finite() => StoredValue::NonFinite {
            f64_bits: d.to_bits(),
        },
        other => StoredValue::Plain(other),
    };
    Ok(serde_json::to_string(&stored)?)
}

fn decode(json: &str) -> Result<SettingValue, SettingsError> {
    Ok(match serde_json::from_str(json)? {
        StoredValue::NonFinite { f64_bits } => SettingValue::Double(f64::from_bits(f64_bits)),
        StoredValue::Plain(value) => value,
    })
}

/// Settings persisted to a SQLite database.
pub struct SqliteSettings {
    conn: Connection,
}

impl SqliteSettings {
    /// Open (or create) a database at `path`.
    pub fn open(path: &str) -> Result<Self, SettingsError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a temporary in-memory database.
    pub fn open_in_memory() -> Result<Self, SettingsError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), SettingsError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS settings (
                key   TEXT NOT NULL PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn try_value(&self, key: &str) -> Result<Option<SettingValue>, SettingsError> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        match raw {
            Some(json) => Ok(Some(decode(&json)?)),
            None => Ok(None),
        }
    }

    fn try_keys(&self) -> Result<Vec<String>, SettingsError> {
        let mut stmt = self.conn.prepare("SELECT key FROM settings ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl SettingsStore for SqliteSettings {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.try_value(key)
            .map_err(|e| warn!(key, error = %e, "Unreadable setting, treating as absent"))
            .ok()
            .flatten()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        let json = encode(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, json],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.try_keys().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to list settings keys");
            Vec::new()
        })
    }
}
