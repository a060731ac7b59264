//! `hdlacq-settings` – the application settings store.
//!
//! A flat, string-keyed store of scalar values that outlives any single
//! dialog.  Callers depend only on the [`SettingsStore`] trait, so the
//! backend can be swapped without touching the dialog logic.
//!
//! # Modules
//!
//! - [`value`] – [`SettingValue`][value::SettingValue] and the lenient
//!   [`FromSetting`][value::FromSetting] conversions used by typed reads.
//! - [`store`] – the [`SettingsStore`][store::SettingsStore] trait, the typed
//!   [`SettingsExt`][store::SettingsExt] helpers and the in-memory backend.
//! - [`toml_store`] – [`TomlSettings`][toml_store::TomlSettings]: a TOML file
//!   with owner-only permissions.
//! - [`sqlite_store`] – [`SqliteSettings`][sqlite_store::SqliteSettings]: a
//!   single-table SQLite database.

pub mod sqlite_store;
pub mod store;
pub mod toml_store;
pub mod value;

pub use sqlite_store::SqliteSettings;
pub use store::{MemorySettings, SettingsExt, SettingsStore};
pub use toml_store::TomlSettings;
pub use value::{FromSetting, SettingValue};

use thiserror::Error;

/// Errors raised by file- or database-backed stores.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Malformed stored value: {0}")]
    Json(#[from] serde_json::Error),
}
