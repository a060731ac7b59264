//! The [`SettingsStore`] seam and the in-memory backend.
//!
//! # Example
//!
//! ```rust
//! use hdlacq_settings::{MemorySettings, SettingsExt};
//!
//! let mut settings = MemorySettings::new();
//! settings.set("Plugin/LidarPort", 2400_i64).unwrap();
//!
//! assert_eq!(settings.get("Plugin/LidarPort", 2368_i64), 2400);
//! assert_eq!(settings.get("Plugin/GpsPort", 8308_i64), 8308);
//! ```

use std::collections::BTreeMap;

use crate::SettingsError;
use crate::value::{FromSetting, SettingValue};

/// A flat, string-keyed settings backend.
///
/// Reads never fail: a backend that cannot read a key reports it as absent.
/// Writes may fail for persistent backends.
pub trait SettingsStore {
    /// Raw stored value for `key`, if any.
    fn value(&self, key: &str) -> Option<SettingValue>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError>;

    /// Delete `key`.  No-op when absent.
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Vec<String>;

    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Flush pending writes to durable storage.
    fn sync(&mut self) -> Result<(), SettingsError> {
        Ok(())
    }
}

/// Typed access on top of any [`SettingsStore`].
pub trait SettingsExt: SettingsStore {
    /// Read `key` as `T`, returning `default` when the key is absent or the
    /// stored value cannot be converted.
    fn get<T: FromSetting>(&self, key: &str, default: T) -> T {
        self.value(key)
            .and_then(|v| T::from_setting(&v))
            .unwrap_or(default)
    }

    /// Store `value` under `key`.
    fn set<T: Into<SettingValue>>(&mut self, key: &str, value: T) -> Result<(), SettingsError> {
        self.set_value(key, value.into())
    }
}

impl<S: SettingsStore + ?Sized> SettingsExt for S {}

impl<S: SettingsStore + ?Sized> SettingsStore for &mut S {
    fn value(&self, key: &str) -> Option<SettingValue> {
        (**self).value(key)
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        (**self).set_value(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        (**self).sync()
    }
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn value(&self, key: &str) -> Option<SettingValue> {
        (**self).value(key)
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        (**self).set_value(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        (**self).sync()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemorySettings
// ─────────────────────────────────────────────────────────────────────────────

/// Process-lifetime store with no persistence.  Used in tests and as the
/// fallback when a persistent backend cannot be opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySettings {
    values: BTreeMap<String, SettingValue>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn from_map(values: BTreeMap<String, SettingValue>) -> Self {
        Self { values }
    }

    pub(crate) fn as_map(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }
}

impl SettingsStore for MemorySettings {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
