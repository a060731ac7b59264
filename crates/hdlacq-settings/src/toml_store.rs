//! TOML file backend.
//!
//! Values are kept in memory and written back by [`SettingsStore::sync`]
//! (and on drop when there are unsynced changes).  The file is a single flat
//! table whose keys are the full setting paths:
//!
//! ```toml
//! "VelodyneHDLPlugin/CalibrationFileDialog/LidarPort" = 2368
//! "VelodyneHDLPlugin/CalibrationFileDialog/Files" = ["/data/calib/a.xml"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::SettingsError;
use crate::store::{MemorySettings, SettingsStore};
use crate::value::SettingValue;

/// Settings persisted to a TOML file.
#[derive(Debug)]
pub struct TomlSettings {
    path: PathBuf,
    inner: MemorySettings,
    dirty: bool,
}

impl TomlSettings {
    /// Open the store at `path`.  A missing file yields an empty store; the
    /// file is created on the first [`sync`](SettingsStore::sync).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| SettingsError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let table: BTreeMap<String, toml::Value> = toml::from_str(&raw)?;
            let values = decode_entries(table);
            debug!(path = %path.display(), keys = values.len(), "Loaded settings file");
            MemorySettings::from_map(values)
        } else {
            MemorySettings::new()
        };
        Ok(Self {
            path,
            inner,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
            // Restrict the settings directory to the owner only (rwx------) on Unix.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(io_err)?;
            }
        }
        let raw = toml::to_string_pretty(self.inner.as_map())?;
        // Owner-only read/write (rw-------) on Unix.
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .and_then(|mut f| f.write_all(raw.as_bytes()))
                .map_err(io_err)?;
        }
        #[cfg(not(unix))]
        fs::write(&self.path, raw).map_err(io_err)?;
        Ok(())
    }
}

/// Convert each entry on its own so one malformed value only loses that key.
fn decode_entries(table: BTreeMap<String, toml::Value>) -> BTreeMap<String, SettingValue> {
    table
        .into_iter()
        .filter_map(|(key, raw)| match raw.try_into::<SettingValue>() {
            Ok(value) => Some((key, value)),
            Err(e) => {
                warn!(key, error = %e, "Unreadable setting, treating as absent");
                None
            }
        })
        .collect()
}

impl SettingsStore for TomlSettings {
    fn value(&self, key: &str) -> Option<SettingValue> {
        self.inner.value(key)
    }

    fn set_value(&mut self, key: &str, value: SettingValue) -> Result<(), SettingsError> {
        self.inner.set_value(key, value)?;
        self.dirty = true;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        if self.inner.contains(key) {
            self.inner.remove(key)?;
            self.dirty = true;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn sync(&mut self) -> Result<(), SettingsError> {
        if self.dirty {
            self.write_file()?;
            self.dirty = false;
            debug!(path = %self.path.display(), "Settings file written");
        }
        Ok(())
    }
}

impl Drop for TomlSettings {
    fn drop(&mut self) {
        if let Err(e) = self.sync() {
            warn!(error = %e, path = %self.path.display(), "Failed to write settings on drop");
        }
    }
}
