//! CLI configuration – reads/writes `~/.hdlacq/config.toml`.
//!
//! This only decides *where* things live (settings backend, resource
//! directory).  The acquisition settings themselves go through the settings
//! store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which settings backend to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SettingsBackend {
    #[default]
    Toml,
    Sqlite,
}

impl std::fmt::Display for SettingsBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsBackend::Toml => write!(f, "toml"),
            SettingsBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for SettingsBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "toml" => Ok(SettingsBackend::Toml),
            "sqlite" => Ok(SettingsBackend::Sqlite),
            other => Err(format!("Unknown settings backend '{}'", other)),
        }
    }
}

/// Persisted CLI configuration stored in `~/.hdlacq/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Settings backend.
    #[serde(default)]
    pub settings_backend: SettingsBackend,

    /// Explicit settings file; defaults to `~/.hdlacq/settings.{toml,db}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings_path: Option<String>,

    /// Directory holding the factory calibration files; defaults to the
    /// install-relative resource directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<String>,
}

impl Config {
    /// Settings file to open, resolved against `home` when not explicit.
    pub fn settings_path_for_home(&self, home: &str) -> PathBuf {
        match &self.settings_path {
            Some(p) => PathBuf::from(p),
            None => {
                let file = match self.settings_backend {
                    SettingsBackend::Toml => "settings.toml",
                    SettingsBackend::Sqlite => "settings.db",
                };
                PathBuf::from(home).join(".hdlacq").join(file)
            }
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.settings_path_for_home(&home_dir())
    }
}

pub(crate) fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

/// Return the path to `~/.hdlacq/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(&home_dir())
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".hdlacq").join("config.toml")
}

/// Load the config from disk with `HDLACQ_*` overrides applied.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    Ok(load_from(&config_path())?.map(|mut cfg| {
        apply_env_overrides(&mut cfg);
        cfg
    }))
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `HDLACQ_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `HDLACQ_SETTINGS_BACKEND` | `settings_backend` |
/// | `HDLACQ_SETTINGS_PATH` | `settings_path` |
/// | `HDLACQ_RESOURCE_DIR` | `resource_dir` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("HDLACQ_SETTINGS_BACKEND")
        && let Ok(backend) = v.parse::<SettingsBackend>()
    {
        cfg.settings_backend = backend;
    }
    if let Ok(v) = std::env::var("HDLACQ_SETTINGS_PATH") {
        cfg.settings_path = Some(v);
    }
    if let Ok(v) = std::env::var("HDLACQ_RESOURCE_DIR") {
        cfg.resource_dir = Some(v);
    }
}

/// Save the config, creating `~/.hdlacq/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_path_follows_backend() {
        let mut cfg = Config::default();
        assert!(cfg.settings_path_for_home("/home/op").ends_with(".hdlacq/settings.toml"));
        cfg.settings_backend = SettingsBackend::Sqlite;
        assert!(cfg.settings_path_for_home("/home/op").ends_with(".hdlacq/settings.db"));
        cfg.settings_path = Some("/srv/acq.db".into());
        assert_eq!(cfg.settings_path_for_home("/home/op"), PathBuf::from("/srv/acq.db"));
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<SettingsBackend>(), Ok(SettingsBackend::Sqlite));
        assert!("redis".parse::<SettingsBackend>().is_err());
        assert_eq!(SettingsBackend::Toml.to_string(), "toml");
    }

    #[test]
    fn roundtrip_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config {
            settings_backend: SettingsBackend::Sqlite,
            settings_path: None,
            resource_dir: Some("/opt/hdlacq/share".into()),
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.settings_backend, SettingsBackend::Sqlite);
        assert_eq!(loaded.resource_dir.as_deref(), Some("/opt/hdlacq/share"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn unparsable_config_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "settings_backend = \"redis\"").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
    }

    #[test]
    fn apply_env_overrides_changes_backend_and_ignores_invalid() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HDLACQ_SETTINGS_BACKEND", "sqlite") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.settings_backend, SettingsBackend::Sqlite);

        unsafe { std::env::set_var("HDLACQ_SETTINGS_BACKEND", "floppy") };
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.settings_backend, SettingsBackend::Sqlite);
        unsafe { std::env::remove_var("HDLACQ_SETTINGS_BACKEND") };
    }

    #[test]
    fn apply_env_overrides_changes_resource_dir() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("HDLACQ_RESOURCE_DIR", "/mnt/calib") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.resource_dir.as_deref(), Some("/mnt/calib"));
        unsafe { std::env::remove_var("HDLACQ_RESOURCE_DIR") };
    }
}
