//! `hdlacq` – HDL acquisition configuration shell.
//!
//! This binary is the terminal front-end of the calibration dialog.  It:
//!
//! 1. Loads `~/.hdlacq/config.toml`, writing the defaults on first run.
//! 2. Opens the configured settings backend (TOML file or SQLite database).
//! 3. Builds the calibration catalog from the factory resource directory and
//!    the persisted operator files.
//! 4. Drops the user into an **interactive REPL** with slash-commands.
//!    `/accept` saves the configuration; `/cancel` or **Ctrl-C** discards it.

mod config;
mod picker;
mod repl;

use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use hdlacq_dialog::{CalibrationDialog, built_in_calibration_paths, default_resource_dir};
use hdlacq_settings::{MemorySettings, SettingsError, SettingsStore, SqliteSettings, TomlSettings};
use hdlacq_types::AcqError;

use config::{Config, SettingsBackend};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG selects the level (default "info"); HDLACQ_LOG_FORMAT=json
    // switches to newline-delimited JSON.  Operator output stays on println!.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("HDLACQ_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – press Enter to discard edits and exit.".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = load_config();

    // ── Settings backend ──────────────────────────────────────────────────
    let settings = open_settings(&cfg);

    // ── Calibration catalog ───────────────────────────────────────────────
    let resource_dir = cfg
        .resource_dir
        .as_ref()
        .map(PathBuf::from)
        .or_else(default_resource_dir);
    let built_ins = match &resource_dir {
        Some(dir) => {
            println!("  Factory calibrations in {}", dir.display().to_string().bold());
            built_in_calibration_paths(dir)
        }
        None => {
            warn!("Cannot locate the resource directory; no built-in calibrations");
            Vec::new()
        }
    };

    let mut dialog = CalibrationDialog::new(settings, built_ins);

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    match repl::run(&mut dialog, shutdown) {
        Some(accepted) => info!(
            calibration = accepted.selected_calibration_file(),
            "Acquisition configuration accepted"
        ),
        None => info!("Acquisition configuration unchanged"),
    }
    dialog.close();
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup helpers
// ─────────────────────────────────────────────────────────────────────────────

fn load_config() -> Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

/// Open the configured backend, falling back to an in-memory store so the
/// dialog still works (without persistence) when the file is unusable.
fn open_settings(cfg: &Config) -> Box<dyn SettingsStore> {
    let path = cfg.settings_path();
    match open_backend(cfg.settings_backend, &path) {
        Ok(store) => {
            println!(
                "  Settings ({}) at {}",
                cfg.settings_backend,
                path.display().to_string().bold()
            );
            store
        }
        Err(e) => {
            warn!(error = %e, path = %path.display(), "Failed to open settings; changes will not persist");
            println!(
                "  {} settings are kept in memory for this session",
                "Warning:".yellow()
            );
            Box::new(MemorySettings::new())
        }
    }
}

fn open_backend(backend: SettingsBackend, path: &Path) -> Result<Box<dyn SettingsStore>, AcqError> {
    let opened: Result<Box<dyn SettingsStore>, SettingsError> = match backend {
        SettingsBackend::Toml => {
            TomlSettings::open(path).map(|s| Box::new(s) as Box<dyn SettingsStore>)
        }
        SettingsBackend::Sqlite => {
            if let Some(parent) = path.parent()
                && let Err(e) = std::fs::create_dir_all(parent)
            {
                warn!(error = %e, dir = %parent.display(), "Failed to create settings directory");
            }
            SqliteSettings::open(&path.to_string_lossy())
                .map(|s| Box::new(s) as Box<dyn SettingsStore>)
        }
    };
    opened.map_err(|e| AcqError::Settings(e.to_string()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __        ____                 "#.bold().cyan());
    println!("{}", r#"  / /  ___  / / /__ _____ ___ _   "#.bold().cyan());
    println!("{}", r#" / _ \/ _ \/ / / _ `/ __// _ `/   "#.bold().cyan());
    println!("{}", r#"/_//_/\_,_/_/_/\_,_/\__/ \_, /    "#.bold().cyan());
    println!("{}", r#"                          /_/     "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "hdlacq".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Velodyne HDL acquisition configuration");
    println!();
}
