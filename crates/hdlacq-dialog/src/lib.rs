//! `hdlacq-dialog` – calibration and acquisition settings dialog.
//!
//! Holds the operator-facing configuration logic with no dependency on any
//! widget toolkit: front-ends feed user actions in and apply the returned
//! [`UiEffect`]s.
//!
//! # Modules
//!
//! - [`catalog`] – [`CalibrationCatalog`][catalog::CalibrationCatalog]:
//!   live-corrections sentinel, factory built-ins and operator-added files,
//!   with removal restricted to the latter.
//! - [`state`] – [`DialogState`][state::DialogState]: the plain UI state.
//! - [`bridge`] – restore/persist of the state through any
//!   [`SettingsStore`][hdlacq_settings::SettingsStore].
//! - [`dialog`] – [`CalibrationDialog`][dialog::CalibrationDialog]: event
//!   handlers, accept/reject/close lifecycle and the
//!   [`FilePicker`][dialog::FilePicker] seam.
//! - [`consumer`] – [`AcquisitionConfig`][consumer::AcquisitionConfig]: the
//!   read-only snapshot handed to the acquisition pipeline.
//! - [`keys`] – settings key names.

pub mod bridge;
pub mod catalog;
pub mod consumer;
pub mod dialog;
pub mod keys;
pub mod state;

pub use catalog::{CalibrationCatalog, built_in_calibration_paths, default_resource_dir};
pub use consumer::AcquisitionConfig;
pub use dialog::{CalibrationDialog, DialogOutcome, FilePicker, UiEffect, Widget};
pub use state::DialogState;
