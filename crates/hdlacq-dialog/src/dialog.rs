//! [`CalibrationDialog`] – the calibration/acquisition settings dialog,
//! expressed as state plus event handlers.
//!
//! A front-end (GUI, terminal, test) forwards user actions to the `on_*`
//! handlers and applies the returned [`UiEffect`]s to its widgets.  The
//! dialog never touches widgets itself.
//!
//! Lifecycle:
//!
//! 1. [`CalibrationDialog::new`] builds the catalog and restores the last
//!    accepted state from the settings store.
//! 2. Handlers mutate the state.  Adding or removing a calibration file is
//!    persisted immediately; everything else waits for acceptance.
//! 3. [`CalibrationDialog::accept`] persists the state and returns the
//!    [`AcquisitionConfig`] consumers read.  [`CalibrationDialog::reject`]
//!    discards pending edits.
//! 4. Closing (or dropping) the dialog persists the window geometry once.

use std::path::PathBuf;

use hdlacq_settings::{SettingsError, SettingsExt, SettingsStore};
use hdlacq_types::{NetworkConfig, Pose};
use tracing::{debug, info, warn};

use crate::bridge;
use crate::catalog::CalibrationCatalog;
use crate::consumer::AcquisitionConfig;
use crate::keys;
use crate::state::DialogState;

/// Title passed to the file picker.
pub const FILE_PICKER_TITLE: &str = "Choose Calibration File";
/// Filter passed to the file picker.
pub const FILE_PICKER_FILTER: &str = "xml (*.xml)";

// ─────────────────────────────────────────────────────────────────────────────
// Effects
// ─────────────────────────────────────────────────────────────────────────────

/// Widgets whose visibility or enabled state the dialog drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    RemoveButton,
    LidarPoseGroup,
    GpsPoseGroup,
    NetworkGroup,
    NetworkForwardingGroup,
    LidarForwardingPort,
    GpsForwardingPort,
    ForwardIpAddress,
}

/// Groups hidden unless the advanced configuration is shown.
pub const ADVANCED_GROUPS: [Widget; 4] = [
    Widget::LidarPoseGroup,
    Widget::GpsPoseGroup,
    Widget::NetworkGroup,
    Widget::NetworkForwardingGroup,
];

/// Fields editable only while forwarding is enabled.
pub const FORWARDING_FIELDS: [Widget; 3] = [
    Widget::LidarForwardingPort,
    Widget::GpsForwardingPort,
    Widget::ForwardIpAddress,
];

/// A change the front-end must apply to its widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    SetVisible(Widget, bool),
    SetEnabled(Widget, bool),
    /// A row was appended to the catalog list.
    AppendRow(usize),
    RemoveRow(usize),
    SelectRow(usize),
}

/// Modal selection of a single file.
pub trait FilePicker {
    /// Returns the chosen path, or an empty string when cancelled.
    fn pick_file(&mut self, title: &str, start_dir: &str, filter: &str) -> String;
}

/// How the dialog was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Accepted,
    Rejected,
}

fn home_dir() -> String {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// CalibrationDialog
// ─────────────────────────────────────────────────────────────────────────────

/// Calibration dialog state bound to a settings store.
///
/// # Example
///
/// ```
/// use hdlacq_dialog::{CalibrationDialog, UiEffect};
/// use hdlacq_settings::MemorySettings;
///
/// let mut settings = MemorySettings::new();
/// let mut dialog = CalibrationDialog::new(&mut settings, ["/share/HDL-32.xml"]);
///
/// let effects = dialog.on_file_chosen("/tmp/site.xml");
/// assert!(effects.contains(&UiEffect::SelectRow(2)));
///
/// let cfg = dialog.accept();
/// assert_eq!(cfg.selected_calibration_file(), "/tmp/site.xml");
/// ```
pub struct CalibrationDialog<S: SettingsStore> {
    settings: S,
    state: DialogState,
    /// Snapshot of the last restored/accepted state, used by `reject`.
    committed: DialogState,
    outcome: Option<DialogOutcome>,
    closed: bool,
}

impl<S: SettingsStore> CalibrationDialog<S> {
    /// Build the catalog from `built_in_paths` plus the persisted user files
    /// and restore the remaining fields from `settings`.
    pub fn new<B>(settings: S, built_in_paths: B) -> Self
    where
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let catalog = CalibrationCatalog::new(built_in_paths, bridge::load_file_list(&settings));
        let mut state = DialogState::new(catalog);
        bridge::restore(&mut state, &settings);
        info!(
            entries = state.catalog.len(),
            row = state.current_row,
            "Calibration dialog opened"
        );
        Self {
            settings,
            committed: state.clone(),
            state,
            outcome: None,
            closed: false,
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn catalog(&self) -> &CalibrationCatalog {
        &self.state.catalog
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    pub fn outcome(&self) -> Option<DialogOutcome> {
        self.outcome
    }

    /// Effects that bring freshly built widgets in line with the restored
    /// state.
    pub fn initial_effects(&self) -> Vec<UiEffect> {
        let mut effects = vec![UiEffect::SelectRow(self.state.current_row)];
        effects.push(self.remove_button_effect());
        effects.extend(advanced_effects(self.state.advanced_visible));
        effects.extend(forwarding_effects(self.state.network.forwarding_enabled));
        effects
    }

    /// Path of the selected row; empty for live corrections.
    pub fn selected_calibration_file(&self) -> &str {
        self.state.selected_calibration_file()
    }

    /// Operator-added calibration files as currently persisted.
    pub fn calibration_files(&self) -> Vec<String> {
        bridge::load_file_list(&self.settings)
    }

    /// Snapshot of the current (possibly unaccepted) state.
    pub fn config(&self) -> AcquisitionConfig {
        AcquisitionConfig::from_state(&self.state)
    }

    // ── Event handlers ────────────────────────────────────────────────────

    /// The selected catalog row changed.  Out-of-range rows are ignored.
    pub fn on_row_changed(&mut self, row: usize) -> Vec<UiEffect> {
        if row >= self.state.catalog.len() {
            debug!(row, "Ignoring selection of a row outside the catalog");
            return Vec::new();
        }
        self.state.current_row = row;
        vec![self.remove_button_effect()]
    }

    /// The file picker returned `path` (empty when cancelled).
    ///
    /// Appends and selects the file, persists the file list and remembers
    /// the containing directory for the next pick.
    pub fn on_file_chosen(&mut self, path: &str) -> Vec<UiEffect> {
        let Some(row) = self.state.catalog.add_user_file(path) else {
            debug!("Calibration file selection cancelled");
            return Vec::new();
        };
        self.state.current_row = row;
        self.write("file list", |s, st| bridge::persist_file_list(s, st));

        let file = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));
        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
            let dir = dir.to_string_lossy().into_owned();
            if let Err(e) = self.settings.set(keys::DEFAULT_DIR, dir) {
                warn!(error = %e, "Failed to remember calibration directory");
            }
        }
        info!(path, row, "Calibration file added");

        vec![
            UiEffect::AppendRow(row),
            UiEffect::SelectRow(row),
            self.remove_button_effect(),
        ]
    }

    /// "Add" was clicked: run `picker` in the last-used directory.
    pub fn add_file<P: FilePicker + ?Sized>(&mut self, picker: &mut P) -> Vec<UiEffect> {
        let start_dir: String = self.settings.get(keys::DEFAULT_DIR, home_dir());
        let chosen = picker.pick_file(FILE_PICKER_TITLE, &start_dir, FILE_PICKER_FILTER);
        self.on_file_chosen(&chosen)
    }

    /// "Remove" was clicked.  Only operator-added rows are removed.
    pub fn on_remove_clicked(&mut self) -> Vec<UiEffect> {
        let row = self.state.current_row;
        if !self.state.catalog.remove_selected(row) {
            debug!(row, "Row is not removable");
            return Vec::new();
        }
        self.state.current_row = row.min(self.state.catalog.len() - 1);
        self.write("file list", |s, st| bridge::persist_file_list(s, st));
        info!(row, "Calibration file removed");

        vec![
            UiEffect::RemoveRow(row),
            UiEffect::SelectRow(self.state.current_row),
            self.remove_button_effect(),
        ]
    }

    /// The advanced-configuration checkbox was toggled.
    pub fn on_advanced_toggled(&mut self, visible: bool) -> Vec<UiEffect> {
        self.state.advanced_visible = visible;
        advanced_effects(visible).collect()
    }

    /// The enable-forwarding checkbox was toggled.
    pub fn on_forwarding_toggled(&mut self, enabled: bool) -> Vec<UiEffect> {
        self.state.network.forwarding_enabled = enabled;
        forwarding_effects(enabled).collect()
    }

    /// "Clear advanced settings" was clicked.
    pub fn on_clear_advanced(&mut self) -> Vec<UiEffect> {
        self.state.reset_advanced();
        debug!("Advanced settings reset to defaults");
        advanced_effects(self.state.advanced_visible)
            .chain(forwarding_effects(self.state.network.forwarding_enabled))
            .collect()
    }

    pub fn set_sensor_pose(&mut self, pose: Pose) {
        self.state.sensor_pose = pose;
    }

    pub fn set_gps_pose(&mut self, pose: Pose) {
        self.state.gps_pose = pose;
    }

    /// Replace the network configuration.
    ///
    /// Returns the forwarding effects since the enabled flag may change.
    pub fn set_network(&mut self, network: NetworkConfig) -> Vec<UiEffect> {
        let enabled = network.forwarding_enabled;
        self.state.network = network;
        forwarding_effects(enabled).collect()
    }

    pub fn network_mut(&mut self) -> &mut NetworkConfig {
        &mut self.state.network
    }

    pub fn set_geometry(&mut self, geometry: Vec<u8>) {
        self.state.geometry = geometry;
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Persist the state and return the snapshot consumers read.
    pub fn accept(&mut self) -> AcquisitionConfig {
        self.write("dialog state", |s, st| bridge::persist(s, st));
        if let Err(e) = self.settings.sync() {
            warn!(error = %e, "Failed to flush settings");
        }
        self.committed = self.state.clone();
        self.outcome = Some(DialogOutcome::Accepted);
        let cfg = self.config();
        info!(
            calibration = cfg.selected_calibration_file(),
            lidar_port = cfg.lidar_port(),
            gps_port = cfg.gps_port(),
            forwarding = cfg.is_forwarding(),
            "Calibration dialog accepted"
        );
        cfg
    }

    /// Discard edits made since the dialog opened (or was last accepted).
    ///
    /// Catalog changes are already persisted and therefore kept.
    pub fn reject(&mut self) {
        let catalog = std::mem::take(&mut self.state.catalog);
        let geometry = std::mem::take(&mut self.state.geometry);
        self.state = self.committed.clone();
        self.state.catalog = catalog;
        self.state.geometry = geometry;
        self.state.clamp_current_row();
        self.outcome = Some(DialogOutcome::Rejected);
        info!("Calibration dialog rejected");
    }

    /// Persist the window geometry.  Subsequent calls (and drop) are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.write("geometry", |s, st| bridge::persist_geometry(s, st));
        if let Err(e) = self.settings.sync() {
            warn!(error = %e, "Failed to flush settings");
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn remove_button_effect(&self) -> UiEffect {
        UiEffect::SetEnabled(
            Widget::RemoveButton,
            self.state.catalog.is_removable(self.state.current_row),
        )
    }

    /// Run a persistence step, logging instead of propagating failures.
    fn write<F>(&mut self, what: &str, f: F)
    where
        F: FnOnce(&mut S, &DialogState) -> Result<(), SettingsError>,
    {
        if let Err(e) = f(&mut self.settings, &self.state) {
            warn!(error = %e, what, "Failed to persist setting");
        }
    }
}

impl<S: SettingsStore> Drop for CalibrationDialog<S> {
    fn drop(&mut self) {
        self.close();
    }
}

fn advanced_effects(visible: bool) -> impl Iterator<Item = UiEffect> {
    ADVANCED_GROUPS
        .into_iter()
        .map(move |w| UiEffect::SetVisible(w, visible))
}

fn forwarding_effects(enabled: bool) -> impl Iterator<Item = UiEffect> {
    FORWARDING_FIELDS
        .into_iter()
        .map(move |w| UiEffect::SetEnabled(w, enabled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlacq_settings::MemorySettings;

    struct ScriptedPicker {
        answer: String,
        seen_dir: Option<String>,
        seen_filter: Option<String>,
    }

    impl ScriptedPicker {
        fn new(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                seen_dir: None,
                seen_filter: None,
            }
        }
    }

    impl FilePicker for ScriptedPicker {
        fn pick_file(&mut self, _title: &str, start_dir: &str, filter: &str) -> String {
            self.seen_dir = Some(start_dir.to_string());
            self.seen_filter = Some(filter.to_string());
            self.answer.clone()
        }
    }

    const BUILT_INS: [&str; 2] = ["/share/HDL-32.xml", "/share/VLP-16.xml"];

    #[test]
    fn new_dialog_has_sentinel_and_built_ins() {
        let mut settings = MemorySettings::new();
        let dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        assert_eq!(dialog.catalog().len(), 3);
        assert_eq!(dialog.selected_calibration_file(), "");
        assert!(!dialog.state().advanced_visible);
    }

    #[test]
    fn initial_effects_hide_advanced_and_disable_forwarding() {
        let mut settings = MemorySettings::new();
        let dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let effects = dialog.initial_effects();
        assert!(effects.contains(&UiEffect::SelectRow(0)));
        assert!(effects.contains(&UiEffect::SetEnabled(Widget::RemoveButton, false)));
        for w in ADVANCED_GROUPS {
            assert!(effects.contains(&UiEffect::SetVisible(w, false)));
        }
        for w in FORWARDING_FIELDS {
            assert!(effects.contains(&UiEffect::SetEnabled(w, false)));
        }
    }

    #[test]
    fn row_change_toggles_remove_button() {
        let mut settings = MemorySettings::new();
        settings.set(keys::FILES, vec!["/u/a.xml".to_string()]).unwrap();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);

        assert_eq!(
            dialog.on_row_changed(2),
            vec![UiEffect::SetEnabled(Widget::RemoveButton, false)]
        );
        assert_eq!(
            dialog.on_row_changed(3),
            vec![UiEffect::SetEnabled(Widget::RemoveButton, true)]
        );
        assert!(dialog.on_row_changed(10).is_empty());
        assert_eq!(dialog.state().current_row, 3);
    }

    #[test]
    fn cancelled_pick_changes_nothing() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let mut picker = ScriptedPicker::new("");
        assert!(dialog.add_file(&mut picker).is_empty());
        assert_eq!(dialog.catalog().len(), 3);
        assert_eq!(picker.seen_filter.as_deref(), Some(FILE_PICKER_FILTER));
        drop(dialog);
        assert!(!settings.contains(keys::FILES));
    }

    #[test]
    fn added_file_is_selected_and_persisted() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let effects = dialog.add_file(&mut ScriptedPicker::new("/tmp/foo.xml"));

        assert_eq!(
            effects,
            vec![
                UiEffect::AppendRow(3),
                UiEffect::SelectRow(3),
                UiEffect::SetEnabled(Widget::RemoveButton, true),
            ]
        );
        assert_eq!(dialog.selected_calibration_file(), "/tmp/foo.xml");
        assert_eq!(dialog.calibration_files(), vec!["/tmp/foo.xml".to_string()]);
        drop(dialog);
        assert_eq!(settings.get(keys::DEFAULT_DIR, String::new()), "/tmp");
    }

    #[test]
    fn relative_pick_remembers_the_working_directory() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        dialog.on_file_chosen("site.xml");
        drop(dialog);

        let cwd = std::env::current_dir().expect("cwd");
        assert_eq!(
            settings.get(keys::DEFAULT_DIR, String::new()),
            cwd.to_string_lossy()
        );
    }

    #[test]
    fn picker_opens_in_last_used_directory() {
        let mut settings = MemorySettings::new();
        settings.set(keys::DEFAULT_DIR, "/data/calib").unwrap();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let mut picker = ScriptedPicker::new("");
        dialog.add_file(&mut picker);
        assert_eq!(picker.seen_dir.as_deref(), Some("/data/calib"));
    }

    #[test]
    fn remove_protects_built_ins_and_persists_user_removal() {
        let mut settings = MemorySettings::new();
        settings
            .set(keys::FILES, vec!["/u/a.xml".to_string(), "/u/b.xml".to_string()])
            .unwrap();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);

        dialog.on_row_changed(2);
        assert!(dialog.on_remove_clicked().is_empty());
        assert_eq!(dialog.catalog().len(), 5);

        dialog.on_row_changed(4);
        let effects = dialog.on_remove_clicked();
        assert_eq!(effects[0], UiEffect::RemoveRow(4));
        assert_eq!(effects[1], UiEffect::SelectRow(3));
        assert_eq!(dialog.calibration_files(), vec!["/u/a.xml".to_string()]);

        dialog.on_remove_clicked();
        assert_eq!(dialog.state().current_row, 2);
        assert!(dialog.calibration_files().is_empty());
        assert!(dialog.on_remove_clicked().is_empty());
    }

    #[test]
    fn advanced_toggle_drives_all_groups() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let effects = dialog.on_advanced_toggled(true);
        assert_eq!(effects.len(), 4);
        assert!(effects.iter().all(|e| matches!(e, UiEffect::SetVisible(_, true))));
        assert!(dialog.state().advanced_visible);
    }

    #[test]
    fn forwarding_toggle_enables_forwarding_fields() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        let effects = dialog.on_forwarding_toggled(true);
        assert_eq!(
            effects,
            vec![
                UiEffect::SetEnabled(Widget::LidarForwardingPort, true),
                UiEffect::SetEnabled(Widget::GpsForwardingPort, true),
                UiEffect::SetEnabled(Widget::ForwardIpAddress, true),
            ]
        );
    }

    #[test]
    fn clear_advanced_resets_ports_but_keeps_catalog() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        dialog.on_file_chosen("/tmp/foo.xml");
        dialog.network_mut().set_lidar_port(5000);
        dialog.network_mut().set_gps_port(5001);
        dialog.on_forwarding_toggled(true);
        dialog.on_advanced_toggled(true);
        dialog.set_sensor_pose(Pose::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0));

        dialog.on_clear_advanced();

        let cfg = dialog.config();
        assert_eq!(cfg.lidar_port(), 2368);
        assert_eq!(cfg.gps_port(), 8308);
        assert!(!cfg.is_forwarding());
        assert_eq!(*cfg.sensor_pose(), Pose::default());
        assert_eq!(dialog.catalog().len(), 4);
        assert_eq!(dialog.selected_calibration_file(), "/tmp/foo.xml");
    }

    #[test]
    fn reject_discards_edits_but_keeps_catalog_changes() {
        let mut settings = MemorySettings::new();
        let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        dialog.set_gps_pose(Pose::new(9.0, 9.0, 9.0, 9.0, 9.0, 9.0));
        dialog.on_file_chosen("/tmp/foo.xml");
        dialog.reject();

        assert_eq!(dialog.state().gps_pose, Pose::default());
        assert_eq!(dialog.catalog().len(), 4);
        assert_eq!(dialog.state().current_row, 0);
        assert_eq!(dialog.outcome(), Some(DialogOutcome::Rejected));
        drop(dialog);
        assert!(!settings.contains(keys::GPS_POSE.yaw));
    }

    #[test]
    fn accept_persists_and_next_dialog_restores() {
        let mut settings = MemorySettings::new();
        {
            let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
            dialog.on_row_changed(2);
            dialog.set_sensor_pose(Pose::new(0.5, -0.25, 1.75, 30.0, -2.0, 0.125));
            dialog.on_forwarding_toggled(true);
            dialog.network_mut().forward_ip_address = "10.0.0.9".into();
            let cfg = dialog.accept();
            assert_eq!(cfg.selected_calibration_file(), "/share/VLP-16.xml");
        }
        let dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        assert_eq!(dialog.state().current_row, 2);
        assert_eq!(dialog.state().sensor_pose, Pose::new(0.5, -0.25, 1.75, 30.0, -2.0, 0.125));
        assert!(dialog.state().network.forwarding_enabled);
        assert_eq!(dialog.state().network.forward_ip_address, "10.0.0.9");
    }

    #[test]
    fn geometry_is_written_once_on_close() {
        let mut settings = MemorySettings::new();
        {
            let mut dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
            dialog.set_geometry(vec![1, 2, 3]);
            dialog.close();
            dialog.set_geometry(vec![7, 7]);
        }
        assert_eq!(settings.get(keys::GEOMETRY, Vec::<u8>::new()), vec![1, 2, 3]);

        let dialog = CalibrationDialog::new(&mut settings, BUILT_INS);
        assert_eq!(dialog.state().geometry, vec![1, 2, 3]);
    }
}
