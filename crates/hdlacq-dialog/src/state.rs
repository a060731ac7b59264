//! [`DialogState`] – everything the calibration dialog displays.

use hdlacq_types::{NetworkConfig, Pose};

use crate::catalog::CalibrationCatalog;

/// Plain UI state, independent of any widget toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct DialogState {
    pub catalog: CalibrationCatalog,
    /// Selected catalog row.  Kept in range by the dialog.
    pub current_row: usize,
    pub sensor_pose: Pose,
    pub gps_pose: Pose,
    pub network: NetworkConfig,
    /// Whether the pose and network groups are shown.
    pub advanced_visible: bool,
    /// Opaque window geometry owned by the front-end.
    pub geometry: Vec<u8>,
}

impl DialogState {
    /// State with default advanced settings and the live-corrections row
    /// selected.
    pub fn new(catalog: CalibrationCatalog) -> Self {
        let mut state = Self {
            catalog,
            current_row: 0,
            sensor_pose: Pose::default(),
            gps_pose: Pose::default(),
            network: NetworkConfig::default(),
            advanced_visible: false,
            geometry: Vec::new(),
        };
        state.reset_advanced();
        state
    }

    /// Reset poses, network and the advanced toggle to their defaults.
    ///
    /// The catalog and the selected row are left alone.
    pub fn reset_advanced(&mut self) {
        self.sensor_pose = Pose::default();
        self.gps_pose = Pose::default();
        self.network = NetworkConfig::default();
        self.advanced_visible = false;
    }

    /// Path of the selected row (`""` for live corrections).
    pub fn selected_calibration_file(&self) -> &str {
        self.catalog.selected_path(self.current_row).unwrap_or("")
    }

    /// Clamp `current_row` into the catalog, falling back to row 0.
    pub(crate) fn clamp_current_row(&mut self) -> bool {
        if self.current_row < self.catalog.len() {
            return false;
        }
        self.current_row = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlacq_types::{DEFAULT_GPS_PORT, DEFAULT_LIDAR_PORT};

    #[test]
    fn reset_keeps_catalog_and_row() {
        let mut state = DialogState::new(CalibrationCatalog::new(["/s/HDL-32.xml"], ["/u/a.xml"]));
        state.current_row = 2;
        state.sensor_pose.yaw = 45.0;
        state.network.set_lidar_port(5000);
        state.advanced_visible = true;

        state.reset_advanced();

        assert_eq!(state.current_row, 2);
        assert_eq!(state.catalog.len(), 3);
        assert_eq!(state.sensor_pose, Pose::default());
        assert_eq!(state.network.lidar_port(), DEFAULT_LIDAR_PORT);
        assert_eq!(state.network.gps_port(), DEFAULT_GPS_PORT);
        assert!(!state.advanced_visible);
    }

    #[test]
    fn out_of_range_row_is_clamped_to_live() {
        let mut state = DialogState::new(CalibrationCatalog::default());
        state.current_row = 7;
        assert!(state.clamp_current_row());
        assert_eq!(state.current_row, 0);
        assert_eq!(state.selected_calibration_file(), "");
    }
}
