//! Settings bridge: moves [`DialogState`] to and from a [`SettingsStore`].
//!
//! Every field is restored on its own, using the value already in the state
//! as the fallback, so a missing or malformed key never disturbs its
//! neighbours.

use hdlacq_settings::{SettingsError, SettingsExt, SettingsStore};
use hdlacq_types::{NetworkConfig, Pose};
use tracing::{debug, warn};

use crate::keys::{self, PoseKeys};
use crate::state::DialogState;

// ─────────────────────────────────────────────────────────────────────────────
// Restore
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted operator-added calibration paths.
pub fn load_file_list<S: SettingsStore + ?Sized>(settings: &S) -> Vec<String> {
    settings.get(keys::FILES, Vec::new())
}

pub fn restore_pose<S: SettingsStore + ?Sized>(settings: &S, keys: &PoseKeys, current: Pose) -> Pose {
    Pose {
        origin_x: settings.get(keys.origin_x, current.origin_x),
        origin_y: settings.get(keys.origin_y, current.origin_y),
        origin_z: settings.get(keys.origin_z, current.origin_z),
        yaw: settings.get(keys.yaw, current.yaw),
        pitch: settings.get(keys.pitch, current.pitch),
        roll: settings.get(keys.roll, current.roll),
    }
}

pub fn restore_network<S: SettingsStore + ?Sized>(settings: &S, net: &mut NetworkConfig) {
    net.set_lidar_port(settings.get(keys::LIDAR_PORT, net.lidar_port() as i64));
    net.set_gps_port(settings.get(keys::GPS_PORT, net.gps_port() as i64));
    net.set_lidar_forwarding_port(
        settings.get(keys::LIDAR_FORWARDING_PORT, net.lidar_forwarding_port() as i64),
    );
    net.set_gps_forwarding_port(
        settings.get(keys::GPS_FORWARDING_PORT, net.gps_forwarding_port() as i64),
    );
    net.forwarding_enabled = settings.get(keys::ENABLE_FORWARDING, net.forwarding_enabled);
    net.forward_ip_address = settings.get(keys::FORWARD_IP_ADDRESS, net.forward_ip_address.clone());
}

/// Restore the selected row, poses, network, advanced flag and geometry.
///
/// The catalog itself is built before this is called.
pub fn restore<S: SettingsStore + ?Sized>(state: &mut DialogState, settings: &S) {
    let row: i64 = settings.get(keys::CURRENT_ROW, state.current_row as i64);
    state.current_row = usize::try_from(row).unwrap_or(usize::MAX);
    if state.clamp_current_row() {
        warn!(row, rows = state.catalog.len(), "Saved calibration row out of range, selecting live corrections");
    }

    state.sensor_pose = restore_pose(settings, &keys::SENSOR_POSE, state.sensor_pose);
    state.gps_pose = restore_pose(settings, &keys::GPS_POSE, state.gps_pose);
    restore_network(settings, &mut state.network);
    state.advanced_visible = settings.get(keys::ADVANCED_CONFIGURATION, state.advanced_visible);
    state.geometry = settings.get(keys::GEOMETRY, std::mem::take(&mut state.geometry));

    debug!(row = state.current_row, "Dialog state restored from settings");
}

// ─────────────────────────────────────────────────────────────────────────────
// Persist
// ─────────────────────────────────────────────────────────────────────────────

pub fn persist_pose<S: SettingsStore + ?Sized>(
    settings: &mut S,
    keys: &PoseKeys,
    pose: &Pose,
) -> Result<(), SettingsError> {
    settings.set(keys.origin_x, pose.origin_x)?;
    settings.set(keys.origin_y, pose.origin_y)?;
    settings.set(keys.origin_z, pose.origin_z)?;
    settings.set(keys.yaw, pose.yaw)?;
    settings.set(keys.pitch, pose.pitch)?;
    settings.set(keys.roll, pose.roll)?;
    Ok(())
}

pub fn persist_network<S: SettingsStore + ?Sized>(
    settings: &mut S,
    net: &NetworkConfig,
) -> Result<(), SettingsError> {
    settings.set(keys::LIDAR_PORT, net.lidar_port())?;
    settings.set(keys::GPS_PORT, net.gps_port())?;
    settings.set(keys::LIDAR_FORWARDING_PORT, net.lidar_forwarding_port())?;
    settings.set(keys::GPS_FORWARDING_PORT, net.gps_forwarding_port())?;
    settings.set(keys::ENABLE_FORWARDING, net.forwarding_enabled)?;
    settings.set(keys::FORWARD_IP_ADDRESS, net.forward_ip_address.as_str())?;
    Ok(())
}

/// Persist the operator-added paths (never the sentinel or built-ins).
pub fn persist_file_list<S: SettingsStore + ?Sized>(
    settings: &mut S,
    state: &DialogState,
) -> Result<(), SettingsError> {
    settings.set(keys::FILES, state.catalog.user_paths())
}

pub fn persist_geometry<S: SettingsStore + ?Sized>(
    settings: &mut S,
    state: &DialogState,
) -> Result<(), SettingsError> {
    settings.set(keys::GEOMETRY, state.geometry.clone())
}

/// Persist everything [`restore`] reads except the geometry, which is
/// written when the dialog closes.
pub fn persist<S: SettingsStore + ?Sized>(
    settings: &mut S,
    state: &DialogState,
) -> Result<(), SettingsError> {
    settings.set(keys::CURRENT_ROW, state.current_row)?;
    persist_pose(settings, &keys::SENSOR_POSE, &state.sensor_pose)?;
    persist_pose(settings, &keys::GPS_POSE, &state.gps_pose)?;
    persist_network(settings, &state.network)?;
    settings.set(keys::ADVANCED_CONFIGURATION, state.advanced_visible)?;
    Ok(())
}
