//! [`AcquisitionConfig`] – what the rest of the application reads once the
//! dialog has been accepted.

use std::net::{IpAddr, SocketAddr};

use hdlacq_transform::{Matrix4, pose_transform};
use hdlacq_types::{AcqError, NetworkConfig, Pose};
use serde::Serialize;

use crate::state::DialogState;

/// Read-only snapshot of an accepted dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquisitionConfig {
    selected_calibration_file: String,
    calibration_files: Vec<String>,
    sensor_pose: Pose,
    gps_pose: Pose,
    network: NetworkConfig,
}

impl AcquisitionConfig {
    pub(crate) fn from_state(state: &DialogState) -> Self {
        Self {
            selected_calibration_file: state.selected_calibration_file().to_string(),
            calibration_files: state.catalog.user_paths(),
            sensor_pose: state.sensor_pose,
            gps_pose: state.gps_pose,
            network: state.network.clone(),
        }
    }

    /// Selected calibration path; empty means "live corrections".
    pub fn selected_calibration_file(&self) -> &str {
        &self.selected_calibration_file
    }

    pub fn uses_live_corrections(&self) -> bool {
        self.selected_calibration_file.is_empty()
    }

    /// Operator-added calibration files.
    pub fn calibration_files(&self) -> &[String] {
        &self.calibration_files
    }

    pub fn sensor_pose(&self) -> &Pose {
        &self.sensor_pose
    }

    pub fn gps_pose(&self) -> &Pose {
        &self.gps_pose
    }

    /// `Y = T · Rz(yaw) · Ry(pitch) · Rx(roll) · X` for the lidar mounting.
    pub fn sensor_transform(&self) -> Matrix4 {
        pose_transform(&self.sensor_pose)
    }

    /// Same composition for the GPS antenna mounting.
    pub fn gps_transform(&self) -> Matrix4 {
        pose_transform(&self.gps_pose)
    }

    pub fn gps_yaw(&self) -> f64 {
        self.gps_pose.yaw
    }

    pub fn gps_roll(&self) -> f64 {
        self.gps_pose.roll
    }

    pub fn gps_pitch(&self) -> f64 {
        self.gps_pose.pitch
    }

    pub fn lidar_port(&self) -> u16 {
        self.network.lidar_port()
    }

    pub fn gps_port(&self) -> u16 {
        self.network.gps_port()
    }

    pub fn lidar_forwarding_port(&self) -> u16 {
        self.network.lidar_forwarding_port()
    }

    pub fn gps_forwarding_port(&self) -> u16 {
        self.network.gps_forwarding_port()
    }

    pub fn is_forwarding(&self) -> bool {
        self.network.forwarding_enabled
    }

    pub fn ip_address_forwarding(&self) -> &str {
        &self.network.forward_ip_address
    }

    /// Lidar and GPS forwarding destinations.
    ///
    /// Fails when the forward IP address does not parse, whether or not
    /// forwarding is enabled.
    pub fn forward_destinations(&self) -> Result<(SocketAddr, SocketAddr), AcqError> {
        let raw = self.network.forward_ip_address.trim();
        let ip: IpAddr = raw
            .parse()
            .map_err(|_| AcqError::InvalidForwardAddress(raw.to_string()))?;
        Ok((
            SocketAddr::new(ip, self.network.lidar_forwarding_port()),
            SocketAddr::new(ip, self.network.gps_forwarding_port()),
        ))
    }
}
