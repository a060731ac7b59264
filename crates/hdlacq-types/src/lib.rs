use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ports between 0 and 1023 are reserved.
pub const MIN_ALLOWED_PORT: u16 = 1024;
/// Default UDP port the sensor streams lidar packets to.
pub const DEFAULT_LIDAR_PORT: u16 = 2368;
/// Default UDP port the sensor streams GPS/position packets to.
pub const DEFAULT_GPS_PORT: u16 = 8308;
/// Default destination for forwarded packets (local host).
pub const DEFAULT_FORWARD_IP: &str = "127.0.0.1";

/// Label of the live-corrections sentinel entry.
pub const LIVE_CORRECTIONS_LABEL: &str = "HDL64 Live Corrections";
const LIVE_CORRECTIONS_TOOLTIP: &str = "Get Corrections from the data stream";

/// Rigid-body mounting of a sensor: origin plus yaw/pitch/roll in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub origin_x: f64,
    pub origin_y: f64,
    pub origin_z: f64,
    /// Rotation about Z, degrees.
    pub yaw: f64,
    /// Rotation about Y, degrees.
    pub pitch: f64,
    /// Rotation about X, degrees.
    pub roll: f64,
}

impl Pose {
    pub fn new(origin_x: f64, origin_y: f64, origin_z: f64, yaw: f64, pitch: f64, roll: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            origin_z,
            yaw,
            pitch,
            roll,
        }
    }
}

/// Listening and forwarding configuration for the acquisition sockets.
///
/// All ports are kept at or above [`MIN_ALLOWED_PORT`]; setters clamp rather
/// than reject, so a stale persisted value can never produce a reserved port.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkConfig {
    lidar_port: u16,
    gps_port: u16,
    lidar_forwarding_port: u16,
    gps_forwarding_port: u16,
    pub forwarding_enabled: bool,
    pub forward_ip_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            lidar_port: DEFAULT_LIDAR_PORT,
            gps_port: DEFAULT_GPS_PORT,
            lidar_forwarding_port: DEFAULT_LIDAR_PORT,
            gps_forwarding_port: DEFAULT_GPS_PORT,
            forwarding_enabled: false,
            forward_ip_address: DEFAULT_FORWARD_IP.to_string(),
        }
    }
}

/// Clamp an arbitrary integer into the allowed port range.
pub fn clamp_port(port: i64) -> u16 {
    port.clamp(MIN_ALLOWED_PORT as i64, u16::MAX as i64) as u16
}

impl NetworkConfig {
    pub fn lidar_port(&self) -> u16 {
        self.lidar_port
    }

    pub fn gps_port(&self) -> u16 {
        self.gps_port
    }

    pub fn lidar_forwarding_port(&self) -> u16 {
        self.lidar_forwarding_port
    }

    pub fn gps_forwarding_port(&self) -> u16 {
        self.gps_forwarding_port
    }

    pub fn set_lidar_port(&mut self, port: i64) {
        self.lidar_port = clamp_port(port);
    }

    pub fn set_gps_port(&mut self, port: i64) {
        self.gps_port = clamp_port(port);
    }

    pub fn set_lidar_forwarding_port(&mut self, port: i64) {
        self.lidar_forwarding_port = clamp_port(port);
    }

    pub fn set_gps_forwarding_port(&mut self, port: i64) {
        self.gps_forwarding_port = clamp_port(port);
    }
}

/// One row of the calibration catalog.
///
/// The variant decides removability: only [`CalibrationEntry::User`] rows can
/// ever be removed from a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path")]
pub enum CalibrationEntry {
    /// No static file; corrections are read from the live data stream.
    Live,
    /// Factory-shipped calibration bundled with the install.
    BuiltIn(String),
    /// Calibration file added by the operator.
    User(String),
}

impl CalibrationEntry {
    /// Path associated with the row. Empty for [`CalibrationEntry::Live`].
    pub fn path(&self) -> &str {
        match self {
            CalibrationEntry::Live => "",
            CalibrationEntry::BuiltIn(p) | CalibrationEntry::User(p) => p,
        }
    }

    /// Label shown in the catalog list.
    ///
    /// Built-ins show the base name (everything before the first `.` of the
    /// file name); user files show the full file name.
    pub fn display_name(&self) -> String {
        match self {
            CalibrationEntry::Live => LIVE_CORRECTIONS_LABEL.to_string(),
            CalibrationEntry::BuiltIn(p) => {
                let name = file_name(p);
                name.split('.').next().unwrap_or(name).to_string()
            }
            CalibrationEntry::User(p) => file_name(p).to_string(),
        }
    }

    pub fn tooltip(&self) -> &str {
        match self {
            CalibrationEntry::Live => LIVE_CORRECTIONS_TOOLTIP,
            CalibrationEntry::BuiltIn(p) | CalibrationEntry::User(p) => p,
        }
    }

    pub fn is_removable(&self) -> bool {
        matches!(self, CalibrationEntry::User(_))
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Errors surfaced to consumers of an accepted configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AcqError {
    #[error("Invalid forward IP address: '{0}'")]
    InvalidForwardAddress(String),

    #[error("Settings backend error: {0}")]
    Settings(String),
}
