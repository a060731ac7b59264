//! Settings keys.
//!
//! Key names are shared with installations already in the field; renaming
//! any of them silently drops that user's saved configuration.

/// Full key of a dialog setting.
macro_rules! dialog_key {
    ($suffix:literal) => {
        concat!("VelodyneHDLPlugin/CalibrationFileDialog/", $suffix)
    };
}

pub const CURRENT_ROW: &str = dialog_key!("CurrentRow");
pub const FILES: &str = dialog_key!("Files");
pub const GEOMETRY: &str = dialog_key!("Geometry");

pub const LIDAR_PORT: &str = dialog_key!("LidarPort");
pub const GPS_PORT: &str = dialog_key!("GpsPort");
pub const LIDAR_FORWARDING_PORT: &str = dialog_key!("LidarForwardingPort");
pub const GPS_FORWARDING_PORT: &str = dialog_key!("GpsForwardingPort");
pub const ENABLE_FORWARDING: &str = dialog_key!("EnableForwarding");
pub const FORWARD_IP_ADDRESS: &str = dialog_key!("ForwardIpAddress");
pub const ADVANCED_CONFIGURATION: &str = dialog_key!("AdvancedConfiguration");

/// Last directory the calibration file picker was opened in.
pub const DEFAULT_DIR: &str = "VelodyneHDLPlugin/OpenData/DefaultDir";

/// Keys for the six fields of one pose.
#[derive(Debug, Clone, Copy)]
pub struct PoseKeys {
    pub origin_x: &'static str,
    pub origin_y: &'static str,
    pub origin_z: &'static str,
    pub yaw: &'static str,
    pub pitch: &'static str,
    pub roll: &'static str,
}

pub const SENSOR_POSE: PoseKeys = PoseKeys {
    origin_x: dialog_key!("LidarOriginX"),
    origin_y: dialog_key!("LidarOriginY"),
    origin_z: dialog_key!("LidarOriginZ"),
    yaw: dialog_key!("LidarYaw"),
    pitch: dialog_key!("LidarPitch"),
    roll: dialog_key!("LidarRoll"),
};

pub const GPS_POSE: PoseKeys = PoseKeys {
    origin_x: dialog_key!("GpsOriginX"),
    origin_y: dialog_key!("GpsOriginY"),
    origin_z: dialog_key!("GpsOriginZ"),
    yaw: dialog_key!("GpsYaw"),
    pitch: dialog_key!("GpsPitch"),
    roll: dialog_key!("GpsRoll"),
};

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(k: &PoseKeys) -> [&'static str; 6] {
        [k.origin_x, k.origin_y, k.origin_z, k.yaw, k.pitch, k.roll]
    }

    #[test]
    fn keys_share_the_dialog_prefix() {
        let prefix = dialog_key!("");
        for key in fields(&SENSOR_POSE).into_iter().chain(fields(&GPS_POSE)) {
            assert!(key.starts_with(prefix), "{key}");
        }
        assert_eq!(LIDAR_PORT, "VelodyneHDLPlugin/CalibrationFileDialog/LidarPort");
        assert!(!DEFAULT_DIR.starts_with(prefix));
    }

    #[test]
    fn sensor_and_gps_keys_are_distinct() {
        let sensor = fields(&SENSOR_POSE);
        for key in fields(&GPS_POSE) {
            assert!(!sensor.contains(&key));
        }
    }
}
