//! End-to-end dialog sessions against file-backed settings stores.

use hdlacq_dialog::{CalibrationDialog, FilePicker, UiEffect, bridge, built_in_calibration_paths, keys};
use hdlacq_settings::{SettingsExt, SettingsStore, SqliteSettings, TomlSettings};
use hdlacq_transform::Vec3;
use hdlacq_types::Pose;
use std::path::Path;

struct Answer(&'static str);

impl FilePicker for Answer {
    fn pick_file(&mut self, _title: &str, _start_dir: &str, _filter: &str) -> String {
        self.0.to_string()
    }
}

fn built_ins() -> Vec<String> {
    built_in_calibration_paths(Path::new("/opt/hdlacq/share"))
}

fn run_session<S: SettingsStore>(settings: S) {
    let mut dialog = CalibrationDialog::new(settings, built_ins());
    assert_eq!(dialog.catalog().len(), 6);

    let effects = dialog.add_file(&mut Answer("/data/site/custom.xml"));
    assert!(effects.contains(&UiEffect::SelectRow(6)));

    dialog.on_advanced_toggled(true);
    dialog.set_sensor_pose(Pose::new(1.0, 2.0, 3.0, 90.0, 0.0, 0.0));
    dialog.on_forwarding_toggled(true);
    dialog.network_mut().set_lidar_forwarding_port(12368);
    dialog.set_geometry(vec![0xde, 0xad]);

    let cfg = dialog.accept();
    assert_eq!(cfg.selected_calibration_file(), "/data/site/custom.xml");
    let p = cfg.sensor_transform().transform_point(Vec3::new(1.0, 0.0, 0.0));
    assert!((p.x - 1.0).abs() < 1e-9 && (p.y - 3.0).abs() < 1e-9 && (p.z - 3.0).abs() < 1e-9);
    let (lidar, _) = cfg.forward_destinations().expect("valid default address");
    assert_eq!(lidar.port(), 12368);
}

fn check_restored<S: SettingsStore>(settings: S) {
    assert_eq!(settings.get(keys::FILES, Vec::<String>::new()), vec!["/data/site/custom.xml".to_string()]);
    assert_eq!(settings.get(keys::GEOMETRY, Vec::<u8>::new()), vec![0xde, 0xad]);

    let dialog = CalibrationDialog::new(settings, built_ins());
    assert_eq!(dialog.catalog().len(), 7);
    assert_eq!(dialog.selected_calibration_file(), "/data/site/custom.xml");
    assert!(dialog.state().advanced_visible);
    assert_eq!(dialog.state().sensor_pose.yaw, 90.0);
    assert_eq!(dialog.state().network.lidar_forwarding_port(), 12368);
    assert!(dialog.state().network.forwarding_enabled);
}

#[test]
fn toml_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("settings.toml");

    run_session(TomlSettings::open(&path).expect("open"));
    check_restored(TomlSettings::open(&path).expect("reopen"));
}

#[test]
fn sqlite_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("settings.db");
    let path = path.to_string_lossy();

    run_session(SqliteSettings::open(&path).expect("open"));
    check_restored(SqliteSettings::open(&path).expect("reopen"));
}

#[test]
fn clearing_advanced_settings_after_restore_keeps_the_catalog() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("settings.toml");
    run_session(TomlSettings::open(&path).expect("open"));

    let mut dialog = CalibrationDialog::new(TomlSettings::open(&path).expect("reopen"), built_ins());
    dialog.on_clear_advanced();
    let cfg = dialog.accept();
    assert_eq!(cfg.lidar_port(), 2368);
    assert_eq!(cfg.gps_port(), 8308);
    assert_eq!(cfg.lidar_forwarding_port(), 2368);
    assert_eq!(cfg.gps_forwarding_port(), 8308);
    assert_eq!(cfg.ip_address_forwarding(), "127.0.0.1");
    assert!(!cfg.is_forwarding());
    assert_eq!(cfg.calibration_files(), &["/data/site/custom.xml".to_string()]);
    assert_eq!(cfg.selected_calibration_file(), "/data/site/custom.xml");
}

#[test]
fn unbounded_pose_values_roundtrip_through_sqlite() {
    let pose = Pose::new(f64::INFINITY, -0.0, 1e308, f64::NEG_INFINITY, 720.5, -1e-300);
    let mut settings = SqliteSettings::open_in_memory().expect("open");
    bridge::persist_pose(&mut settings, &keys::SENSOR_POSE, &pose).expect("persist");

    let back = bridge::restore_pose(&settings, &keys::SENSOR_POSE, Pose::default());
    for (a, b) in [
        (pose.origin_x, back.origin_x),
        (pose.origin_y, back.origin_y),
        (pose.origin_z, back.origin_z),
        (pose.yaw, back.yaw),
        (pose.pitch, back.pitch),
        (pose.roll, back.roll),
    ] {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}
