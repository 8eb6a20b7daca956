//! Tests for loading and saving tracker configuration files

use ball_table_tracker::{
    color_range::HsvBound,
    config::{Config, Setpoint, EXAMPLE_CONFIG},
    orientation::{CameraFacing, DisplayRotation},
    processor::FrameProcessor,
    Error,
};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ball-table-tracker-{}-{name}.yaml", std::process::id()))
}

#[test]
fn test_config_file_round_trip() {
    let path = temp_path("round-trip");

    let mut config = Config::default();
    config.camera.facing = CameraFacing::Front;
    config.camera.rotation = DisplayRotation::Rotation180;
    config.colors.ball_lower = HsvBound::from_rgb(0x00FF_8000);
    config.tracking.position_filter = 0.75;
    config.tracking.ball_setpoint = Setpoint { x: 1200, y: 1900 };
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.camera.facing, CameraFacing::Front);
    assert_eq!(loaded.camera.rotation, DisplayRotation::Rotation180);
    assert_eq!(loaded.colors.ball_lower, config.colors.ball_lower);
    assert_eq!(loaded.tracking.position_filter, 0.75);
    assert_eq!(loaded.tracking.ball_setpoint, Setpoint { x: 1200, y: 1900 });
    assert_eq!(loaded.colors.ball_range(), config.colors.ball_range());
}

#[test]
fn test_example_config_builds_processor() {
    let path = temp_path("example");
    std::fs::write(&path, EXAMPLE_CONFIG).unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let processor = FrameProcessor::new(&config).unwrap();
    assert!(processor.ball_range().inverted);
    assert!(!processor.table_range().inverted);
}

#[test]
fn test_missing_file() {
    let result = Config::from_file(temp_path("does-not-exist"));
    assert!(matches!(result, Err(Error::IoError(_))));
}

#[test]
fn test_malformed_file() {
    let path = temp_path("malformed");
    std::fs::write(&path, "tracking: [not, a, map").unwrap();

    let result = Config::from_file(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(Error::ConfigError(_))));
}

#[test]
fn test_invalid_values_rejected_by_processor() {
    let mut config = Config::default();
    config.tracking.max_ball_area_divisor = 0.0;
    assert!(matches!(FrameProcessor::new(&config), Err(Error::ConfigError(_))));
}

#[test]
fn test_packed_rgb_colors_in_file() {
    let path = temp_path("packed");
    std::fs::write(
        &path,
        "colors:\n  ball_lower: 0xFF0000\n  ball_upper: { hue: 20.0, saturation: 1.0, value: 1.0 }\n",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.colors.ball_lower, HsvBound::from_rgb(0xFF0000));
    config.validate().unwrap();
}
