// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use depthview::Config;

#[test]
fn test_config_default() {
    // Test that default config carries the documented values
    let config = Config::default();

    assert_eq!(config.preview_width, 256);
    assert_eq!(config.preview_height, 256);
    assert_eq!(config.fps, 40);
    assert_eq!(config.mask_threshold, 120);
}

#[test]
fn test_config_json_round_trip() {
    let config = Config {
        fps: 30,
        mask_threshold: 100,
        ..Config::default()
    };

    let json = serde_json::to_string(&config).expect("serialize");
    let restored: Config = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, config);
}

#[test]
fn test_config_fills_missing_fields_with_defaults() {
    // Older config files may not carry every field
    let restored: Config = serde_json::from_str(r#"{"fps": 25}"#).expect("deserialize");
    assert_eq!(restored.fps, 25);
    assert_eq!(restored.mask_threshold, 120);
}

#[test]
fn test_device_config_mirrors_settings() {
    let config = Config {
        preview_width: 128,
        preview_height: 128,
        fps: 20,
        ..Config::default()
    };
    let device = config.device_config();
    assert_eq!(device.preview_width, 128);
    assert_eq!(device.preview_height, 128);
    assert_eq!(device.fps, 20);
}
