//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use geoscene::config::{StartMode, ViewerConfig};
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("GEOSCENE_WINDOW__TITLE", "Test From Env");
    let config = ViewerConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("GEOSCENE_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_env_overrides_scene_mode() {
    std::env::set_var("GEOSCENE_SCENE__MODE", "2d");
    std::env::set_var("GEOSCENE_SCENE__SHADER_EVICTION_INTERVAL", "60");
    let config = ViewerConfig::load().unwrap();
    std::env::remove_var("GEOSCENE_SCENE__MODE");
    std::env::remove_var("GEOSCENE_SCENE__SHADER_EVICTION_INTERVAL");

    assert_eq!(config.scene.mode, StartMode::Scene2D);
    assert_eq!(config.scene.shader_eviction_interval, 60);
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("GEOSCENE_WINDOW__TITLE");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = ViewerConfig::load().unwrap();
    assert_eq!(config.scene.parameter_step, 0.05);
    assert_eq!(config.rendering.clear_color, [0.0, 0.0, 0.0, 1.0]);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = ViewerConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.scene.mode, StartMode::Scene3D);
}

#[test]
#[serial]
fn test_bad_value_is_an_error() {
    std::env::set_var("GEOSCENE_SCENE__MODE", "sideways");
    let result = ViewerConfig::load();
    std::env::remove_var("GEOSCENE_SCENE__MODE");

    let err = result.unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
