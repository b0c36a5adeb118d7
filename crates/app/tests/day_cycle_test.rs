//! A whole day in the hamlet, driven headlessly.

use std::fs;

use hamlet_app::{Hamlet, HamletConfig, PlayerInput, TextureUnits};
use hamlet_rhi::HeadlessDevice;
use rand::SeedableRng;
use rand::rngs::StdRng;

const UNITS: TextureUnits = TextureUnits {
    roof1: 0,
    roof2: 1,
    wood1: 2,
    ground: 3,
    wall: 4,
    debug: 5,
};

fn write_config(name: &str, text: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("hamlet-{}-{}.json", name, std::process::id()));
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_config_file_overrides_defaults() {
    let path = write_config("override", r#"{ "seconds_per_day": 24, "start_time_of_day": 0.0 }"#);
    let loaded = HamletConfig::load(Some(&path));
    fs::remove_file(&path).unwrap();

    let loaded = loaded.unwrap();
    assert_eq!(loaded.seconds_per_day, 24.0);
    assert_eq!(loaded.start_time_of_day, Some(0.0));
    assert_eq!(loaded.max_stars, 100);
}

#[test]
fn test_config_file_validated() {
    // The stock keyframes ask for 100 stars, more than this file allows.
    let path = write_config("few-stars", r#"{ "max_stars": 40 }"#);
    let loaded = HamletConfig::load(Some(&path));
    fs::remove_file(&path).unwrap();
    assert!(loaded.is_err());

    let path = write_config("broken", "{ not json");
    let loaded = HamletConfig::load(Some(&path));
    fs::remove_file(&path).unwrap();
    assert!(loaded.is_err());
}

#[test]
fn test_missing_config_file_is_an_error() {
    let path = std::env::temp_dir().join("hamlet-config-does-not-exist.json");
    assert!(HamletConfig::load(Some(&path)).is_err());
}

#[test]
fn test_full_day() {
    let config = HamletConfig {
        seconds_per_day: 24.0,
        start_time_of_day: Some(0.0),
        ..HamletConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(2024);
    let mut hamlet = Hamlet::new(HeadlessDevice::new(), &config, UNITS, &mut rng).unwrap();
    let base = hamlet.scene().renderers().len() - config.max_stars as usize;

    let mut fewest_stars = usize::MAX;
    let mut brightest = 0.0f32;
    // One simulated hour per frame.
    for _ in 0..24 {
        hamlet.scene_mut().device_mut().clear();
        let drawn = hamlet.tick(1.0, &PlayerInput::default()).unwrap();

        let stars = hamlet.town().starfield.active_count();
        assert_eq!(drawn, base + stars);
        fewest_stars = fewest_stars.min(stars);
        brightest = brightest.max(hamlet.sky_color().z);
    }

    assert_eq!(fewest_stars, 0);
    assert!((brightest - 1.0).abs() < 1e-5);
    assert!(hamlet.time().time_of_day() < 1e-3 || hamlet.time().time_of_day() > 0.999);
}
