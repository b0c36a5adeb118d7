//! Demo configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all)
//! runs the stock hamlet. A config file only needs the fields it changes:
//!
//! ```json
//! { "seconds_per_day": 30, "frames": 1200, "seed": 7 }
//! ```

use std::path::{Path, PathBuf};

use glam::Vec3;
use hamlet_core::{Error, Result};
use serde::Deserialize;

/// Upper bound on simultaneously visible stars.
pub const MAX_STARS: u32 = 100;

/// One keyframe of the day/night cycle.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TimeState {
    /// Human-readable name, for logs.
    pub label: String,
    /// Position in the day, `0.0..=1.0`.
    pub time_of_day: f32,
    /// Direction toward the sun or moon.
    pub light_pos: Vec3,
    pub light_color: Vec3,
    pub ambient_light_color: Vec3,
    /// Clear color behind the scene.
    pub sky_color: Vec3,
    pub num_stars: u32,
}

impl TimeState {
    fn new(
        label: &str,
        hour: f32,
        light_pos: [f32; 3],
        light_color: [f32; 3],
        ambient_light_color: [f32; 3],
        sky_color: [f32; 3],
        num_stars: u32,
    ) -> Self {
        Self {
            label: label.to_string(),
            time_of_day: hour / 24.0,
            light_pos: Vec3::from(light_pos),
            light_color: Vec3::from(light_color),
            ambient_light_color: Vec3::from(ambient_light_color),
            sky_color: Vec3::from(sky_color),
            num_stars,
        }
    }
}

/// The stock day: starry night, blue dawn, warm noon, pink sunset.
pub fn default_time_states() -> Vec<TimeState> {
    let night_light = [0.26, 0.62, 0.73];
    let night_sky = [0.06, 0.12, 0.5];
    let day_sky = [0.65, 0.85, 1.0];
    let dawn_stars = MAX_STARS / 5;
    let dusk_stars = MAX_STARS / 10;

    vec![
        TimeState::new("midnight", 0.0, [0.0, 100.0, 0.0], [0.26, 0.62, 0.8], [0.2, 0.2, 0.45], night_sky, MAX_STARS),
        TimeState::new("stars down", 4.0, [0.0, 100.0, 0.0], night_light, [0.2, 0.2, 0.4], night_sky, MAX_STARS),
        TimeState::new("dawn begins", 6.0, [100.0, 100.0, 0.0], [0.42, 0.62, 0.73], [0.3, 0.3, 0.3], [0.12, 0.24, 0.7], dawn_stars),
        TimeState::new("dawn ends", 9.0, [90.0, 100.0, 10.0], [0.6, 0.6, 0.4], [0.35, 0.3, 0.3], day_sky, 0),
        TimeState::new("noon", 12.0, [0.0, 100.0, -100.0], [0.65, 0.65, 0.55], [0.6, 0.6, 0.5], day_sky, 0),
        TimeState::new("sunset begins", 16.0, [-90.0, 100.0, 10.0], [0.55, 0.55, 0.45], [0.4, 0.3, 0.3], [0.95, 0.75, 1.0], 0),
        TimeState::new("sunset ends", 19.0, [-100.0, 100.0, 0.0], night_light, [0.3, 0.3, 0.5], [0.06, 0.12, 0.7], dusk_stars),
        TimeState::new("stars up", 20.0, [0.0, 100.0, 0.0], night_light, [0.2, 0.2, 0.4], night_sky, MAX_STARS),
        TimeState::new("midnight", 24.0, [0.0, 100.0, 0.0], [0.26, 0.62, 0.8], [0.2, 0.2, 0.45], night_sky, MAX_STARS),
    ]
}

/// Perspective settings for the player camera.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 90.0,
            aspect: 4.0 / 3.0,
            near: 0.5,
            far: 1000.0,
        }
    }
}

/// Top-level demo configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HamletConfig {
    /// Real seconds for one full day at multiplier 1.
    pub seconds_per_day: f32,
    /// Speed-up applied to the day cycle.
    pub time_multiply: f32,
    /// Starting time of day; random when absent.
    pub start_time_of_day: Option<f32>,
    pub max_stars: u32,
    pub camera: CameraConfig,
    /// Frames to run before exiting.
    pub frames: u64,
    /// Simulated seconds per frame.
    pub frame_delta: f32,
    /// RNG seed for town layout; random when absent.
    pub seed: Option<u64>,
    /// Directory holding the texture images. Solid colors are used when absent.
    pub texture_dir: Option<PathBuf>,
    /// Seconds to wait for textures before giving up.
    pub texture_timeout_secs: f32,
    pub time_states: Vec<TimeState>,
}

impl Default for HamletConfig {
    fn default() -> Self {
        Self {
            seconds_per_day: 120.0,
            time_multiply: 1.0,
            start_time_of_day: None,
            max_stars: MAX_STARS,
            camera: CameraConfig::default(),
            frames: 600,
            frame_delta: 1.0 / 60.0,
            seed: None,
            texture_dir: None,
            texture_timeout_secs: 10.0,
            time_states: default_time_states(),
        }
    }
}

impl HamletConfig {
    /// Loads `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = match path {
            Some(path) => hamlet_core::config::load_json(path)?,
            None => Self::default(),
        };
        config.validate(path.unwrap_or(Path::new("<defaults>")))?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let fail = |message: &str| Error::Config {
            path: origin.to_path_buf(),
            message: message.to_string(),
        };

        if !(self.seconds_per_day > 0.0) {
            return Err(fail("seconds_per_day must be positive"));
        }
        if self.frame_delta < 0.0 {
            return Err(fail("frame_delta must not be negative"));
        }
        if !(self.texture_timeout_secs.is_finite() && self.texture_timeout_secs >= 0.0) {
            return Err(fail("texture_timeout_secs must be a non-negative number"));
        }
        if self.time_states.is_empty() {
            return Err(fail("time_states must not be empty"));
        }
        if self
            .time_states
            .windows(2)
            .any(|pair| pair[0].time_of_day > pair[1].time_of_day)
        {
            return Err(fail("time_states must be sorted by time_of_day"));
        }
        if let Some(start) = self.start_time_of_day
            && !(0.0..1.0).contains(&start)
        {
            return Err(fail("start_time_of_day must be in [0, 1)"));
        }
        if let Some(state) = self.time_states.iter().find(|s| s.num_stars > self.max_stars) {
            return Err(fail(&format!(
                "time state '{}' wants {} stars but max_stars is {}",
                state.label, state.num_stars, self.max_stars
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<HamletConfig> {
        let origin = Path::new("<inline>");
        let config: HamletConfig = hamlet_core::config::from_json_str(text, origin)?;
        config.validate(origin)?;
        Ok(config)
    }

    #[test]
    fn test_empty_object_is_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config, HamletConfig::default());
        assert_eq!(config.time_states.len(), 9);
    }

    #[test]
    fn test_partial_override() {
        let config =
            parse(r#"{ "seconds_per_day": 30, "seed": 7, "camera": { "fov": 60 } }"#).unwrap();
        assert_eq!(config.seconds_per_day, 30.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.camera.fov, 60.0);
        assert_eq!(config.camera.far, 1000.0);
    }

    #[test]
    fn test_custom_time_states() {
        let config = parse(
            r#"{
                "time_states": [
                    { "label": "a", "time_of_day": 0.0, "light_pos": [0, 1, 0],
                      "light_color": [1, 1, 1], "ambient_light_color": [0, 0, 0],
                      "sky_color": [0, 0, 0], "num_stars": 0 },
                    { "label": "b", "time_of_day": 1.0, "light_pos": [1, 0, 0],
                      "light_color": [0, 0, 0], "ambient_light_color": [1, 1, 1],
                      "sky_color": [1, 1, 1], "num_stars": 10 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.time_states[1].light_pos, Vec3::X);
    }

    #[test]
    fn test_rejects_unsorted_states() {
        let mut states = default_time_states();
        states.swap(1, 2);
        let config = HamletConfig {
            time_states: states,
            ..HamletConfig::default()
        };
        assert!(config.validate(Path::new("test")).is_err());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(r#"{ "seconds_per_day": 0 }"#).is_err());
        assert!(parse(r#"{ "start_time_of_day": 1.5 }"#).is_err());
        assert!(parse(r#"{ "max_stars": 10 }"#).is_err());
        assert!(parse(r#"{ "time_states": [] }"#).is_err());
        assert!(parse(r#"{ "texture_timeout_secs": -1 }"#).is_err());
    }

    #[test]
    fn test_default_table_matches_day() {
        let states = default_time_states();
        assert_eq!(states.first().unwrap().time_of_day, 0.0);
        assert_eq!(states.last().unwrap().time_of_day, 1.0);
        assert_eq!(states[2].num_stars, 20);
        assert_eq!(states[6].num_stars, 10);
    }
}
