//! Day/night cycle.
//!
//! Time runs in `[0, 1)` and is mapped onto a keyframe table. Sampling blends
//! the two keyframes around the current time.

use glam::Vec3;
use hamlet_core::mathx::{inverse_lerp, lerp, lerp_vec3};

use crate::config::{HamletConfig, TimeState};

/// Lighting for one moment of the day.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSample {
    pub light_pos: Vec3,
    pub light_color: Vec3,
    pub ambient_light_color: Vec3,
    pub sky_color: Vec3,
    pub num_stars: u32,
}

#[derive(Clone, Debug)]
pub struct TimeOfDay {
    /// Speed-up factor; 0 freezes the clock.
    pub multiply: f32,
    time_of_day: f32,
    seconds_per_day: f32,
    states: Vec<TimeState>,
}

impl TimeOfDay {
    /// `states` must be non-empty and sorted by `time_of_day`.
    pub fn new(states: Vec<TimeState>, seconds_per_day: f32, start: f32) -> Self {
        let mut time = Self {
            multiply: 1.0,
            time_of_day: 0.0,
            seconds_per_day,
            states,
        };
        time.set_time_of_day(start);
        time
    }

    /// Builds the cycle from a validated config.
    pub fn from_config(config: &HamletConfig, start: f32) -> Self {
        let mut time = Self::new(config.time_states.clone(), config.seconds_per_day, start);
        time.multiply = config.time_multiply;
        time
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, time: f32) {
        self.time_of_day = time.rem_euclid(1.0);
        // rem_euclid can round up to exactly 1.0 for tiny negative inputs.
        if self.time_of_day >= 1.0 {
            self.time_of_day = 0.0;
        }
    }

    pub fn states(&self) -> &[TimeState] {
        &self.states
    }

    /// Moves the clock forward by `delta` real seconds.
    pub fn advance(&mut self, delta: f32) {
        let step = self.multiply * delta / self.seconds_per_day;
        self.set_time_of_day(self.time_of_day + step);
    }

    /// Index of the keyframe the current time has passed most recently.
    pub fn current_index(&self) -> usize {
        self.states
            .iter()
            .rposition(|state| self.time_of_day > state.time_of_day)
            .unwrap_or(0)
    }

    /// Blends the keyframes around the current time.
    pub fn sample(&self) -> TimeSample {
        let index = self.current_index();
        let current = &self.states[index];
        let next = &self.states[(index + 1) % self.states.len()];
        let perc = inverse_lerp(current.time_of_day, next.time_of_day, self.time_of_day);

        TimeSample {
            light_pos: lerp_vec3(current.light_pos, next.light_pos, perc),
            light_color: lerp_vec3(current.light_color, next.light_color, perc),
            ambient_light_color: lerp_vec3(
                current.ambient_light_color,
                next.ambient_light_color,
                perc,
            ),
            sky_color: lerp_vec3(current.sky_color, next.sky_color, perc),
            num_stars: lerp(current.num_stars as f32, next.num_stars as f32, perc).floor() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MAX_STARS, default_time_states};

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, EPSILON)
    }

    fn day(start: f32) -> TimeOfDay {
        TimeOfDay::new(default_time_states(), 120.0, start)
    }

    #[test]
    fn test_keyframe_exact_at_start() {
        let time = day(0.0);
        let sample = time.sample();
        let midnight = &time.states()[0];
        assert!(approx_eq(sample.light_pos, midnight.light_pos));
        assert!(approx_eq(sample.sky_color, midnight.sky_color));
        assert_eq!(sample.num_stars, MAX_STARS);
    }

    #[test]
    fn test_noon_is_day() {
        let sample = day(0.5).sample();
        assert_eq!(sample.num_stars, 0);
        assert!(approx_eq(sample.light_pos, Vec3::new(0.0, 100.0, -100.0)));
        assert!(approx_eq(sample.sky_color, Vec3::new(0.65, 0.85, 1.0)));
    }

    #[test]
    fn test_midway_between_keyframes() {
        // Halfway from noon (12h) to sunset begins (16h).
        let sample = day(14.0 / 24.0).sample();
        assert!(approx_eq(sample.light_pos, Vec3::new(-45.0, 100.0, -45.0)));
        assert!(approx_eq(sample.ambient_light_color, Vec3::new(0.5, 0.45, 0.4)));
    }

    #[test]
    fn test_star_count_floors() {
        // Two thirds from dawn begins (20 stars) to dawn ends (0 stars).
        let sample = day(8.0 / 24.0).sample();
        assert_eq!(sample.num_stars, 6);

        // A quarter of the way from sunset ends (10) to stars up (100).
        let sample = day(19.25 / 24.0).sample();
        assert_eq!(sample.num_stars, 32);
    }

    #[test]
    fn test_sample_stays_between_neighbors() {
        let mut time = day(0.0);
        for _ in 0..500 {
            time.advance(0.37);
            let index = time.current_index();
            let a = &time.states()[index];
            let b = &time.states()[(index + 1) % time.states().len()];
            let sample = time.sample();
            let (lo, hi) = (a.num_stars.min(b.num_stars), a.num_stars.max(b.num_stars));
            assert!(sample.num_stars >= lo && sample.num_stars <= hi);
            let (lo, hi) = (a.light_pos.min(b.light_pos), a.light_pos.max(b.light_pos));
            assert!(sample.light_pos.cmpge(lo - EPSILON).all());
            assert!(sample.light_pos.cmple(hi + EPSILON).all());
        }
    }

    #[test]
    fn test_advance_wraps() {
        let mut time = day(0.9);
        time.advance(24.0);
        assert!((time.time_of_day() - 0.1).abs() < EPSILON);

        time.multiply = 10.0;
        time.advance(120.0);
        assert!((time.time_of_day() - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_zero_multiply_freezes() {
        let mut time = day(0.3);
        time.multiply = 0.0;
        time.advance(1000.0);
        assert_eq!(time.time_of_day(), 0.3);
    }
}
