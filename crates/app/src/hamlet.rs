//! The running demo: town, player, clock and scene in one place.

use std::collections::HashMap;

use glam::Vec3;
use hamlet_resources::MaterialId;
use hamlet_rhi::GpuDevice;
use hamlet_scene::{Scene, SceneResult};
use rand::Rng;
use tracing::{debug, info};

use crate::config::HamletConfig;
use crate::player::{Player, PlayerInput};
use crate::time_of_day::{TimeOfDay, TimeSample};
use crate::town::{TextureUnits, Town};

pub struct Hamlet<D: GpuDevice> {
    scene: Scene<D>,
    town: Town,
    time: TimeOfDay,
    player: Player,
    units: TextureUnits,
    sky_color: Vec3,
    /// Keyframe the clock passed last, for logging.
    last_state: Option<usize>,
    /// Texture unit each material switches to on the next debug toggle.
    texture_backups: HashMap<MaterialId, u32>,
}

impl<D: GpuDevice> Hamlet<D> {
    /// Builds the town on `device` and applies the starting time of day.
    ///
    /// Textures must already be resident in `units`.
    pub fn new<R: Rng>(
        device: D,
        config: &HamletConfig,
        units: TextureUnits,
        rng: &mut R,
    ) -> SceneResult<Self> {
        let mut scene = Scene::new(device);
        let camera = &config.camera;
        scene
            .camera_mut()
            .set_perspective(camera.fov, camera.aspect, camera.near, camera.far);

        let town = Town::build(&mut scene, &units, config.max_stars, rng)?;
        let start = match config.start_time_of_day {
            Some(start) => start,
            None => rng.gen_range(0.0..1.0),
        };
        let time = TimeOfDay::from_config(config, start);
        info!("Starting at time of day {:.3}", time.time_of_day());

        let player = Player::new();
        player.apply_to(scene.camera_mut());

        let mut hamlet = Self {
            scene,
            town,
            time,
            player,
            units,
            sky_color: Vec3::ZERO,
            last_state: None,
            texture_backups: HashMap::new(),
        };
        hamlet.apply_time();
        Ok(hamlet)
    }

    pub fn scene(&self) -> &Scene<D> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene<D> {
        &mut self.scene
    }

    pub fn town(&self) -> &Town {
        &self.town
    }

    pub fn time(&self) -> &TimeOfDay {
        &self.time
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Clear color for the current frame.
    pub fn sky_color(&self) -> Vec3 {
        self.sky_color
    }

    /// Advances the world by `delta` seconds, then draws it.
    ///
    /// Returns the number of renderers drawn.
    pub fn tick(&mut self, delta: f32, input: &PlayerInput) -> SceneResult<usize> {
        self.update(delta, input);
        self.scene.render()
    }

    pub fn update(&mut self, delta: f32, input: &PlayerInput) {
        self.time.advance(delta);
        self.apply_time();

        self.player.update(input, delta, &self.town.colliders);
        self.player.apply_to(self.scene.camera_mut());

        self.town
            .windmill
            .update(self.scene.transforms_mut(), delta, input.spin_windmill);
    }

    fn apply_time(&mut self) {
        let index = self.time.current_index();
        if self.last_state != Some(index) {
            if let Some(state) = self.time.states().get(index) {
                info!("Time of day: {}", state.label);
            }
            self.last_state = Some(index);
        }

        let TimeSample {
            light_pos,
            light_color,
            ambient_light_color,
            sky_color,
            num_stars,
        } = self.time.sample();

        self.town
            .starfield
            .set_active(&mut self.scene, num_stars as usize);
        self.scene
            .light_mut()
            .set_direction(light_pos)
            .set_color(light_color)
            .set_ambient(ambient_light_color);
        self.sky_color = sky_color;
    }

    /// Sets the day speed from a digit key: 0 stops the clock, 9 is fastest.
    pub fn set_time_multiply(&mut self, digit: u8) {
        let multiply = f32::from(digit.min(9));
        debug!("Time multiplier {}", multiply);
        self.time.multiply = multiply;
    }

    pub fn toggle_windmill(&mut self) {
        self.town.windmill.turn = !self.town.windmill.turn;
    }

    /// Swaps every textured material in the draw list with its backup texture.
    ///
    /// The first toggle switches to the debug texture; the next one restores
    /// the starting texture. Each material is switched once, however many renderers
    /// share it.
    pub fn toggle_debug_texture(&mut self) {
        let mut seen = Vec::new();
        for renderer in self.scene.renderers() {
            if !seen.contains(&renderer.material()) {
                seen.push(renderer.material());
            }
        }

        for id in seen {
            let Some(material) = self.scene.material_mut(id) else {
                continue;
            };
            let Some(current) = material.texture_unit() else {
                continue;
            };
            let backup = self
                .texture_backups
                .get(&id)
                .copied()
                .unwrap_or(self.units.debug);
            self.texture_backups.insert(id, current);
            material.set_texture_unit(backup);
        }
    }
}
