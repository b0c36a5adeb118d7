//! Town construction: materials, ground, windmill, houses and stars.
//!
//! Everything in the town is built from one unit cube, scaled and parented
//! into shape. Layout randomness comes from the caller's RNG so a fixed seed
//! reproduces the same town.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec3;
use hamlet_resources::material::UV_WEIGHT_UNIFORM;
use hamlet_resources::primitives::{MeshVertex, unit_cube_data};
use hamlet_resources::{AsyncTextures, ImageLoader, MaterialId, ShaderFeatures, ShapeId};
use hamlet_rhi::{GpuDevice, PrimitiveTopology};
use hamlet_scene::{RendererId, Scene, SceneResult, TransformId, Transforms};
use rand::Rng;
use tracing::{debug, info};

const MAIN_VERT: &str = include_str!("../shaders/main.vert");
const MAIN_FRAG: &str = include_str!("../shaders/main.frag");
const STAR_VERT: &str = include_str!("../shaders/star.vert");
const STAR_FRAG: &str = include_str!("../shaders/star.frag");

/// Stars sit on a sphere of this radius around the origin.
pub const STAR_RADIUS: f32 = 200.0;

/// Texture units assigned to each image, in load order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureUnits {
    pub roof1: u32,
    pub roof2: u32,
    pub wood1: u32,
    pub ground: u32,
    pub wall: u32,
    /// Checker texture swapped in by the debug toggle.
    pub debug: u32,
}

impl TextureUnits {
    pub const FILES: [&'static str; 6] = [
        "roof1.png",
        "roof2.png",
        "wood1.png",
        "ground.jpg",
        "wall.png",
        "tex.png",
    ];

    /// Starts loading every town texture from `dir`.
    pub fn start(textures: &mut AsyncTextures, loader: &dyn ImageLoader, dir: &Path) -> Self {
        let mut units = Self::FILES
            .iter()
            .map(|file| textures.start(loader, dir.join(file)));
        let mut next = || units.next().unwrap_or_default();
        Self {
            roof1: next(),
            roof2: next(),
            wood1: next(),
            ground: next(),
            wall: next(),
            debug: next(),
        }
    }
}

/// Shared shape and materials every town piece draws with.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub cube: ShapeId,
    pub roof1: MaterialId,
    pub roof2: MaterialId,
    pub wood1: MaterialId,
    pub ground: MaterialId,
    pub wall: MaterialId,
    pub star: MaterialId,
}

impl Palette {
    pub fn build<D: GpuDevice>(scene: &mut Scene<D>, units: &TextureUnits) -> SceneResult<Self> {
        let main = scene.create_shader(MAIN_VERT, MAIN_FRAG)?;
        if let Some(shader) = scene.shader_mut(main) {
            shader.set_features(ShaderFeatures::default() | ShaderFeatures::UV2);
        }
        let star_shader = scene.create_shader(STAR_VERT, STAR_FRAG)?;
        if let Some(shader) = scene.shader_mut(star_shader) {
            shader.set_features(ShaderFeatures::empty());
        }

        let cube = scene.create_shape(
            MeshVertex::LAYOUT,
            PrimitiveTopology::Triangles,
            &unit_cube_data(),
        )?;

        let mut textured = |unit: u32| -> SceneResult<MaterialId> {
            let id = scene.create_material(main)?;
            if let Some(material) = scene.material_mut(id) {
                material.set_texture_unit(unit);
            }
            Ok(id)
        };
        let roof1 = textured(units.roof1)?;
        let roof2 = textured(units.roof2)?;
        let wood1 = textured(units.wood1)?;
        let wall = textured(units.wall)?;
        let ground = textured(units.ground)?;
        if let Some(material) = scene.material_mut(ground) {
            // Ground tiles with the second UV set.
            material.set_float(UV_WEIGHT_UNIFORM, 1.0);
        }

        let star = scene.create_material(star_shader)?;
        if let Some(material) = scene.material_mut(star) {
            material.remove_uniform(UV_WEIGHT_UNIFORM);
        }

        Ok(Self {
            cube,
            roof1,
            roof2,
            wood1,
            ground,
            wall,
            star,
        })
    }
}

/// Sphere collider. Only the horizontal distance is checked.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collider {
    pub position: Vec3,
    pub radius: f32,
}

impl Collider {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self { position, radius }
    }

    /// True if the point `(x, z)` lies strictly inside the collider.
    pub fn blocks(&self, x: f32, z: f32) -> bool {
        let dx = x - self.position.x;
        let dz = z - self.position.z;
        self.radius * self.radius > dx * dx + dz * dz
    }
}

/// Windmill at the center of town.
#[derive(Clone, Debug)]
pub struct Windmill {
    /// Whole windmill; spins around Y.
    pub root: TransformId,
    /// Blade hub; turns around Z.
    pub blades: TransformId,
    pub turn: bool,
    /// Blade speed in degrees per second.
    pub turn_speed: f32,
    /// Spin speed in degrees per second.
    pub spin_speed: f32,
}

impl Windmill {
    fn build<D: GpuDevice>(
        scene: &mut Scene<D>,
        palette: &Palette,
        colliders: &mut Vec<Collider>,
    ) -> SceneResult<Self> {
        let root = scene.create_transform(None)?;
        let hub = scene.create_transform(Some(root))?;
        translate(scene, hub, 0.0, 2.9, 0.2);
        let blades = scene.create_transform(Some(hub))?;
        let blades_crossed = scene.create_transform(Some(blades))?;
        if let Some(t) = scene.transform_mut(blades_crossed) {
            t.rotate(0.0, 0.0, 90.0);
        }

        let post = scene.create_transform(Some(root))?;
        scale(scene, post, 0.2, 3.0, 0.2);
        scene.create_renderer(palette.wood1, palette.cube, Some(post))?;

        let pedestal = scene.create_transform(None)?;
        scale(scene, pedestal, 1.05, 0.1, 1.05);
        scene.create_renderer(palette.wood1, palette.cube, Some(pedestal))?;

        colliders.push(Collider::new(Vec3::ZERO, 1.5));

        for side in [0.0, 180.0] {
            for parent in [blades, blades_crossed] {
                let arm = scene.create_transform(Some(parent))?;
                let container = scene.create_transform(Some(arm))?;
                if let Some(t) = scene.transform_mut(container) {
                    t.translate(0.0, 0.14, 0.0).rotate(0.0, 0.0, side);
                }
                let blade = scene.create_transform(Some(container))?;
                scale(scene, blade, 0.3, 1.3, 0.1);
                scene.create_renderer(palette.wood1, palette.cube, Some(blade))?;
            }
        }

        Ok(Self {
            root,
            blades,
            turn: true,
            turn_speed: 30.0,
            spin_speed: 20.0,
        })
    }

    /// Turns the blades if enabled, and spins the whole windmill if `spin`.
    pub fn update(&self, transforms: &mut Transforms, delta: f32, spin: bool) {
        if self.turn
            && let Some(blades) = transforms.get_mut(self.blades)
        {
            blades.rotate(0.0, 0.0, self.turn_speed * delta);
        }
        if spin && let Some(root) = transforms.get_mut(self.root) {
            root.rotate(0.0, -self.spin_speed * delta, 0.0);
        }
    }
}

/// Star renderers split into lit and unlit queues.
///
/// Stars move between queues front-first, so the longest-lit star goes out
/// first and the longest-dark star comes on first.
#[derive(Clone, Debug, Default)]
pub struct Starfield {
    active: VecDeque<RendererId>,
    inactive: VecDeque<RendererId>,
}

impl Starfield {
    fn build<D: GpuDevice, R: Rng>(
        scene: &mut Scene<D>,
        palette: &Palette,
        max_stars: u32,
        rng: &mut R,
    ) -> SceneResult<Self> {
        let mut inactive = VecDeque::with_capacity(max_stars as usize);
        for _ in 0..max_stars {
            // Uniform on the sphere, restricted to the upper band of the sky.
            let angle = rng.gen_range(0.0..TAU);
            let u = 0.3 + rng.gen_range(0.0..0.7f32);
            let ring = STAR_RADIUS * (1.0 - u * u).sqrt();

            let transform = scene.create_transform(None)?;
            translate(
                scene,
                transform,
                ring * angle.cos(),
                STAR_RADIUS * u,
                ring * angle.sin(),
            );
            let id = scene.create_renderer(palette.star, palette.cube, Some(transform))?;
            scene.set_enabled(id, false);
            inactive.push_back(id);
        }
        Ok(Self {
            active: VecDeque::new(),
            inactive,
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn capacity(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    /// Lights exactly `count` stars, clamped to the number of stars.
    pub fn set_active<D: GpuDevice>(&mut self, scene: &mut Scene<D>, count: usize) {
        let count = count.min(self.capacity());
        while self.active.len() < count {
            let Some(id) = self.inactive.pop_front() else {
                break;
            };
            scene.set_enabled(id, true);
            self.active.push_back(id);
        }
        while self.active.len() > count {
            let Some(id) = self.active.pop_front() else {
                break;
            };
            scene.set_enabled(id, false);
            self.inactive.push_back(id);
        }
    }
}

/// The built town.
#[derive(Clone, Debug)]
pub struct Town {
    pub palette: Palette,
    pub windmill: Windmill,
    pub starfield: Starfield,
    pub colliders: Vec<Collider>,
    pub houses: usize,
}

impl Town {
    /// Degrees between neighboring houses, before jitter.
    const MIN_HOUSE_DEGREES: f32 = 40.0;
    const MAX_HOUSE_DEGREES: f32 = 50.0;
    const FLAT_ROOF_CHANCE: f32 = 0.7;

    /// Builds the whole town into `scene`.
    pub fn build<D: GpuDevice, R: Rng>(
        scene: &mut Scene<D>,
        units: &TextureUnits,
        max_stars: u32,
        rng: &mut R,
    ) -> SceneResult<Self> {
        let palette = Palette::build(scene, units)?;
        let mut colliders = Vec::new();

        let ground = scene.create_transform(None)?;
        if let Some(t) = scene.transform_mut(ground) {
            t.scale(50.0, 1.0, 50.0).rotate(180.0, 0.0, 0.0);
        }
        scene.create_renderer(palette.ground, palette.cube, Some(ground))?;

        let windmill = Windmill::build(scene, &palette, &mut colliders)?;
        let houses = Self::build_houses(scene, &palette, &mut colliders, rng)?;
        let starfield = Starfield::build(scene, &palette, max_stars, rng)?;

        info!(
            "Built town: {} houses, {} stars, {} renderers",
            houses,
            starfield.capacity(),
            scene.renderers().len()
        );
        Ok(Self {
            palette,
            windmill,
            starfield,
            colliders,
            houses,
        })
    }

    fn build_houses<D: GpuDevice, R: Rng>(
        scene: &mut Scene<D>,
        palette: &Palette,
        colliders: &mut Vec<Collider>,
        rng: &mut R,
    ) -> SceneResult<usize> {
        let count = (360.0 / Self::MAX_HOUSE_DEGREES).floor() as usize;
        let mut house_rot = rng.gen_range(0.0..360.0f32);

        for _ in 0..count {
            let radius = 8.0 + rng.gen_range(0.0..3.0f32);
            let (sin, cos) = house_rot.to_radians().sin_cos();
            let position = Vec3::new(cos * radius, 0.0, sin * radius);

            let root = scene.create_transform(None)?;
            translate(scene, root, position.x, position.y, position.z);
            colliders.push(Collider::new(position, 2.5));

            let jitter = rng.gen_range(0.0..20.0f32) - 10.0;
            let base = scene.create_transform(Some(root))?;
            if let Some(t) = scene.transform_mut(base) {
                t.rotate(0.0, house_rot - 90.0 + jitter, 0.0).scale(3.0, 2.0, 3.0);
            }
            scene.create_renderer(palette.wall, palette.cube, Some(base))?;

            let trim = scene.create_transform(Some(base))?;
            scale(scene, trim, 1.05, 0.05, 1.05);
            scene.create_renderer(palette.roof1, palette.cube, Some(trim))?;

            if rng.gen_range(0.0..1.0f32) <= Self::FLAT_ROOF_CHANCE {
                let roof_root = scene.create_transform(Some(base))?;
                translate(scene, roof_root, 0.0, 1.0, 0.0);
                let roof = scene.create_transform(Some(roof_root))?;
                scale(scene, roof, 1.1, 0.2, 1.1);
                scene.create_renderer(palette.roof1, palette.cube, Some(roof))?;

                let chimney_root = scene.create_transform(Some(base))?;
                translate(scene, chimney_root, -0.3, 0.0, -0.3);
                let chimney = scene.create_transform(Some(chimney_root))?;
                scale(scene, chimney, 0.2, 1.4, 0.2);
                scene.create_renderer(palette.roof2, palette.cube, Some(chimney))?;
            } else {
                // Stepped roof: five slabs, each smaller than the last.
                let thickness = 0.1;
                let mut height = 1.0;
                let mut size = 1.1;
                for _ in 0..5 {
                    let slab_root = scene.create_transform(Some(base))?;
                    translate(scene, slab_root, 0.0, height, 0.0);
                    let slab = scene.create_transform(Some(slab_root))?;
                    scale(scene, slab, size, thickness, size);
                    scene.create_renderer(palette.roof2, palette.cube, Some(slab))?;
                    height += thickness;
                    size -= 0.2;
                }
            }

            debug!("House at {:.1} degrees, radius {:.2}", house_rot, radius);
            house_rot += Self::MIN_HOUSE_DEGREES
                + rng.gen_range(0.0..(Self::MAX_HOUSE_DEGREES - Self::MIN_HOUSE_DEGREES));
        }
        Ok(count)
    }
}

fn translate<D: GpuDevice>(scene: &mut Scene<D>, id: TransformId, x: f32, y: f32, z: f32) {
    if let Some(t) = scene.transform_mut(id) {
        t.translate(x, y, z);
    }
}

fn scale<D: GpuDevice>(scene: &mut Scene<D>, id: TransformId, x: f32, y: f32, z: f32) {
    if let Some(t) = scene.transform_mut(id) {
        t.scale(x, y, z);
    }
}
