//! Hamlet - Main Entry Point
//!
//! Builds a small procedural town on the scene graph and runs it for a fixed
//! number of frames against the recording device, walking a scripted tour
//! through a day/night cycle.
//!
//! ```text
//! hamlet [--config hamlet.json] [--frames N] [--seed N] [--textures DIR] [--speed 0-9]
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use hamlet_app::{Hamlet, HamletConfig, PlayerInput, TextureUnits};
use hamlet_core::Timer;
use hamlet_resources::{AsyncTextures, FileImageLoader, ImageLoader, SolidColorLoader};
use hamlet_rhi::HeadlessDevice;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Fallback texture color when no texture directory is configured.
const PLACEHOLDER_COLOR: [u8; 4] = [200, 200, 200, 255];

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    frames: Option<u64>,
    seed: Option<u64>,
    textures: Option<PathBuf>,
    speed: Option<u8>,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                parsed.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                parsed.frames = args[i + 1].parse().ok();
                i += 2;
            }
            "--seed" if i + 1 < args.len() => {
                parsed.seed = args[i + 1].parse().ok();
                i += 2;
            }
            "--textures" if i + 1 < args.len() => {
                parsed.textures = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--speed" if i + 1 < args.len() => {
                parsed.speed = args[i + 1].parse().ok();
                i += 2;
            }
            _ => i += 1,
        }
    }
    parsed
}

/// Input for frame `frame` of the tour: walk a loop around the windmill,
/// pausing now and then to spin it.
fn scripted_input(frame: u64) -> PlayerInput {
    let phase = frame % 600;
    match phase {
        0..120 => PlayerInput {
            strafe: 1.0,
            ..Default::default()
        },
        120..300 => PlayerInput {
            forward: 1.0,
            turn: -0.5,
            ..Default::default()
        },
        300..360 => PlayerInput {
            spin_windmill: true,
            ..Default::default()
        },
        360..540 => PlayerInput {
            forward: -1.0,
            turn: 0.5,
            ..Default::default()
        },
        _ => PlayerInput {
            strafe: -1.0,
            ..Default::default()
        },
    }
}

fn main() -> Result<()> {
    hamlet_core::init_logging();

    let args = parse_args();
    let mut config = HamletConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.textures.is_some() {
        config.texture_dir = args.textures;
    }

    info!("Starting Hamlet");
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut device = HeadlessDevice::new();
    let mut textures = AsyncTextures::new();
    let units = match &config.texture_dir {
        Some(dir) => start_textures(&mut textures, &FileImageLoader, dir.clone()),
        None => {
            info!("No texture directory configured, using placeholder textures");
            let loader = SolidColorLoader::new(PLACEHOLDER_COLOR);
            start_textures(&mut textures, &loader, PathBuf::new())
        }
    };
    let timeout = Duration::from_secs_f32(config.texture_timeout_secs);
    textures
        .wait_all(&mut device, timeout)
        .context("Failed to load textures")?;

    let mut hamlet = Hamlet::new(device, &config, units, &mut rng)
        .context("Failed to build the town")?;
    info!(
        "Town ready: {} houses, {} renderers, {} transforms",
        hamlet.town().houses,
        hamlet.scene().renderers().len(),
        hamlet.scene().transforms().len()
    );
    if let Some(speed) = args.speed {
        hamlet.set_time_multiply(speed);
    }

    let mut timer = Timer::new();
    let mut draws = 0usize;
    for frame in 0..config.frames {
        // Scripted key presses: debug texture while spinning, then a windmill pause.
        match frame % 600 {
            300 | 360 => hamlet.toggle_debug_texture(),
            420 | 480 => hamlet.toggle_windmill(),
            _ => {}
        }

        hamlet.scene_mut().device_mut().clear();
        draws += hamlet
            .tick(config.frame_delta, &scripted_input(frame))
            .with_context(|| format!("Frame {} failed", frame))?;
        timer.tick();

        if frame % 120 == 0 {
            let sky = hamlet.sky_color();
            debug!(
                "Frame {}: time {:.3}, {} stars, sky ({:.2}, {:.2}, {:.2}), player at {:?}",
                frame,
                hamlet.time().time_of_day(),
                hamlet.town().starfield.active_count(),
                sky.x,
                sky.y,
                sky.z,
                hamlet.player().position()
            );
        }
    }

    let frames = timer.frames();
    info!(
        "Rendered {} frames, {} draws ({:.1} per frame), {:.1} fps, {:.2?} total",
        frames,
        draws,
        if frames > 0 { draws as f64 / frames as f64 } else { 0.0 },
        timer.average_fps(),
        timer.elapsed()
    );
    info!("Shutdown complete");
    Ok(())
}

fn start_textures(
    textures: &mut AsyncTextures,
    loader: &dyn ImageLoader,
    dir: PathBuf,
) -> TextureUnits {
    let units = TextureUnits::start(textures, loader, &dir);
    debug!("Loading {} textures from {:?}", textures.len(), dir);
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_input_loops() {
        assert_eq!(scripted_input(5), scripted_input(605));
        assert!(scripted_input(310).spin_windmill);
        assert!(!scripted_input(10).spin_windmill);
    }

    #[test]
    fn test_placeholder_textures_become_ready() {
        let mut device = HeadlessDevice::new();
        let mut textures = AsyncTextures::new();
        let loader = SolidColorLoader::new(PLACEHOLDER_COLOR);
        let units = start_textures(&mut textures, &loader, PathBuf::new());

        textures
            .wait_all(&mut device, Duration::from_secs(1))
            .unwrap();
        assert_eq!(textures.len(), TextureUnits::FILES.len());
        assert!(textures.is_ready(units.debug));
        assert_eq!(units.roof1, 0);
        assert_eq!(units.debug, 5);
    }

    #[test]
    fn test_headless_run() {
        let config = HamletConfig {
            seed: Some(3),
            start_time_of_day: Some(0.1),
            ..HamletConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);
        let mut device = HeadlessDevice::new();
        let mut textures = AsyncTextures::new();
        let units = start_textures(
            &mut textures,
            &SolidColorLoader::new(PLACEHOLDER_COLOR),
            PathBuf::new(),
        );
        textures
            .wait_all(&mut device, Duration::from_secs(1))
            .unwrap();

        let mut hamlet = Hamlet::new(device, &config, units, &mut rng).unwrap();
        for frame in 0..700 {
            hamlet.scene_mut().device_mut().clear();
            let drawn = hamlet
                .tick(config.frame_delta, &scripted_input(frame))
                .unwrap();
            assert_eq!(drawn, hamlet.scene().device().draw_calls().len());
        }
        assert!(hamlet.time().time_of_day() > 0.1);
    }
}
