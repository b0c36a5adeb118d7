//! Asynchronous texture loading.
//!
//! Images are decoded off the render thread by an [`ImageLoader`] and handed
//! back through a channel. [`AsyncTextures`] assigns each load its own
//! texture unit up front, so materials can reference the unit before the
//! pixels arrive, and uploads finished images when polled.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hamlet_resources::{AsyncTextures, SolidColorLoader};
//! use hamlet_rhi::HeadlessDevice;
//!
//! # fn example() -> hamlet_resources::ResourceResult<()> {
//! let mut device = HeadlessDevice::new();
//! let mut textures = AsyncTextures::new();
//!
//! let unit = textures.start(&SolidColorLoader::new([255, 0, 0, 255]), "red");
//! textures.wait_all(&mut device, Duration::from_secs(1))?;
//! assert!(textures.is_ready(unit));
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use hamlet_rhi::{GpuDevice, TextureHandle, TextureImage};
use tracing::{debug, error, info};

use crate::error::{ResourceError, ResourceResult};

/// Completion handler invoked exactly once per load, from any thread.
pub type LoadCallback = Box<dyn FnOnce(ResourceResult<TextureImage>) + Send>;

/// Source of decoded images.
pub trait ImageLoader {
    /// Begins loading `path` and calls `done` with the result.
    fn load(&self, path: &Path, done: LoadCallback);
}

/// Decodes image files on a background thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageLoader;

impl FileImageLoader {
    /// Reads and decodes `path` into RGBA rows, bottom row first.
    pub fn decode(path: &Path) -> ResourceResult<TextureImage> {
        if !path.exists() {
            return Err(ResourceError::FileNotFound(path.to_path_buf()));
        }
        let image = image::open(path)?.flipv().to_rgba8();
        let (width, height) = image.dimensions();
        Ok(TextureImage {
            width,
            height,
            pixels: image.into_raw(),
        })
    }
}

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path, done: LoadCallback) {
        let path = path.to_path_buf();
        let spawned = thread::Builder::new()
            .name("texture-loader".to_string())
            .spawn(move || done(Self::decode(&path)));
        if let Err(e) = spawned {
            error!("Failed to spawn texture loader thread: {}", e);
        }
    }
}

/// Produces a 2x2 image of one color without touching the filesystem.
#[derive(Clone, Copy, Debug)]
pub struct SolidColorLoader {
    color: [u8; 4],
}

impl SolidColorLoader {
    pub fn new(color: [u8; 4]) -> Self {
        Self { color }
    }
}

impl ImageLoader for SolidColorLoader {
    fn load(&self, _path: &Path, done: LoadCallback) {
        done(Ok(TextureImage {
            width: 2,
            height: 2,
            pixels: self.color.repeat(4),
        }));
    }
}

struct Completed {
    unit: u32,
    result: ResourceResult<TextureImage>,
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    texture: Option<TextureHandle>,
}

/// Registry of in-flight and uploaded textures, indexed by texture unit.
pub struct AsyncTextures {
    sender: Sender<Completed>,
    receiver: Receiver<Completed>,
    entries: Vec<Entry>,
}

impl AsyncTextures {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            entries: Vec::new(),
        }
    }

    /// Starts loading `path` with `loader` and returns its texture unit.
    ///
    /// Units are handed out in call order starting at 0.
    pub fn start(&mut self, loader: &dyn ImageLoader, path: impl AsRef<Path>) -> u32 {
        let path = path.as_ref();
        let unit = self.entries.len() as u32;
        self.entries.push(Entry {
            path: path.to_path_buf(),
            texture: None,
        });

        let sender = self.sender.clone();
        debug!("Loading texture {} into unit {}", path.display(), unit);
        loader.load(
            path,
            Box::new(move |result| {
                // The registry may be gone by the time a slow load finishes.
                let _ = sender.send(Completed { unit, result });
            }),
        );
        unit
    }

    /// Uploads every image that finished since the last poll.
    ///
    /// Returns how many textures were uploaded.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::TextureLoad`] for the first load that failed
    /// to decode or upload.
    pub fn poll<D: GpuDevice + ?Sized>(&mut self, device: &mut D) -> ResourceResult<usize> {
        let mut uploaded = 0;
        while let Ok(completed) = self.receiver.try_recv() {
            self.finish(device, completed)?;
            uploaded += 1;
        }
        Ok(uploaded)
    }

    /// Blocks until every started load is uploaded.
    ///
    /// # Errors
    ///
    /// Fails on the first failed load, or with
    /// [`ResourceError::TextureTimeout`] if `timeout` elapses first.
    pub fn wait_all<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        timeout: Duration,
    ) -> ResourceResult<()> {
        let deadline = Instant::now() + timeout;
        while !self.all_ready() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(completed) => self.finish(device, completed)?,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    return Err(ResourceError::TextureTimeout {
                        pending: self.pending(),
                    });
                }
            }
        }
        info!("All {} texture(s) loaded", self.entries.len());
        Ok(())
    }

    pub fn is_ready(&self, unit: u32) -> bool {
        self.texture(unit).is_some()
    }

    /// Device texture uploaded into `unit`, once ready.
    pub fn texture(&self, unit: u32) -> Option<TextureHandle> {
        self.entries.get(unit as usize).and_then(|e| e.texture)
    }

    /// True when nothing is still loading.
    pub fn all_ready(&self) -> bool {
        self.pending() == 0
    }

    /// Number of loads not yet uploaded.
    pub fn pending(&self) -> usize {
        self.entries.iter().filter(|e| e.texture.is_none()).count()
    }

    /// Number of loads started.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn finish<D: GpuDevice + ?Sized>(
        &mut self,
        device: &mut D,
        completed: Completed,
    ) -> ResourceResult<()> {
        let Some(entry) = self.entries.get_mut(completed.unit as usize) else {
            return Ok(());
        };
        let unit = completed.unit;
        let uploaded = completed.result.and_then(|image| {
            device
                .create_texture(unit, &image)
                .map_err(ResourceError::from)
        });
        match uploaded {
            Ok(texture) => {
                debug!(
                    "Texture {} ready on unit {}",
                    entry.path.display(),
                    unit
                );
                entry.texture = Some(texture);
                Ok(())
            }
            Err(e) => {
                error!("Texture {} failed: {}", entry.path.display(), e);
                Err(ResourceError::TextureLoad {
                    path: entry.path.clone(),
                    message: e.to_string(),
                })
            }
        }
    }
}

impl Default for AsyncTextures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_rhi::HeadlessDevice;

    /// Never reports back.
    struct StalledLoader;

    impl ImageLoader for StalledLoader {
        fn load(&self, _path: &Path, done: LoadCallback) {
            std::mem::forget(done);
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hamlet-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_units_in_start_order() {
        let mut textures = AsyncTextures::new();
        let loader = SolidColorLoader::new([0, 0, 0, 255]);
        assert_eq!(textures.start(&loader, "a"), 0);
        assert_eq!(textures.start(&loader, "b"), 1);
        assert_eq!(textures.len(), 2);
        assert!(!textures.all_ready());
    }

    #[test]
    fn test_poll_uploads_completed() {
        let mut device = HeadlessDevice::new();
        let mut textures = AsyncTextures::new();
        let unit = textures.start(&SolidColorLoader::new([255, 255, 255, 255]), "white");

        assert!(!textures.is_ready(unit));
        assert_eq!(textures.poll(&mut device).unwrap(), 1);
        assert!(textures.is_ready(unit));
        assert!(textures.all_ready());
        assert_eq!(textures.poll(&mut device).unwrap(), 0);
    }

    #[test]
    fn test_missing_file_fails() {
        let mut device = HeadlessDevice::new();
        let mut textures = AsyncTextures::new();
        textures.start(&FileImageLoader, temp_path("does-not-exist.png"));

        let err = textures
            .wait_all(&mut device, Duration::from_secs(5))
            .unwrap_err();
        assert!(matches!(err, ResourceError::TextureLoad { .. }));
    }

    #[test]
    fn test_out_of_range_unit_fails() {
        let mut device = HeadlessDevice::with_texture_units(1);
        let mut textures = AsyncTextures::new();
        let loader = SolidColorLoader::new([1, 2, 3, 4]);
        textures.start(&loader, "first");
        textures.start(&loader, "second");

        assert!(textures.poll(&mut device).is_err());
        assert!(textures.is_ready(0));
        assert!(!textures.is_ready(1));
    }

    #[test]
    fn test_wait_times_out() {
        let mut device = HeadlessDevice::new();
        let mut textures = AsyncTextures::new();
        textures.start(&StalledLoader, "never");

        let err = textures
            .wait_all(&mut device, Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, ResourceError::TextureTimeout { pending: 1 }));
    }

    #[test]
    fn test_file_loader_flips_rows() {
        let path = temp_path("flip.png");
        let mut source = image::RgbaImage::new(1, 2);
        source.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        source.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        source.save(&path).unwrap();

        let decoded = FileImageLoader::decode(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((decoded.width, decoded.height), (1, 2));
        assert_eq!(&decoded.pixels[0..4], &[0, 0, 255, 255]);
        assert_eq!(&decoded.pixels[4..8], &[255, 0, 0, 255]);
    }
}
