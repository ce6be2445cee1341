use std::f64::consts::TAU;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context;
use image::{imageops, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::ClockSample;
use crate::config::{SourceKind, ASPECT_RATIO, TEST_PATTERN_HEIGHT, TEST_PATTERN_WIDTH};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    /// Acquisition has not resolved yet
    Pending,
    Live,
    /// Acquisition failed; the source stays dark
    Failed,
}

/// Anything that can hand the sampler a video frame each tick
pub trait FrameSource {
    /// Current frame, or `None` when nothing has been drawn yet
    fn next_frame(&mut self, clock: &ClockSample) -> Option<&RgbaImage>;

    fn status(&self) -> SourceStatus {
        SourceStatus::Live
    }
}

pub type BoxedSource = Box<dyn FrameSource + Send>;

/// A single image repeated every tick
pub struct StillImage {
    frame: RgbaImage,
}

impl StillImage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let decoded = image::open(path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;
        Ok(Self::from_image(decoded.to_rgba8()))
    }

    /// Center-crops to 16:9
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            frame: crop_to_aspect(&image, ASPECT_RATIO),
        }
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self, _clock: &ClockSample) -> Option<&RgbaImage> {
        Some(&self.frame)
    }
}

/// Every pixel at the same gray level
pub struct UniformFrame {
    frame: RgbaImage,
}

impl UniformFrame {
    pub fn new(level: u8, width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::from_pixel(width.max(1), height.max(1), Rgba([level, level, level, 255])),
        }
    }
}

impl FrameSource for UniformFrame {
    fn next_frame(&mut self, _clock: &ClockSample) -> Option<&RgbaImage> {
        Some(&self.frame)
    }
}

/// Synthetic feed: a dark disc drifting over a horizontal gradient, with grain
pub struct TestPattern {
    frame: RgbaImage,
    rng: StdRng,
    grain: u8,
}

impl TestPattern {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::new(width.max(1), height.max(1)),
            rng: StdRng::from_entropy(),
            grain: 12,
        }
    }

    /// Deterministic pattern for tests
    pub fn seeded(width: u32, height: u32, seed: u64, grain: u8) -> Self {
        Self {
            frame: RgbaImage::new(width.max(1), height.max(1)),
            rng: StdRng::seed_from_u64(seed),
            grain,
        }
    }

    fn draw(&mut self, elapsed_ms: f64) {
        let (width, height) = self.frame.dimensions();
        let (w, h) = (width as f64, height as f64);
        let t = elapsed_ms / 1000.0;

        // Lissajous path keeps the disc inside the frame
        let cx = w * (0.5 + 0.3 * (t * TAU / 7.0).sin());
        let cy = h * (0.5 + 0.25 * (t * TAU / 5.0).sin());
        let radius = h * 0.28;

        let grain = self.grain as i16;
        for (x, y, pixel) in self.frame.enumerate_pixels_mut() {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            let base = if dx * dx + dy * dy <= radius * radius {
                12.0
            } else {
                40.0 + 180.0 * (x as f64 / w)
            };
            let noise = if grain > 0 {
                self.rng.gen_range(-grain..=grain)
            } else {
                0
            };
            let level = (base as i16 + noise).clamp(0, 255) as u8;
            *pixel = Rgba([level, level, level, 255]);
        }
    }
}

impl FrameSource for TestPattern {
    fn next_frame(&mut self, clock: &ClockSample) -> Option<&RgbaImage> {
        self.draw(clock.elapsed_ms);
        Some(&self.frame)
    }
}

enum Acquisition {
    Waiting(Receiver<anyhow::Result<BoxedSource>>),
    Ready(BoxedSource),
    Failed,
}

/// Source whose acquisition resolves asynchronously.
///
/// Until the loader thread hands over a source, `next_frame` yields nothing
/// and the sampler sees an all-dark frame.
pub struct PendingSource {
    state: Acquisition,
}

impl PendingSource {
    pub fn from_receiver(receiver: Receiver<anyhow::Result<BoxedSource>>) -> Self {
        Self {
            state: Acquisition::Waiting(receiver),
        }
    }

    fn poll(&mut self) {
        let Acquisition::Waiting(receiver) = &self.state else {
            return;
        };
        match receiver.try_recv() {
            Ok(Ok(source)) => {
                log::info!("Frame source ready");
                self.state = Acquisition::Ready(source);
            }
            Ok(Err(e)) => {
                log::error!("Frame source acquisition failed: {:#}", e);
                self.state = Acquisition::Failed;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::error!("Frame source loader exited without a result");
                self.state = Acquisition::Failed;
            }
        }
    }
}

impl FrameSource for PendingSource {
    fn next_frame(&mut self, clock: &ClockSample) -> Option<&RgbaImage> {
        self.poll();
        match &mut self.state {
            Acquisition::Ready(source) => source.next_frame(clock),
            _ => None,
        }
    }

    fn status(&self) -> SourceStatus {
        match &self.state {
            Acquisition::Waiting(_) => SourceStatus::Pending,
            Acquisition::Ready(source) => source.status(),
            Acquisition::Failed => SourceStatus::Failed,
        }
    }
}

/// Open a source on a background thread; returns immediately
pub fn acquire(kind: SourceKind) -> PendingSource {
    let (sender, receiver) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("frame-source".into())
        .spawn(move || {
            log::info!("Acquiring frame source {:?}", kind);
            // The receiver may be gone if the app already exited
            let _ = sender.send(open(&kind));
        });
    if let Err(e) = spawned {
        log::error!("Failed to spawn frame source loader: {}", e);
    }
    PendingSource::from_receiver(receiver)
}

fn open(kind: &SourceKind) -> anyhow::Result<BoxedSource> {
    let source: BoxedSource = match kind {
        SourceKind::TestPattern => Box::new(TestPattern::new(TEST_PATTERN_WIDTH, TEST_PATTERN_HEIGHT)),
        SourceKind::Uniform(level) => {
            Box::new(UniformFrame::new(*level, TEST_PATTERN_WIDTH, TEST_PATTERN_HEIGHT))
        }
        SourceKind::Image(path) => Box::new(StillImage::open(path)?),
    };
    Ok(source)
}

/// Largest centered region of `image` with the given aspect ratio
pub fn crop_to_aspect(image: &RgbaImage, aspect: f64) -> RgbaImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }
    let current = width as f64 / height as f64;
    let (crop_w, crop_h) = if current > aspect {
        (((height as f64 * aspect).round() as u32).clamp(1, width), height)
    } else {
        (width, ((width as f64 / aspect).round() as u32).clamp(1, height))
    };
    let x = (width - crop_w) / 2;
    let y = (height - crop_h) / 2;
    imageops::crop_imm(image, x, y, crop_w, crop_h).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const TICK: ClockSample = ClockSample {
        elapsed_ms: 0.0,
        delta_ms: 16.0,
    };

    fn wait_for_resolution(source: &mut PendingSource) -> SourceStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        while source.status() == SourceStatus::Pending && Instant::now() < deadline {
            source.next_frame(&TICK);
            thread::sleep(Duration::from_millis(5));
        }
        source.status()
    }

    #[test]
    fn test_crop_wide_image() {
        let image = RgbaImage::new(400, 100);
        let cropped = crop_to_aspect(&image, ASPECT_RATIO);
        assert_eq!(cropped.dimensions(), (178, 100));
    }

    #[test]
    fn test_crop_tall_image() {
        let image = RgbaImage::new(160, 400);
        let cropped = crop_to_aspect(&image, ASPECT_RATIO);
        assert_eq!(cropped.dimensions(), (160, 90));
    }

    #[test]
    fn test_crop_keeps_center() {
        let mut image = RgbaImage::from_pixel(64, 9, Rgba([0, 0, 0, 255]));
        image.put_pixel(32, 4, Rgba([255, 255, 255, 255]));
        let cropped = crop_to_aspect(&image, ASPECT_RATIO);
        assert_eq!(cropped.dimensions(), (16, 9));
        // Crop starts at x = 24
        assert_eq!(cropped.get_pixel(8, 4), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_uniform_frame() {
        let mut source = UniformFrame::new(128, 16, 9);
        let frame = source.next_frame(&TICK).unwrap();
        assert!(frame.pixels().all(|p| p.0 == [128, 128, 128, 255]));
    }

    #[test]
    fn test_pattern_has_dark_disc_and_bright_edge() {
        let mut source = TestPattern::seeded(320, 180, 7, 0);
        let frame = source.next_frame(&TICK).unwrap();
        assert_eq!(frame.dimensions(), (320, 180));
        // At t=0 the disc is centered
        assert_eq!(frame.get_pixel(160, 90).0[0], 12);
        assert!(frame.get_pixel(319, 0).0[0] > 200);
    }

    #[test]
    fn test_pattern_moves_with_time() {
        let mut source = TestPattern::seeded(320, 180, 7, 0);
        let first = source.next_frame(&TICK).unwrap().clone();
        let later = ClockSample {
            elapsed_ms: 1500.0,
            delta_ms: 16.0,
        };
        let second = source.next_frame(&later).unwrap();
        assert_ne!(&first, second);
    }

    #[test]
    fn test_acquire_resolves_to_live_source() {
        let mut source = acquire(SourceKind::Uniform(0));
        assert_eq!(wait_for_resolution(&mut source), SourceStatus::Live);
        assert!(source.next_frame(&TICK).is_some());
    }

    #[test]
    fn test_acquire_missing_image_fails_dark() {
        let mut source = acquire(SourceKind::Image("/nonexistent/frame.png".into()));
        assert_eq!(wait_for_resolution(&mut source), SourceStatus::Failed);
        assert!(source.next_frame(&TICK).is_none());
    }

    #[test]
    fn test_pending_until_sent() {
        let (sender, receiver) = mpsc::channel::<anyhow::Result<BoxedSource>>();
        let mut source = PendingSource::from_receiver(receiver);
        assert!(source.next_frame(&TICK).is_none());
        assert_eq!(source.status(), SourceStatus::Pending);

        let resolved: BoxedSource = Box::new(UniformFrame::new(200, 4, 4));
        sender.send(Ok(resolved)).unwrap();
        assert!(source.next_frame(&TICK).is_some());
        assert_eq!(source.status(), SourceStatus::Live);
    }
}
