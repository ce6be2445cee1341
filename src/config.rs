use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::str::FromStr;

use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};

use crate::math::Rgb;

// ============================================
// Grid
// ============================================

/// Aspect ratio of the video feed and of the sampling grid
pub const ASPECT_RATIO: f64 = 16.0 / 9.0;

/// Grid width range exposed by the width control
pub const GRID_WIDTH_MIN: u32 = 4;
pub const GRID_WIDTH_MAX: u32 = 150;

pub const DEFAULT_GRID_WIDTH: u32 = 100;

// ============================================
// Sampling
// ============================================

/// ITU-R BT.709 luma weights
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Resolution of generated test-pattern frames
pub const TEST_PATTERN_WIDTH: u32 = 320;
pub const TEST_PATTERN_HEIGHT: u32 = 180;

// ============================================
// Switches
// ============================================

/// Fraction of a cell covered by its switch
pub const SWITCH_FILL: f32 = 0.9;

/// Switch capsule width / height
pub const SWITCH_ASPECT: f32 = 1.6;

/// Activation easing per millisecond of tick delta
pub const EASING_RATE: f32 = 0.01;

/// Activations this close to their target land on it
pub const ACTIVATION_SNAP: f32 = 1e-4;

/// Capsule color at activation 0
pub const NEUTRAL_COLOR: Rgb = Rgb(0xe6e6e6);

pub const DEFAULT_ACCENT: Rgb = Rgb(0x2dcb45);

/// Palette cycled by the color control
pub const ACCENT_PALETTE: [Rgb; 6] = [
    Rgb(0x2dcb45),
    Rgb(0x0a84ff),
    Rgb(0xff9f0a),
    Rgb(0xff375f),
    Rgb(0xbf5af2),
    Rgb(0x1c1c1e),
];

/// Thumb shadow: #00000056
pub const SHADOW_ALPHA: f32 = 0x56 as f32 / 255.0;

// ============================================
// Display
// ============================================

/// Device pixel ratio cap, bounds the pixel buffer size
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Nominal frame period reported by the first clock tick
pub const NOMINAL_FRAME_MS: f64 = 16.0;

pub const BACKGROUND_COLOR: Rgb = Rgb::WHITE;

pub const DEFAULT_WINDOW_WIDTH: u32 = 1280;
pub const DEFAULT_WINDOW_HEIGHT: u32 = 720;

// ============================================
// Controls
// ============================================

pub const THRESHOLD_STEP: f32 = 0.05;
pub const GRID_WIDTH_STEP: u32 = 1;
pub const GRID_WIDTH_COARSE_STEP: u32 = 10;

/// Values read by the sampler and switch grid every tick.
///
/// Written only by the keyboard controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    pub threshold: f32,
    pub grid_width: u32,
    pub accent: Rgb,
    pub invert: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            grid_width: DEFAULT_GRID_WIDTH,
            accent: DEFAULT_ACCENT,
            invert: false,
        }
    }
}

impl Settings {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_grid_width(mut self, width: u32) -> Self {
        self.grid_width = width.clamp(GRID_WIDTH_MIN, GRID_WIDTH_MAX);
        self
    }

    /// Next palette entry after the current accent
    pub fn next_accent(self) -> Rgb {
        let position = ACCENT_PALETTE.iter().position(|c| *c == self.accent);
        match position {
            Some(i) => ACCENT_PALETTE[(i + 1) % ACCENT_PALETTE.len()],
            None => ACCENT_PALETTE[0],
        }
    }
}

/// Single-threaded shared settings cell
pub type SharedSettings = Rc<Cell<Settings>>;

/// Scaling used to downsample frames onto the grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SampleFilter {
    #[default]
    Nearest,
    Bilinear,
}

impl SampleFilter {
    pub fn filter_type(self) -> image::imageops::FilterType {
        match self {
            SampleFilter::Nearest => image::imageops::FilterType::Nearest,
            SampleFilter::Bilinear => image::imageops::FilterType::Triangle,
        }
    }
}

/// Where video frames come from
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    /// Animated synthetic frames
    TestPattern,
    /// Every pixel at one gray level
    Uniform(u8),
    /// A still image file standing in for the camera
    Image(PathBuf),
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test-pattern" | "pattern" => Ok(SourceKind::TestPattern),
            "black" => Ok(SourceKind::Uniform(0)),
            "white" => Ok(SourceKind::Uniform(255)),
            _ => {
                if let Some(level) = s.strip_prefix("gray:") {
                    let level = level
                        .parse::<u8>()
                        .with_context(|| format!("gray level must be 0-255, got {:?}", level))?;
                    Ok(SourceKind::Uniform(level))
                } else if s.is_empty() {
                    Err(anyhow!("empty source"))
                } else {
                    Ok(SourceKind::Image(PathBuf::from(s)))
                }
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Live video rendered as a grid of toggle switches")]
pub struct Args {
    /// Frame source: `test-pattern`, `black`, `white`, `gray:N`, or an image path
    #[arg(short, long, default_value = "test-pattern", value_parser = parse_source)]
    pub source: SourceKind,

    /// Luminance at or below which a switch turns on (0-1)
    #[arg(short, long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f32,

    /// Grid width in cells (4-150)
    #[arg(short, long, default_value_t = DEFAULT_GRID_WIDTH)]
    pub width: u32,

    /// Accent color of switched-on capsules
    #[arg(short, long, default_value = "#2dcb45", value_parser = parse_color)]
    pub color: Rgb,

    /// Sample in raster order instead of mirroring each row
    #[arg(short, long)]
    pub invert: bool,

    /// Downsampling filter
    #[arg(long, value_enum, default_value_t = SampleFilter::Nearest)]
    pub filter: SampleFilter,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    pub window_width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    pub window_height: u32,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            accent: self.color,
            invert: self.invert,
            ..Settings::default()
        }
        .with_threshold(self.threshold)
        .with_grid_width(self.width)
    }
}

fn parse_source(s: &str) -> Result<SourceKind, String> {
    s.parse().map_err(|e: anyhow::Error| format!("{:#}", e))
}

fn parse_color(s: &str) -> Result<Rgb, String> {
    s.parse().map_err(|e: anyhow::Error| format!("{:#}", e))
}
