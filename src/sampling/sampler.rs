use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::config::LUMA_WEIGHTS;
use crate::math::normalize;
use crate::sampling::dimensions::GridDimensions;

/// How source pixels are placed in the luminance grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Each row reversed, so the grid reads like a mirror
    Mirrored,
    /// Source raster order
    Raster,
}

impl Orientation {
    pub fn from_invert(invert: bool) -> Self {
        if invert {
            Orientation::Raster
        } else {
            Orientation::Mirrored
        }
    }

    pub fn destination(self, index: usize, width: usize, count: usize) -> usize {
        match self {
            Orientation::Raster => index,
            Orientation::Mirrored => mirrored_index(index, width, count),
        }
    }
}

/// Horizontally mirrored position of `index` in a grid of `count` cells.
///
/// Computes `ceil(index / width) * width - 1 - index % width`. Column-0
/// pixels land on the last cell of the previous row, and index 0 (which
/// would be -1) wraps to the final cell. `count` must be nonzero.
pub fn mirrored_index(index: usize, width: usize, count: usize) -> usize {
    let row_end = index.div_ceil(width) * width;
    (row_end + count - 1 - index % width) % count
}

/// BT.709 luma of one RGBA pixel, scaled to [0, 1]; alpha is ignored
pub fn luminance_of(rgba: &[u8]) -> f32 {
    let luma = LUMA_WEIGHTS[0] * rgba[0] as f32
        + LUMA_WEIGHTS[1] * rgba[1] as f32
        + LUMA_WEIGHTS[2] * rgba[2] as f32;
    normalize(0.0, 255.0, luma)
}

/// Downsamples video frames into a per-cell luminance grid
pub struct BrightnessSampler {
    dims: GridDimensions,
    luminance: Vec<f32>,
    filter: FilterType,
    reallocations: u64,
}

impl BrightnessSampler {
    pub fn new(dims: GridDimensions, filter: FilterType) -> Self {
        Self {
            dims,
            luminance: vec![0.0; dims.cell_count()],
            filter,
            reallocations: 0,
        }
    }

    /// Sample `frame` into the grid; no frame reads as black
    pub fn sample(&mut self, dims: GridDimensions, frame: Option<&RgbaImage>, orientation: Orientation) {
        self.resync(dims);

        let Some(frame) = frame else {
            self.luminance.fill(0.0);
            return;
        };

        let (width, height) = (self.dims.width(), self.dims.height());
        let scaled;
        let pixels = if frame.dimensions() == (width, height) {
            frame
        } else {
            scaled = imageops::resize(frame, width, height, self.filter);
            &scaled
        };

        let (row, count) = (width as usize, self.luminance.len());
        for (index, rgba) in pixels.as_raw().chunks_exact(4).enumerate() {
            let destination = orientation.destination(index, row, count);
            self.luminance[destination] = luminance_of(rgba);
        }
    }

    /// Reallocate the grid (zeroed) when the dimensions changed
    fn resync(&mut self, dims: GridDimensions) -> bool {
        if dims == self.dims {
            return false;
        }
        log::debug!(
            "Luminance grid {}x{} -> {}x{}",
            self.dims.width(),
            self.dims.height(),
            dims.width(),
            dims.height()
        );
        self.dims = dims;
        self.luminance = vec![0.0; dims.cell_count()];
        self.reallocations += 1;
        true
    }

    pub fn luminance(&self) -> &[f32] {
        &self.luminance
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    /// Number of times the grid was reallocated after construction
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }
}
