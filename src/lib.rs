//! Live video rendered as a grid of animated toggle switches.
//!
//! Frames are downsampled to a 16:9 luminance grid; each cell drives one
//! switch that eases on when the cell is darker than the threshold.

pub mod app;
pub mod clock;
pub mod config;
pub mod gpu;
pub mod math;
pub mod pipeline;
pub mod sampling;
pub mod signal;
pub mod switches;
pub mod viewport;
