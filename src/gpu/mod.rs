mod buffers;
mod context;
mod render;

pub use buffers::{RenderParams, SwitchBuffers};
pub use context::GpuContext;
pub use render::RenderPipeline;
