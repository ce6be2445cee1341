mod dimensions;
mod sampler;
mod source;

pub use dimensions::GridDimensions;
pub use sampler::{luminance_of, mirrored_index, BrightnessSampler, Orientation};
pub use source::{
    acquire, crop_to_aspect, BoxedSource, FrameSource, PendingSource, SourceStatus, StillImage,
    TestPattern, UniformFrame,
};
