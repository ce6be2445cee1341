use image::imageops::FilterType;

use crate::clock::ClockSample;
use crate::config::SharedSettings;
use crate::sampling::{BrightnessSampler, FrameSource, GridDimensions, Orientation, SourceStatus};
use crate::switches::{SwitchGrid, SwitchInstance};
use crate::viewport::ViewportSample;

/// Video frame in, animated switch instances out.
///
/// Each tick samples the source into the luminance grid, then lays out and
/// advances the switch grid against it.
pub struct Pipeline {
    dims: GridDimensions,
    source: Box<dyn FrameSource>,
    sampler: BrightnessSampler,
    switches: SwitchGrid,
    settings: SharedSettings,
    viewport: ViewportSample,
    source_status: SourceStatus,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        settings: SharedSettings,
        viewport: ViewportSample,
        filter: FilterType,
    ) -> Self {
        let dims = GridDimensions::new(settings.get().grid_width);
        let source_status = source.status();
        Self {
            dims,
            source,
            sampler: BrightnessSampler::new(dims, filter),
            switches: SwitchGrid::new(dims.cell_count()),
            settings,
            viewport,
            source_status,
        }
    }

    pub fn tick(&mut self, clock: &ClockSample) {
        let settings = self.settings.get();

        let frame = self.source.next_frame(clock);
        self.sampler
            .sample(self.dims, frame, Orientation::from_invert(settings.invert));
        self.track_source_status();

        self.switches.update(
            self.sampler.luminance(),
            self.dims,
            &self.viewport,
            &settings,
            clock.delta_ms as f32,
        );
    }

    fn track_source_status(&mut self) {
        let status = self.source.status();
        if status == self.source_status {
            return;
        }
        match status {
            SourceStatus::Failed => log::warn!("No video frames; grid reads as all-dark"),
            SourceStatus::Live => log::info!("Video frames arriving"),
            SourceStatus::Pending => {}
        }
        self.source_status = status;
    }

    /// Grid width control hook; the buffers resync on the next tick
    pub fn resize_grid(&mut self, width: u32) {
        self.dims.set_width(width);
        log::info!("Grid {}x{}", self.dims.width(), self.dims.height());
    }

    pub fn set_viewport(&mut self, viewport: ViewportSample) {
        self.viewport = viewport;
    }

    pub fn instances(&self) -> &[SwitchInstance] {
        self.switches.instances()
    }

    pub fn luminance(&self) -> &[f32] {
        self.sampler.luminance()
    }

    pub fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    pub fn source_status(&self) -> SourceStatus {
        self.source_status
    }

    pub fn sampler(&self) -> &BrightnessSampler {
        &self.sampler
    }

    pub fn switches(&self) -> &SwitchGrid {
        &self.switches
    }
}
