use crate::config::{Settings, SWITCH_FILL};
use crate::sampling::GridDimensions;
use crate::switches::switch::{SwitchInstance, ToggleSwitch};
use crate::viewport::ViewportSample;

/// Cover-fit placement of the grid over the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwitchLayout {
    pub cell_size: f32,
    pub switch_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    columns: u32,
}

impl SwitchLayout {
    /// `None` when the viewport has no area
    pub fn compute(viewport: &ViewportSample, dims: GridDimensions) -> Option<Self> {
        if viewport.is_degenerate() {
            return None;
        }
        let viewport_aspect = viewport.aspect();
        let grid_aspect = dims.aspect();
        // >= 1 whichever side constrains, so the grid always covers
        let scale = (viewport_aspect / grid_aspect).max(grid_aspect / viewport_aspect);

        let (columns, rows) = (dims.width() as f32, dims.height() as f32);
        let cell_size = (viewport.width / columns).ceil() * scale;
        let gutter = (1.0 - SWITCH_FILL) / 2.0;

        Some(Self {
            cell_size,
            switch_size: cell_size * SWITCH_FILL,
            offset_x: (cell_size * columns - viewport.width) / 2.0 - gutter * cell_size,
            offset_y: (cell_size * rows - viewport.height) / 2.0,
            columns: dims.width(),
        })
    }

    /// Top-left corner of cell `index`
    pub fn position(&self, index: usize) -> (f32, f32) {
        let columns = self.columns as usize;
        let x = (index % columns) as f32 * self.cell_size - self.offset_x;
        let y = (index / columns) as f32 * self.cell_size - self.offset_y;
        (x, y)
    }
}

/// One toggle switch per luminance cell
pub struct SwitchGrid {
    switches: Vec<ToggleSwitch>,
    instances: Vec<SwitchInstance>,
    layout: Option<SwitchLayout>,
    resets: u64,
}

impl SwitchGrid {
    pub fn new(cell_count: usize) -> Self {
        Self {
            switches: vec![ToggleSwitch::new(); cell_count],
            instances: Vec::with_capacity(cell_count),
            layout: None,
            resets: 0,
        }
    }

    /// Discard every switch when the cell count changed
    fn resync(&mut self, cell_count: usize) {
        if self.switches.len() == cell_count {
            return;
        }
        log::debug!("Switch grid reset: {} -> {} switches", self.switches.len(), cell_count);
        self.switches = vec![ToggleSwitch::new(); cell_count];
        self.resets += 1;
    }

    /// Lay out the grid and advance every switch by one tick
    pub fn update(
        &mut self,
        luminance: &[f32],
        dims: GridDimensions,
        viewport: &ViewportSample,
        settings: &Settings,
        delta_ms: f32,
    ) {
        self.resync(luminance.len());
        self.layout = SwitchLayout::compute(viewport, dims);
        self.instances.clear();

        for (switch, value) in self.switches.iter_mut().zip(luminance) {
            switch.advance(*value <= settings.threshold, delta_ms);
        }

        let Some(layout) = self.layout else {
            return;
        };
        self.instances.extend(self.switches.iter().enumerate().map(|(i, switch)| {
            let (x, y) = layout.position(i);
            switch.instance(x, y, layout.switch_size, settings.accent)
        }));
    }

    pub fn switches(&self) -> &[ToggleSwitch] {
        &self.switches
    }

    /// Drawable records from the last update
    pub fn instances(&self) -> &[SwitchInstance] {
        &self.instances
    }

    pub fn layout(&self) -> Option<SwitchLayout> {
        self.layout
    }

    /// Number of times the switches were discarded after construction
    pub fn resets(&self) -> u64 {
        self.resets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f32, height: f32) -> ViewportSample {
        ViewportSample {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    #[test]
    fn test_layout_wide_viewport() {
        // 1600x900 against a 16x9 grid: aspects match, scale is 1
        let layout = SwitchLayout::compute(&viewport(1600.0, 900.0), GridDimensions::new(16)).unwrap();
        assert_eq!(layout.cell_size, 100.0);
        assert_eq!(layout.switch_size, 90.0);
        assert!((layout.offset_x - -5.0).abs() < 1e-4);
        assert_eq!(layout.offset_y, 0.0);
        let (x, y) = layout.position(0);
        assert!((x - 5.0).abs() < 1e-4 && y == 0.0);
        let (x, y) = layout.position(17);
        assert!((x - 105.0).abs() < 1e-4 && y == 100.0);
    }

    #[test]
    fn test_layout_covers_tall_viewport() {
        let dims = GridDimensions::new(16);
        let view = viewport(900.0, 1600.0);
        let layout = SwitchLayout::compute(&view, dims).unwrap();

        let grid_width = layout.cell_size * dims.width() as f32;
        let grid_height = layout.cell_size * dims.height() as f32;
        assert!(grid_width >= view.width);
        assert!(grid_height >= view.height);
        // Centered vertically
        assert!((layout.offset_y - (grid_height - view.height) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_layout_degenerate_viewport() {
        assert!(SwitchLayout::compute(&viewport(800.0, 0.0), GridDimensions::new(16)).is_none());
    }

    #[test]
    fn test_targets_follow_threshold() {
        let dims = GridDimensions::new(4);
        let mut grid = SwitchGrid::new(dims.cell_count());
        let settings = Settings::default().with_threshold(0.5);
        // 4x3 grid
        let luminance = [0.0, 0.5, 0.51, 1.0, 0.2, 0.8, 0.5, 0.49, 0.9, 0.1, 0.6, 0.3];

        grid.update(&luminance, dims, &viewport(400.0, 300.0), &settings, 1000.0);

        let on: Vec<bool> = grid.switches().iter().map(|s| s.activation() == 1.0).collect();
        assert_eq!(
            on,
            vec![true, true, false, false, true, false, true, true, false, true, false, true]
        );
        assert_eq!(grid.instances().len(), 12);
        assert_eq!(grid.resets(), 0);
    }

    #[test]
    fn test_resize_resets_all_switches() {
        let mut dims = GridDimensions::new(100);
        let mut grid = SwitchGrid::new(dims.cell_count());
        let settings = Settings::default();
        let view = viewport(1920.0, 1080.0);

        let dark = vec![0.0; dims.cell_count()];
        grid.update(&dark, dims, &view, &settings, 16.0);
        assert!(grid.switches().iter().all(|s| s.activation() > 0.0));

        dims.set_width(50);
        let dark = vec![0.0; dims.cell_count()];
        grid.update(&dark, dims, &view, &settings, 0.0);

        assert_eq!(grid.resets(), 1);
        assert_eq!(grid.switches().len(), 50 * 29);
        assert!(grid.switches().iter().all(|s| s.activation() == 0.0));
    }

    #[test]
    fn test_degenerate_viewport_still_animates() {
        let dims = GridDimensions::new(4);
        let mut grid = SwitchGrid::new(dims.cell_count());
        let dark = vec![0.0; dims.cell_count()];

        grid.update(&dark, dims, &viewport(0.0, 0.0), &Settings::default(), 16.0);

        assert!(grid.instances().is_empty());
        assert!(grid.layout().is_none());
        assert!(grid.switches().iter().all(|s| s.activation() > 0.0));
    }
}
