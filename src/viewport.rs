use winit::dpi::PhysicalSize;

use crate::config::MAX_PIXEL_RATIO;
use crate::signal::{Signal, SubscriptionId};

/// Size of the drawing buffer in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportSample {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl ViewportSample {
    pub fn new(logical_width: f64, logical_height: f64, device_ratio: f64) -> Self {
        let pixel_ratio = device_ratio.min(MAX_PIXEL_RATIO);
        Self {
            width: (logical_width * pixel_ratio) as f32,
            height: (logical_height * pixel_ratio) as f32,
            pixel_ratio: pixel_ratio as f32,
        }
    }

    /// Derived from a window's physical size and scale factor
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor)
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// A minimized window has nothing to lay out
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Tracks the display surface size and announces changes
pub struct Viewport {
    sample: ViewportSample,
    on_resize: Signal<ViewportSample>,
}

impl Viewport {
    pub fn new(sample: ViewportSample) -> Self {
        Self {
            sample,
            on_resize: Signal::new(),
        }
    }

    pub fn sample(&self) -> ViewportSample {
        self.sample
    }

    pub fn on_resize(&mut self, listener: impl FnMut(&ViewportSample) + 'static) -> SubscriptionId {
        self.on_resize.subscribe(listener)
    }

    /// Re-derive the buffer size and emit one resize event
    pub fn resize(&mut self, sample: ViewportSample) {
        self.sample = sample;
        log::debug!(
            "Viewport {}x{} @{}x",
            sample.width,
            sample.height,
            sample.pixel_ratio
        );
        self.on_resize.emit(&self.sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_pixel_ratio_is_capped() {
        let sample = ViewportSample::new(800.0, 600.0, 3.0);
        assert_eq!(sample.pixel_ratio, 2.0);
        assert_eq!(sample.width, 1600.0);
        assert_eq!(sample.height, 1200.0);
    }

    #[test]
    fn test_from_physical_undoes_scale_factor() {
        // 1.5x display: 1200x900 physical is 800x600 logical
        let sample = ViewportSample::from_physical(PhysicalSize::new(1200, 900), 1.5);
        assert_eq!(sample.pixel_ratio, 1.5);
        assert!((sample.width - 1200.0).abs() < 1e-3);
        assert!((sample.height - 900.0).abs() < 1e-3);

        // 3x display is capped at 2x
        let sample = ViewportSample::from_physical(PhysicalSize::new(2400, 1800), 3.0);
        assert!((sample.width - 1600.0).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate() {
        assert!(ViewportSample::new(0.0, 600.0, 1.0).is_degenerate());
        assert!(!ViewportSample::new(800.0, 600.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_resize_notifies_each_subscriber_once() {
        let mut viewport = Viewport::new(ViewportSample::new(800.0, 600.0, 1.0));
        let seen = Rc::new(RefCell::new(Vec::new()));

        for _ in 0..2 {
            let sink = seen.clone();
            viewport.on_resize(move |sample| sink.borrow_mut().push(sample.width));
        }
        viewport.resize(ViewportSample::new(1024.0, 768.0, 1.0));

        assert_eq!(*seen.borrow(), vec![1024.0, 1024.0]);
        assert_eq!(viewport.sample().height, 768.0);
    }
}
