use crate::config::ASPECT_RATIO;

/// Grid size in cells; height follows width at 16:9
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDimensions {
    width: u32,
    height: u32,
}

impl GridDimensions {
    pub fn new(width: u32) -> Self {
        let width = width.max(1);
        Self {
            width,
            height: height_for(width),
        }
    }

    pub fn set_width(&mut self, width: u32) {
        *self = Self::new(width);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

fn height_for(width: u32) -> u32 {
    (width as f64 / ASPECT_RATIO).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_width() {
        let dims = GridDimensions::new(100);
        assert_eq!(dims.height(), 57);
        assert_eq!(dims.cell_count(), 5700);
    }

    #[test]
    fn test_set_width_recomputes_height() {
        let mut dims = GridDimensions::new(100);
        dims.set_width(50);
        assert_eq!((dims.width(), dims.height()), (50, 29));
        dims.set_width(16);
        assert_eq!(dims.height(), 9);
    }

    #[test]
    fn test_zero_width_promoted() {
        let dims = GridDimensions::new(0);
        assert_eq!((dims.width(), dims.height()), (1, 1));
    }

    proptest! {
        #[test]
        fn height_is_ceil_of_nine_sixteenths(w in 1u32..10_000) {
            let dims = GridDimensions::new(w);
            prop_assert_eq!(dims.height(), (w * 9).div_ceil(16));
            prop_assert_eq!(dims.cell_count(), (w * dims.height()) as usize);
        }
    }
}
