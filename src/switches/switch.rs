use crate::config::{ACTIVATION_SNAP, EASING_RATE, NEUTRAL_COLOR, SWITCH_ASPECT};
use crate::math::{clamp, lerp, lerp_color, Rgb};

/// One animated toggle; `activation` eases between 0 (off) and 1 (on)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ToggleSwitch {
    activation: f32,
}

impl ToggleSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activation(&self) -> f32 {
        self.activation
    }

    /// Ease toward on/off, scaled by the tick delta
    pub fn advance(&mut self, selected: bool, delta_ms: f32) -> f32 {
        let target = if selected { 1.0 } else { 0.0 };
        let eased = clamp(lerp(self.activation, target, delta_ms * EASING_RATE), 0.0, 1.0);
        self.activation = if (target - eased).abs() < ACTIVATION_SNAP {
            target
        } else {
            eased
        };
        self.activation
    }

    /// Capsule color for the current activation
    pub fn fill(&self, accent: Rgb) -> Rgb {
        lerp_color(NEUTRAL_COLOR, accent, self.activation)
    }

    pub fn instance(&self, x: f32, y: f32, width: f32, accent: Rgb) -> SwitchInstance {
        let [r, g, b] = self.fill(accent).to_unit();
        SwitchInstance {
            origin: [x, y],
            size: [width, width / SWITCH_ASPECT],
            fill: [r, g, b, 1.0],
            activation: self.activation,
            _padding: [0.0; 3],
        }
    }
}

/// GPU record for one switch.
///
/// Layout: 48 bytes, matching the WGSL `Switch` struct (vec4 aligned to 16).
/// - origin: top-left corner in buffer pixels
/// - size: capsule width and height
/// - fill: sRGB capsule color in [0, 1]
/// - activation: thumb position, 0 = left, 1 = right
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SwitchInstance {
    pub origin: [f32; 2],
    pub size: [f32; 2],
    pub fill: [f32; 4],
    pub activation: f32,
    pub _padding: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ACCENT;

    #[test]
    fn test_instance_size() {
        assert_eq!(std::mem::size_of::<SwitchInstance>(), 48);
    }

    #[test]
    fn test_converges_on_monotonically() {
        let mut switch = ToggleSwitch::new();
        let mut previous = switch.activation();
        for _ in 0..500 {
            let current = switch.advance(true, 16.0);
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(switch.activation(), 1.0);
    }

    #[test]
    fn test_converges_off_monotonically() {
        let mut switch = ToggleSwitch::new();
        for _ in 0..500 {
            switch.advance(true, 16.0);
        }
        let mut previous = switch.activation();
        for _ in 0..500 {
            let current = switch.advance(false, 16.0);
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(switch.activation(), 0.0);
    }

    #[test]
    fn test_long_frame_clamps() {
        let mut switch = ToggleSwitch::new();
        // 250ms * 0.01 overshoots the target
        assert_eq!(switch.advance(true, 250.0), 1.0);
    }

    #[test]
    fn test_zero_delta_holds() {
        let mut switch = ToggleSwitch::new();
        switch.advance(true, 16.0);
        let held = switch.activation();
        assert_eq!(switch.advance(false, 0.0), held);
    }

    #[test]
    fn test_first_step_size() {
        let mut switch = ToggleSwitch::new();
        assert!((switch.advance(true, 16.0) - 0.16).abs() < 1e-6);
    }

    #[test]
    fn test_instance_geometry_and_color() {
        let mut switch = ToggleSwitch::new();
        let off = switch.instance(10.0, 20.0, 16.0, DEFAULT_ACCENT);
        assert_eq!(off.origin, [10.0, 20.0]);
        assert_eq!(off.size, [16.0, 10.0]);
        assert_eq!(switch.fill(DEFAULT_ACCENT), NEUTRAL_COLOR);

        switch.advance(true, 1000.0);
        let on = switch.instance(0.0, 0.0, 16.0, DEFAULT_ACCENT);
        assert_eq!(on.activation, 1.0);
        assert_eq!(switch.fill(DEFAULT_ACCENT), DEFAULT_ACCENT);
        assert_eq!(on.fill[3], 1.0);
    }
}
