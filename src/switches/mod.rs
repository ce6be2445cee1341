mod grid;
mod switch;

pub use grid::{SwitchGrid, SwitchLayout};
pub use switch::{SwitchInstance, ToggleSwitch};
