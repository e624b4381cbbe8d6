// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};

/// Radius used when nothing else is configured.
pub const DEFAULT_BLUR_RADIUS: u32 = 8;

/// Since the image is going to be blurred, resolution barely matters.
/// Down-scaling first cuts blur time and memory.
pub const DEFAULT_DOWN_SCALE: f32 = 4.0;

/// Popup backdrop defaults: lighter blur on a full-resolution capture.
pub const POPUP_BLUR_RADIUS: u32 = 6;
pub const POPUP_DOWN_SCALE: f32 = 1.0;

/// Blur parameters. Out-of-range input is clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurConfig {
    pub radius: u32,
    pub down_scale: f32,
    pub use_hardware_kernel: bool,
    pub debug: bool,
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BLUR_RADIUS,
            down_scale: DEFAULT_DOWN_SCALE,
            use_hardware_kernel: false,
            debug: false,
        }
    }
}

impl BlurConfig {
    pub fn popup() -> Self {
        Self {
            radius: POPUP_BLUR_RADIUS,
            down_scale: POPUP_DOWN_SCALE,
            use_hardware_kernel: true,
            debug: false,
        }
    }

    /// Negative radius becomes 0.
    pub fn set_radius(&mut self, radius: i64) {
        self.radius = radius.clamp(0, u32::MAX as i64) as u32;
    }

    /// Anything below 1.0 (including NaN) becomes 1.0, i.e. no down-scale.
    pub fn set_down_scale(&mut self, factor: f32) {
        self.down_scale = clamp_down_scale(factor);
    }

    /// Re-apply both floors, for values that arrived through serde or
    /// direct field writes.
    pub fn clamped(mut self) -> Self {
        self.down_scale = clamp_down_scale(self.down_scale);
        self
    }
}

fn clamp_down_scale(factor: f32) -> f32 {
    if factor >= 1.0 { factor } else { 1.0 }
}
