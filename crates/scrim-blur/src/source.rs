// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use scrim_core::{PixelBuffer, Rect, ScreenExtent};

use crate::hardware::AcceleratedBlur;

/// What the capture pipeline needs from the host, called on the
/// interactive thread only.
pub trait CaptureSource {
    /// Snapshot the pixels under `region`, or `None` when the surface has
    /// nothing to give yet (zero measured size, mid-rotation...).
    fn capture_region(&mut self, region: Rect) -> Option<PixelBuffer>;

    /// Force a synchronous measure + layout pass at the given size.
    fn measure_and_layout(&mut self, width: i32, height: i32);

    fn screen_extent(&self) -> ScreenExtent;

    /// Platform blur primitive, when the host has one.
    fn accelerated_blur(&self) -> Option<Arc<dyn AcceleratedBlur>> {
        None
    }
}
