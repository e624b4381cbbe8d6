// Author: Dustin Pilgrim
// License: MIT

use serde::{Deserialize, Serialize};

use scrim_blur::CaptureSource;
use scrim_core::{AnchorHandle, PixelBuffer, Rect, SurfaceToken};

/// Where the popup itself goes. Passed straight through to the host; the
/// overlay never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopupPlacement {
    /// Below `anchor`, shifted by the offsets.
    DropDown {
        anchor: AnchorHandle,
        x_offset: i32,
        y_offset: i32,
    },
    /// At absolute screen coordinates.
    At { x: i32, y: i32 },
}

/// Everything the overlay needs from the window system.
///
/// All calls happen on the interactive thread.
pub trait HostEnvironment: CaptureSource {
    /// Current on-screen box of `anchor`, or `None` once it is gone.
    fn on_screen_box(&self, anchor: AnchorHandle) -> Option<Rect>;

    /// Add the darken surface at `rect`, stacked relative to `z_order`,
    /// filled with the ARGB `tint`.
    fn create_overlay_surface(&mut self, rect: Rect, z_order: SurfaceToken, tint: u32);

    fn remove_overlay_surface(&mut self);

    /// Show `blurred` inside the darken surface, scaled to fill it, starting
    /// `top_padding` pixels below its top edge.
    fn present_blurred(&mut self, blurred: PixelBuffer, top_padding: i32);

    fn show_popup(&mut self, at: PopupPlacement);

    fn dismiss_popup(&mut self);
}
