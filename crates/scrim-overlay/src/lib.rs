// Author: Dustin Pilgrim
// License: MIT

pub mod controller;
pub mod host;
pub mod placement;

pub use controller::{OverlayController, OverlayOptions, OverlayState, PumpStatus};
pub use host::{HostEnvironment, PopupPlacement};
pub use placement::{BlurViewport, PlacementSpec, ResolvedRegion, Role};
