// Author: Dustin Pilgrim
// License: MIT

pub mod colour;
pub mod config;
pub mod error;
pub mod handle;
pub mod pixels;
pub mod rect;

pub use config::BlurConfig;
pub use error::ScrimError;
pub use handle::{AnchorHandle, SurfaceToken};
pub use pixels::{PixelBuffer, PixelFormat, scaled_size};
pub use rect::{Rect, ScreenExtent};
