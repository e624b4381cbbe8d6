// Author: Dustin Pilgrim
// License: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrimError {
    #[error("buffer size mismatch: {width}x{height} {format:?} needs {expected} bytes, got {actual}")]
    BufferSize {
        width: u32,
        height: u32,
        format: crate::PixelFormat,
        expected: usize,
        actual: usize,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
