// Author: Dustin Pilgrim
// License: MIT

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, Rgba};
use serde::{Deserialize, Serialize};

#[cfg(feature = "clap")]
use clap::ValueEnum;

use crate::{Rect, ScrimError};

#[cfg_attr(feature = "clap", derive(ValueEnum))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    #[default]
    Rgba8,
    Rgb8,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// Tightly packed, row-major pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

// Printing megabytes of pixels into a log is never what anyone wants.
impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl PixelBuffer {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.channels();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> Result<Self, ScrimError> {
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(ScrimError::BufferSize {
                width,
                height,
                format,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.channels()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.format == other.format
    }

    /// Channel bytes of one pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let ch = self.format.channels();
        let start = (y as usize * self.width as usize + x as usize) * ch;
        Some(&self.data[start..start + ch])
    }

    /// Copy of the pixels under `rect`, clipped to the buffer.
    pub fn crop(&self, rect: Rect) -> PixelBuffer {
        let bounds = Rect::from_xywh(0, 0, self.width as i32, self.height as i32);
        let r = rect.intersect(&bounds);
        let (w, h) = (r.width().max(0) as u32, r.height().max(0) as u32);

        let mut out = PixelBuffer::new(w, h, self.format);
        if out.is_empty() {
            return out;
        }

        let ch = self.format.channels();
        let src_row = self.row_bytes();
        let dst_row = out.row_bytes();
        for row in 0..h as usize {
            let sy = r.top as usize + row;
            let start = sy * src_row + r.left as usize * ch;
            out.data[row * dst_row..(row + 1) * dst_row]
                .copy_from_slice(&self.data[start..start + dst_row]);
        }
        out
    }

    /// Bilinear resample to `width`x`height`.
    pub fn resized(&self, width: u32, height: u32) -> PixelBuffer {
        if width == self.width && height == self.height {
            return self.clone();
        }
        if self.is_empty() || width == 0 || height == 0 {
            return PixelBuffer::new(width, height, self.format);
        }

        // Lengths are validated at construction, so the views always fit.
        let data = match self.format {
            PixelFormat::Rgba8 => {
                ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(self.width, self.height, &self.data[..])
                    .map(|src| imageops::resize(&src, width, height, FilterType::Triangle).into_raw())
            }
            PixelFormat::Rgb8 => {
                ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(self.width, self.height, &self.data[..])
                    .map(|src| imageops::resize(&src, width, height, FilterType::Triangle).into_raw())
            }
        };

        match data {
            Some(data) => PixelBuffer {
                width,
                height,
                format: self.format,
                data,
            },
            None => PixelBuffer::new(width, height, self.format),
        }
    }
}

/// Down-scaled size for a `width`x`height` capture.
///
/// `h' = ceil(h / factor)`, `w' = ceil(w * h' / h)`; both stay at least 1 for
/// a non-degenerate input. Factors below 1.0 (or NaN) count as 1.0. A
/// zero-area input stays zero-area.
pub fn scaled_size(width: u32, height: u32, factor: f32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let factor = if factor >= 1.0 { factor as f64 } else { 1.0 };
    let h = (height as f64 / factor).ceil().max(1.0);
    let w = (width as f64 * h / height as f64).ceil().max(1.0);

    (w as u32, h as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(w, h, PixelFormat::Rgba8);
        for (i, px) in buf.as_bytes_mut().chunks_exact_mut(4).enumerate() {
            px.copy_from_slice(&[(i % 251) as u8, (i % 13) as u8, 7, 255]);
        }
        buf
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = PixelBuffer::from_raw(2, 2, PixelFormat::Rgb8, vec![0; 11]).unwrap_err();
        assert!(matches!(err, ScrimError::BufferSize { expected: 12, actual: 11, .. }));
    }

    #[test]
    fn crop_copies_rows_and_clips() {
        let buf = gradient(8, 6);
        let c = buf.crop(Rect::new(6, 4, 20, 20));
        assert_eq!((c.width(), c.height()), (2, 2));
        assert_eq!(c.pixel(0, 0), buf.pixel(6, 4));
        assert_eq!(c.pixel(1, 1), buf.pixel(7, 5));

        assert!(buf.crop(Rect::new(10, 10, 12, 12)).is_empty());
    }

    #[test]
    fn scaled_size_matches_popup_defaults() {
        assert_eq!(scaled_size(1080, 1920, 4.0), (270, 480));
        assert_eq!(scaled_size(1080, 1920, 1.0), (1080, 1920));
        assert_eq!(scaled_size(1080, 1920, 0.25), (1080, 1920));
    }

    #[test]
    fn scaled_size_rounds_up_and_never_collapses() {
        assert_eq!(scaled_size(3, 5, 2.0), (2, 3));
        assert_eq!(scaled_size(1, 1, 64.0), (1, 1));
        assert_eq!(scaled_size(1000, 2, 10.0), (500, 1));
        assert_eq!(scaled_size(0, 40, 4.0), (0, 40));
    }

    #[test]
    fn scaled_size_keeps_aspect_within_a_pixel() {
        for &(w, h) in &[(1080u32, 1920u32), (1920, 1080), (333, 777), (17, 3)] {
            for &f in &[1.0f32, 1.5, 2.0, 3.3, 4.0, 7.9] {
                let (sw, sh) = scaled_size(w, h, f);
                assert_eq!(sh, (h as f64 / f as f64).ceil() as u32);
                let ideal = w as f64 * sh as f64 / h as f64;
                assert!((sw as f64 - ideal).abs() <= 1.0, "{w}x{h} @ {f}: {sw}");
            }
        }
    }

    #[test]
    fn resized_changes_shape_only() {
        let buf = gradient(40, 20);
        let small = buf.resized(10, 5);
        assert_eq!((small.width(), small.height()), (10, 5));
        assert_eq!(small.format(), PixelFormat::Rgba8);
        assert_eq!(small.byte_len(), 10 * 5 * 4);
        assert_eq!(buf.resized(40, 20), buf);
    }
}
