// Author: Dustin Pilgrim
// License: MIT

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use eventline::{debug, warn};
use image::{ColorType, ImageBuffer, Rgb, Rgba, imageops};

use scrim_blur::{AcceleratedBlur, CaptureSource};
use scrim_core::colour::blend_over;
use scrim_core::{
    AnchorHandle, PixelBuffer, PixelFormat, Rect, ScreenExtent, ScrimError, SurfaceToken,
};
use scrim_overlay::{HostEnvironment, PopupPlacement};

/// `image`'s stack blur, standing in for a platform blur primitive.
pub struct FastBlur;

impl AcceleratedBlur for FastBlur {
    fn name(&self) -> &'static str {
        "image-fast-blur"
    }

    fn blur(&self, src: &PixelBuffer, radius: u32) -> Option<PixelBuffer> {
        let (w, h) = (src.width(), src.height());
        // fast_blur is parameterised by sigma; a box of radius r spans ~2 sigma.
        let sigma = (radius as f32 / 2.0).max(0.5);

        let data = match src.format() {
            PixelFormat::Rgba8 => ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(w, h, src.as_bytes().to_vec())
                .map(|img| imageops::fast_blur(&img, sigma).into_raw()),
            PixelFormat::Rgb8 => ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(w, h, src.as_bytes().to_vec())
                .map(|img| imageops::fast_blur(&img, sigma).into_raw()),
        }?;

        PixelBuffer::from_raw(w, h, src.format(), data).ok()
    }
}

#[derive(Debug)]
struct Overlay {
    rect: Rect,
    tint: u32,
    blurred: Option<(PixelBuffer, i32)>,
}

/// A still image playing the part of the screen.
///
/// The captured surface starts `top_inset` rows down, the way an app window
/// sits under a status bar.
pub struct ImageHost {
    screen: PixelBuffer,
    top_inset: i32,
    anchors: HashMap<AnchorHandle, Rect>,
    next_anchor: u64,
    overlay: Option<Overlay>,
    layouts: u32,
}

impl ImageHost {
    pub fn new(screen: PixelBuffer, top_inset: i32) -> Self {
        Self {
            screen,
            top_inset: top_inset.max(0),
            anchors: HashMap::new(),
            next_anchor: 1,
            overlay: None,
            layouts: 0,
        }
    }

    pub fn open(path: &Path, format: PixelFormat, top_inset: i32) -> Result<Self, ScrimError> {
        let img = image::open(path)?;
        let (w, h) = (img.width(), img.height());
        let data = match format {
            PixelFormat::Rgba8 => img.to_rgba8().into_raw(),
            PixelFormat::Rgb8 => img.to_rgb8().into_raw(),
        };
        Ok(Self::new(PixelBuffer::from_raw(w, h, format, data)?, top_inset))
    }

    /// Register a box on screen that placement can refer to.
    pub fn add_anchor(&mut self, rect: Rect) -> AnchorHandle {
        let handle = AnchorHandle(self.next_anchor);
        self.next_anchor += 1;
        self.anchors.insert(handle, rect);
        handle
    }

    pub fn has_blur(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.blurred.is_some())
    }

    /// The screen as it looks right now: the darken surface, with its
    /// blurred image if one was published, over the original pixels.
    pub fn compose(&self) -> PixelBuffer {
        let mut out = self.screen.clone();
        let Some(overlay) = &self.overlay else {
            return out;
        };

        if let Some((blurred, pad)) = &overlay.blurred {
            let target = Rect {
                top: overlay.rect.top + pad,
                ..overlay.rect
            };
            if target.is_empty() {
                debug!("blurred image has no room under {pad}px padding");
            } else if blurred.format() != out.format() {
                warn!(
                    "blurred image is {:?}, screen is {:?}; skipping",
                    blurred.format(),
                    out.format()
                );
            } else {
                let scaled = blurred.resized(target.width() as u32, target.height() as u32);
                paste(&mut out, &scaled, target.left, target.top);
            }
        }

        tint_rect(&mut out, overlay.rect, overlay.tint);
        out
    }
}

pub fn save(buf: &PixelBuffer, path: &Path) -> Result<(), ScrimError> {
    let colour = match buf.format() {
        PixelFormat::Rgba8 => ColorType::Rgba8,
        PixelFormat::Rgb8 => ColorType::Rgb8,
    };
    image::save_buffer(path, buf.as_bytes(), buf.width(), buf.height(), colour)?;
    Ok(())
}

fn bounds(buf: &PixelBuffer) -> Rect {
    Rect::from_xywh(0, 0, buf.width() as i32, buf.height() as i32)
}

/// Copy `src` into `dst` with its top-left at (`x`, `y`), clipped.
fn paste(dst: &mut PixelBuffer, src: &PixelBuffer, x: i32, y: i32) {
    let placed = Rect::from_xywh(x, y, src.width() as i32, src.height() as i32);
    let clip = placed.intersect(&bounds(dst));
    if clip.is_empty() {
        return;
    }

    let ch = dst.format().channels();
    let (dst_row, src_row) = (dst.row_bytes(), src.row_bytes());
    let run = clip.width() as usize * ch;
    let sx = (clip.left - x) as usize * ch;

    for row in clip.top..clip.bottom {
        let sy = (row - y) as usize;
        let s = sy * src_row + sx;
        let d = row as usize * dst_row + clip.left as usize * ch;
        dst.as_bytes_mut()[d..d + run].copy_from_slice(&src.as_bytes()[s..s + run]);
    }
}

fn tint_rect(buf: &mut PixelBuffer, rect: Rect, tint: u32) {
    let clip = rect.intersect(&bounds(buf));
    let ch = buf.format().channels();
    let row_bytes = buf.row_bytes();

    for row in clip.top..clip.bottom {
        let start = row as usize * row_bytes + clip.left as usize * ch;
        let end = start + clip.width() as usize * ch;
        for px in buf.as_bytes_mut()[start..end].chunks_exact_mut(ch) {
            blend_over(px, tint);
        }
    }
}

impl CaptureSource for ImageHost {
    fn capture_region(&mut self, region: Rect) -> Option<PixelBuffer> {
        let on_screen = region.translate(0, self.top_inset);
        let shot = self.screen.crop(on_screen);
        (!shot.is_empty()).then_some(shot)
    }

    fn measure_and_layout(&mut self, width: i32, height: i32) {
        // Nothing to lay out in a still image.
        self.layouts += 1;
        debug!("layout pass {} at {width}x{height}", self.layouts);
    }

    fn screen_extent(&self) -> ScreenExtent {
        ScreenExtent::new(self.screen.width() as i32, self.screen.height() as i32)
    }

    fn accelerated_blur(&self) -> Option<Arc<dyn AcceleratedBlur>> {
        Some(Arc::new(FastBlur))
    }
}

impl HostEnvironment for ImageHost {
    fn on_screen_box(&self, anchor: AnchorHandle) -> Option<Rect> {
        self.anchors.get(&anchor).copied()
    }

    fn create_overlay_surface(&mut self, rect: Rect, z_order: SurfaceToken, tint: u32) {
        debug!("darken surface {rect:?} under {z_order:?}, tint #{tint:08X}");
        self.overlay = Some(Overlay {
            rect,
            tint,
            blurred: None,
        });
    }

    fn remove_overlay_surface(&mut self) {
        self.overlay = None;
    }

    fn present_blurred(&mut self, blurred: PixelBuffer, top_padding: i32) {
        match self.overlay.as_mut() {
            Some(overlay) => overlay.blurred = Some((blurred, top_padding)),
            None => warn!("blurred image arrived with no darken surface up"),
        }
    }

    fn show_popup(&mut self, at: PopupPlacement) {
        // A still image has no popup of its own to draw.
        debug!("popup shown at {at:?}");
    }

    fn dismiss_popup(&mut self) {
        debug!("popup dismissed");
    }
}
