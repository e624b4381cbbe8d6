// Author: Dustin Pilgrim
// License: MIT
//
// Reference blur: repeated separable box blur.
//
// Each pass slides a (2r + 1) window along every row, then every column,
// keeping a running sum so the cost per pass is O(w * h) whatever the radius.
// Edges are clamped (the border pixel repeats outwards). Three passes of a
// box filter are visually close to a gaussian.

use scrim_core::PixelBuffer;

use crate::kernel::{BlurKernel, CancelFlag, KernelError};

pub const DEFAULT_PASSES: u32 = 3;

#[derive(Debug, Clone, Copy)]
pub struct SoftwareKernel {
    passes: u32,
}

impl Default for SoftwareKernel {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
        }
    }
}

impl SoftwareKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passes(passes: u32) -> Self {
        Self {
            passes: passes.max(1),
        }
    }
}

impl BlurKernel for SoftwareKernel {
    fn name(&self) -> &'static str {
        "software"
    }

    fn blur(
        &self,
        src: &PixelBuffer,
        radius: u32,
        cancel: &CancelFlag,
    ) -> Result<PixelBuffer, KernelError> {
        let mut out = src.clone();
        if radius == 0 || src.is_empty() {
            return Ok(out);
        }

        let w = src.width() as usize;
        let h = src.height() as usize;
        let ch = src.format().channels();
        let mut scratch = vec![0u8; out.byte_len()];

        for _ in 0..self.passes {
            // rows: out -> scratch
            for y in 0..h {
                if cancel.is_cancelled() {
                    return Err(KernelError::Cancelled);
                }
                let line = Line { base: y * w * ch, stride: ch, len: w };
                box_line(out.as_bytes(), &mut scratch, line, ch, radius);
            }

            // columns: scratch -> out
            for x in 0..w {
                if cancel.is_cancelled() {
                    return Err(KernelError::Cancelled);
                }
                let line = Line { base: x * ch, stride: w * ch, len: h };
                box_line(&scratch, out.as_bytes_mut(), line, ch, radius);
            }
        }

        Ok(out)
    }
}

#[derive(Clone, Copy)]
struct Line {
    base: usize,
    stride: usize,
    len: usize,
}

fn box_line(src: &[u8], dst: &mut [u8], line: Line, ch: usize, radius: u32) {
    let r = radius as u64;
    let last = line.len - 1;
    let div = 2 * r + 1;

    for c in 0..ch {
        let idx = |i: usize| line.base + i * line.stride + c;
        let at = |i: usize| src[idx(i)] as u64;

        // Window centred on 0: the left half is all clamped to pixel 0.
        let mut sum = (r + 1) * at(0);
        let inside = r.min(last as u64) as usize;
        for i in 1..=inside {
            sum += at(i);
        }
        if r > last as u64 {
            sum += (r - last as u64) * at(last);
        }

        for x in 0..line.len {
            dst[idx(x)] = ((sum + div / 2) / div) as u8;

            let incoming = (x as u64 + r + 1).min(last as u64) as usize;
            let outgoing = (x as u64).saturating_sub(r) as usize;
            sum = sum + at(incoming) - at(outgoing);
        }
    }
}
