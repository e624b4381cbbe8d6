// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;

use scrim_core::PixelBuffer;

use crate::kernel::{BlurKernel, CancelFlag, KernelError};

/// Platform blur primitive handed out by the host (GPU, driver, vendor lib).
///
/// Returns `None` when it can't handle this buffer (format, size, missing
/// driver...). Output may differ from the software kernel pixel-for-pixel.
pub trait AcceleratedBlur: Send + Sync {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn blur(&self, src: &PixelBuffer, radius: u32) -> Option<PixelBuffer>;
}

/// Adapts an [`AcceleratedBlur`] to the [`BlurKernel`] contract.
///
/// The primitive itself can't be interrupted, so cancellation is checked
/// before and after the call.
#[derive(Clone)]
pub struct HardwareKernel {
    primitive: Arc<dyn AcceleratedBlur>,
}

impl HardwareKernel {
    pub fn new(primitive: Arc<dyn AcceleratedBlur>) -> Self {
        Self { primitive }
    }
}

impl BlurKernel for HardwareKernel {
    fn name(&self) -> &'static str {
        self.primitive.name()
    }

    fn blur(
        &self,
        src: &PixelBuffer,
        radius: u32,
        cancel: &CancelFlag,
    ) -> Result<PixelBuffer, KernelError> {
        if cancel.is_cancelled() {
            return Err(KernelError::Cancelled);
        }
        if radius == 0 || src.is_empty() {
            return Ok(src.clone());
        }

        let out = self.primitive.blur(src, radius).ok_or(KernelError::Unsupported)?;

        // A primitive that hands back another shape broke the contract.
        if !out.same_shape(src) {
            eventline::warn!(
                "{} returned {}x{} {:?} for a {}x{} {:?} input",
                self.primitive.name(),
                out.width(),
                out.height(),
                out.format(),
                src.width(),
                src.height(),
                src.format()
            );
            return Err(KernelError::Unsupported);
        }

        if cancel.is_cancelled() {
            return Err(KernelError::Cancelled);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::PixelFormat;

    struct Invert;

    impl AcceleratedBlur for Invert {
        fn blur(&self, src: &PixelBuffer, _radius: u32) -> Option<PixelBuffer> {
            let mut out = src.clone();
            out.as_bytes_mut().iter_mut().for_each(|b| *b = !*b);
            Some(out)
        }
    }

    struct WrongShape;

    impl AcceleratedBlur for WrongShape {
        fn blur(&self, src: &PixelBuffer, _radius: u32) -> Option<PixelBuffer> {
            Some(PixelBuffer::new(src.width() + 1, src.height(), src.format()))
        }
    }

    struct Missing;

    impl AcceleratedBlur for Missing {
        fn blur(&self, _: &PixelBuffer, _: u32) -> Option<PixelBuffer> {
            None
        }
    }

    fn kernel(p: impl AcceleratedBlur + 'static) -> HardwareKernel {
        HardwareKernel::new(Arc::new(p))
    }

    #[test]
    fn delegates_to_primitive() {
        let src = PixelBuffer::new(4, 4, PixelFormat::Rgb8);
        let out = kernel(Invert).blur(&src, 2, &CancelFlag::new()).unwrap();
        assert!(out.as_bytes().iter().all(|&b| b == 255));
    }

    #[test]
    fn radius_zero_skips_primitive() {
        let src = PixelBuffer::new(4, 4, PixelFormat::Rgb8);
        let out = kernel(Invert).blur(&src, 0, &CancelFlag::new()).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn missing_or_misshapen_is_unsupported() {
        let src = PixelBuffer::new(4, 4, PixelFormat::Rgba8);
        let cancel = CancelFlag::new();
        assert_eq!(kernel(Missing).blur(&src, 3, &cancel), Err(KernelError::Unsupported));
        assert_eq!(kernel(WrongShape).blur(&src, 3, &cancel), Err(KernelError::Unsupported));
    }
}
