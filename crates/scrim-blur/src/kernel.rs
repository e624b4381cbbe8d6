// Author: Dustin Pilgrim
// License: MIT

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use scrim_core::PixelBuffer;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error("blur cancelled")]
    Cancelled,

    #[error("blur kernel unsupported here")]
    Unsupported,
}

/// Cooperative cancellation shared between the interactive thread and a
/// blur worker. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Turns a pixel buffer into a blurred copy.
///
/// Implementations must:
/// - return a buffer with the input's width, height and format;
/// - return an equal copy for radius 0;
/// - never touch the input;
/// - be deterministic for a given input and radius;
/// - give up with [`KernelError::Cancelled`] once `cancel` is set, checking
///   it often enough that large radii stay responsive.
pub trait BlurKernel: Send + Sync {
    fn name(&self) -> &'static str;

    fn blur(
        &self,
        src: &PixelBuffer,
        radius: u32,
        cancel: &CancelFlag,
    ) -> Result<PixelBuffer, KernelError>;
}

/// Run `preferred` when present, falling back to `fallback` when it reports
/// [`KernelError::Unsupported`]. Returns the buffer plus the name of the
/// kernel that produced it.
pub fn blur_with_fallback(
    preferred: Option<&dyn BlurKernel>,
    fallback: &dyn BlurKernel,
    src: &PixelBuffer,
    radius: u32,
    cancel: &CancelFlag,
) -> Result<(PixelBuffer, &'static str), KernelError> {
    if let Some(kernel) = preferred {
        match kernel.blur(src, radius, cancel) {
            Ok(out) => return Ok((out, kernel.name())),
            Err(KernelError::Cancelled) => return Err(KernelError::Cancelled),
            Err(KernelError::Unsupported) => {
                eventline::debug!(
                    "{} kernel unsupported, falling back to {}",
                    kernel.name(),
                    fallback.name()
                );
            }
        }
    }

    fallback.blur(src, radius, cancel).map(|out| (out, fallback.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_core::PixelFormat;

    struct Refuses;

    impl BlurKernel for Refuses {
        fn name(&self) -> &'static str {
            "refuses"
        }

        fn blur(&self, _: &PixelBuffer, _: u32, _: &CancelFlag) -> Result<PixelBuffer, KernelError> {
            Err(KernelError::Unsupported)
        }
    }

    struct Copies;

    impl BlurKernel for Copies {
        fn name(&self) -> &'static str {
            "copies"
        }

        fn blur(&self, src: &PixelBuffer, _: u32, cancel: &CancelFlag) -> Result<PixelBuffer, KernelError> {
            if cancel.is_cancelled() {
                return Err(KernelError::Cancelled);
            }
            Ok(src.clone())
        }
    }

    #[test]
    fn cancel_flag_is_shared_by_clones() {
        let a = CancelFlag::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn unsupported_preferred_falls_back() {
        let src = PixelBuffer::new(3, 3, PixelFormat::Rgb8);
        let (out, used) =
            blur_with_fallback(Some(&Refuses), &Copies, &src, 4, &CancelFlag::new()).unwrap();
        assert_eq!(used, "copies");
        assert_eq!(out, src);
    }

    #[test]
    fn cancellation_is_not_a_fallback_trigger() {
        let src = PixelBuffer::new(3, 3, PixelFormat::Rgb8);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = blur_with_fallback(Some(&Copies), &Refuses, &src, 4, &cancel).unwrap_err();
        assert_eq!(err, KernelError::Cancelled);
    }
}
