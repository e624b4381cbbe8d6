// Author: Dustin Pilgrim
// License: MIT

pub mod hardware;
pub mod kernel;
pub mod ledger;
pub mod pipeline;
pub mod software;
pub mod source;

pub use hardware::{AcceleratedBlur, HardwareKernel};
pub use kernel::{BlurKernel, CancelFlag, KernelError};
pub use ledger::{BufferLedger, TrackedBuffer};
pub use pipeline::{BlurStats, BlurredBackground, CapturePipeline, CaptureTask, Polled, TaskOutcome};
pub use software::SoftwareKernel;
pub use source::CaptureSource;
