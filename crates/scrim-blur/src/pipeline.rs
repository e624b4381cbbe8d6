// Author: Dustin Pilgrim
// License: MIT
//
// capture -> downscale -> blur -> publish
//
// Capture runs on the caller's (interactive) thread because only that thread
// may touch the host's surfaces. Downscale + blur run on a worker thread.
// The result comes back over a channel and is only handed out by
// `CaptureTask::poll` / `CaptureTask::wait`, back on the caller's side, and
// only when the task was not cancelled.
//
// Buffer ownership: the captured source, the scaled copy and the blurred copy
// are all `TrackedBuffer`s owned by the task. The source is released as soon
// as the scaled copy exists; the scaled copy as soon as the blur finishes.
// A cancelled or failed run drops whatever it holds on the spot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use eventline::{debug, info, warn};

use scrim_core::{BlurConfig, PixelBuffer, Rect, scaled_size};

use crate::hardware::HardwareKernel;
use crate::kernel::{BlurKernel, CancelFlag, KernelError, blur_with_fallback};
use crate::ledger::{BufferLedger, TrackedBuffer};
use crate::software::SoftwareKernel;
use crate::source::CaptureSource;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Diagnostics for one finished blur. Side channel only.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurStats {
    pub kernel: &'static str,
    pub radius: u32,
    pub down_scale: f32,
    pub captured: (u32, u32),
    pub scaled: (u32, u32),
    pub captured_bytes: usize,
    pub blurred_bytes: usize,
    pub elapsed: Duration,
}

/// The published result of a capture task.
#[derive(Debug)]
pub struct BlurredBackground {
    pub buffer: PixelBuffer,
    pub stats: BlurStats,
}

#[derive(Debug)]
pub enum TaskOutcome {
    Blurred(BlurredBackground),
    /// Cancelled before publish. Not an error.
    Cancelled,
    /// The worker died or no kernel could run. Darken without blur.
    Failed(String),
}

/// Result of a non-blocking poll. A settled task is consumed, so it can't be
/// published twice or reused.
#[derive(Debug)]
pub enum Polled {
    Pending(CaptureTask),
    Done(TaskOutcome),
}

#[derive(Debug)]
enum WorkerResult {
    Done {
        blurred: TrackedBuffer,
        stats: BlurStats,
    },
    Cancelled,
    Failed(String),
}

struct BlurJob {
    id: u64,
    source: TrackedBuffer,
    cfg: BlurConfig,
    hardware: Option<HardwareKernel>,
    software: SoftwareKernel,
    ledger: BufferLedger,
    cancel: CancelFlag,
}

/// Handle to one in-flight capture. Dropping it cancels the work.
#[derive(Debug)]
pub struct CaptureTask {
    id: u64,
    cancel: CancelFlag,
    rx: Receiver<WorkerResult>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureTask {
    /// Request cancellation. Best effort: the worker stops at its next
    /// checkpoint, and whatever it produces afterwards is dropped unseen.
    pub fn cancel(&self) {
        if !self.cancel.is_cancelled() {
            debug!("capture task {}: cancel requested", self.id);
        }
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Non-blocking check, for the interactive thread's event loop.
    pub fn poll(self) -> Polled {
        if self.cancel.is_cancelled() {
            return Polled::Done(TaskOutcome::Cancelled);
        }

        match self.rx.try_recv() {
            Ok(result) => Polled::Done(self.settle(result)),
            Err(TryRecvError::Empty) => Polled::Pending(self),
            Err(TryRecvError::Disconnected) => {
                Polled::Done(TaskOutcome::Failed("blur worker exited without a result".into()))
            }
        }
    }

    /// Block until the worker has exited. Used on teardown paths, where the
    /// caller wants every buffer released before moving on.
    pub fn wait(mut self) -> TaskOutcome {
        let result = self.rx.recv();

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture task {}: blur worker panicked", self.id);
            }
        }

        match result {
            Ok(result) => self.settle(result),
            Err(_) => TaskOutcome::Failed("blur worker exited without a result".into()),
        }
    }

    fn settle(&self, result: WorkerResult) -> TaskOutcome {
        match result {
            // Cancel may have landed after the worker's last checkpoint.
            WorkerResult::Done { .. } if self.cancel.is_cancelled() => TaskOutcome::Cancelled,
            WorkerResult::Done { blurred, stats } => TaskOutcome::Blurred(BlurredBackground {
                buffer: blurred.into_inner(),
                stats,
            }),
            WorkerResult::Cancelled => TaskOutcome::Cancelled,
            WorkerResult::Failed(msg) => TaskOutcome::Failed(msg),
        }
    }
}

impl Drop for CaptureTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts capture tasks. Holds the blur settings and the buffer ledger; does
/// not track tasks itself, so starting a second one while another runs is the
/// caller's call (cancel the old one first).
#[derive(Debug)]
pub struct CapturePipeline {
    cfg: BlurConfig,
    software: SoftwareKernel,
    ledger: BufferLedger,
}

impl Default for CapturePipeline {
    fn default() -> Self {
        Self::new(BlurConfig::default())
    }
}

impl CapturePipeline {
    pub fn new(cfg: BlurConfig) -> Self {
        Self {
            cfg: cfg.clamped(),
            software: SoftwareKernel::new(),
            ledger: BufferLedger::new(),
        }
    }

    pub fn config(&self) -> &BlurConfig {
        &self.cfg
    }

    pub fn config_mut(&mut self) -> &mut BlurConfig {
        &mut self.cfg
    }

    pub fn ledger(&self) -> &BufferLedger {
        &self.ledger
    }

    /// Capture `region` now and blur it in the background.
    ///
    /// Returns `None` when there is nothing to blur: the capture stayed
    /// unavailable after one forced layout pass, the region is degenerate, or
    /// the worker couldn't be spawned. Callers show the darken surface
    /// without a blurred image in that case.
    pub fn start<S: CaptureSource + ?Sized>(
        &self,
        source: &mut S,
        region: Rect,
    ) -> Option<CaptureTask> {
        let id = NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed);
        let cfg = self.cfg.clamped();

        let captured = capture_with_retry(source, region)?;
        if captured.is_empty() {
            debug!("capture task {id}: degenerate capture {region:?}, nothing to blur");
            return None;
        }
        debug!(
            "capture task {id}: captured {}x{} from {:?}",
            captured.width(),
            captured.height(),
            region
        );

        let hardware = if cfg.use_hardware_kernel {
            let primitive = source.accelerated_blur();
            if primitive.is_none() {
                debug!("capture task {id}: no accelerated blur on this host, using software");
            }
            primitive.map(HardwareKernel::new)
        } else {
            None
        };

        let cancel = CancelFlag::new();
        let (tx, rx) = mpsc::channel();
        let job = BlurJob {
            id,
            source: self.ledger.track(captured),
            cfg,
            hardware,
            software: self.software,
            ledger: self.ledger.clone(),
            cancel: cancel.clone(),
        };

        let worker = std::thread::Builder::new()
            .name(format!("scrim-blur-{id}"))
            .spawn(move || {
                // A closed receiver means the task was dropped; the result
                // (and its buffers) just goes away with the failed send.
                let _ = tx.send(run_job(job));
            });

        match worker {
            Ok(worker) => Some(CaptureTask {
                id,
                cancel,
                rx,
                worker: Some(worker),
            }),
            Err(e) => {
                warn!("capture task {id}: failed to spawn blur worker: {e}");
                None
            }
        }
    }
}

fn capture_with_retry<S: CaptureSource + ?Sized>(source: &mut S, region: Rect) -> Option<PixelBuffer> {
    let screen = source.screen_extent();
    let region = if screen.is_empty() {
        region
    } else {
        region.clip_to(screen)
    };
    if region.is_empty() {
        debug!("degenerate capture region {region:?}, nothing to blur");
        return None;
    }

    if let Some(buf) = source.capture_region(region) {
        return Some(buf);
    }

    // Right after a rotation the surface can report no size at all.
    // Force a layout at the screen size and give it one more go.
    debug!("capture unavailable, forcing layout at {}x{}", screen.width, screen.height);
    source.measure_and_layout(screen.width, screen.height);

    match source.capture_region(region) {
        Some(buf) => Some(buf),
        None => {
            warn!("capture still unavailable after relayout; skipping blur");
            None
        }
    }
}

fn run_job(job: BlurJob) -> WorkerResult {
    let BlurJob {
        id,
        source,
        cfg,
        hardware,
        software,
        ledger,
        cancel,
    } = job;

    let started = Instant::now();

    if cancel.is_cancelled() {
        return WorkerResult::Cancelled;
    }

    let captured = (source.width(), source.height());
    let captured_bytes = source.byte_len();
    let (w, h) = scaled_size(captured.0, captured.1, cfg.down_scale);

    let scaled = ledger.track(source.resized(w, h));
    drop(source);

    let preferred = hardware.as_ref().map(|k| k as &dyn BlurKernel);
    let (blurred, kernel) = match blur_with_fallback(preferred, &software, &scaled, cfg.radius, &cancel) {
        Ok(v) => v,
        Err(KernelError::Cancelled) => {
            debug!("capture task {id}: cancelled mid-blur");
            return WorkerResult::Cancelled;
        }
        Err(e) => return WorkerResult::Failed(e.to_string()),
    };
    let blurred = ledger.track(blurred);
    drop(scaled);

    if cancel.is_cancelled() {
        debug!("capture task {id}: cancelled before publish");
        return WorkerResult::Cancelled;
    }

    let stats = BlurStats {
        kernel,
        radius: cfg.radius,
        down_scale: cfg.down_scale,
        captured,
        scaled: (w, h),
        captured_bytes,
        blurred_bytes: blurred.byte_len(),
        elapsed: started.elapsed(),
    };

    if cfg.debug {
        info!("blur method: {}", stats.kernel);
        info!("radius: {}", stats.radius);
        info!("down scale factor: {}", stats.down_scale);
        info!("blurred in {} ms", stats.elapsed.as_millis());
        info!(
            "allocation: {} B (capture) + {} B (blurred){}",
            stats.captured_bytes,
            stats.blurred_bytes,
            if kernel == software.name() {
                format!(" + {} B scratch", stats.blurred_bytes)
            } else {
                String::new()
            }
        );
    }

    WorkerResult::Done { blurred, stats }
}
