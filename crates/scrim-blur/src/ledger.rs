// Author: Dustin Pilgrim
// License: MIT

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use scrim_core::PixelBuffer;

#[derive(Debug, Default)]
struct Counts {
    live: AtomicUsize,
    live_bytes: AtomicUsize,
    allocated: AtomicUsize,
}

/// Accounting for the intermediate buffers a capture task owns.
///
/// Every buffer goes in through [`BufferLedger::track`] and leaves either by
/// being dropped or by [`TrackedBuffer::into_inner`] (ownership handed to the
/// caller). `live() == 0` after a task settles means nothing leaked.
#[derive(Debug, Clone, Default)]
pub struct BufferLedger {
    counts: Arc<Counts>,
}

impl BufferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, buf: PixelBuffer) -> TrackedBuffer {
        let bytes = buf.byte_len();
        self.counts.live.fetch_add(1, Ordering::AcqRel);
        self.counts.live_bytes.fetch_add(bytes, Ordering::AcqRel);
        self.counts.allocated.fetch_add(1, Ordering::AcqRel);
        TrackedBuffer {
            buf,
            bytes,
            ledger: self.clone(),
        }
    }

    /// Buffers currently owned by in-flight work.
    pub fn live(&self) -> usize {
        self.counts.live.load(Ordering::Acquire)
    }

    pub fn live_bytes(&self) -> usize {
        self.counts.live_bytes.load(Ordering::Acquire)
    }

    /// Buffers ever tracked.
    pub fn allocated(&self) -> usize {
        self.counts.allocated.load(Ordering::Acquire)
    }

    fn release(&self, bytes: usize) {
        self.counts.live.fetch_sub(1, Ordering::AcqRel);
        self.counts.live_bytes.fetch_sub(bytes, Ordering::AcqRel);
    }
}

/// A buffer owned by a capture task. Dropping it releases it.
#[derive(Debug)]
pub struct TrackedBuffer {
    buf: PixelBuffer,
    bytes: usize,
    ledger: BufferLedger,
}

impl TrackedBuffer {
    /// Hand the pixels over to the caller; the ledger stops counting them.
    pub fn into_inner(mut self) -> PixelBuffer {
        let empty = PixelBuffer::new(0, 0, self.buf.format());
        std::mem::replace(&mut self.buf, empty)
    }
}

impl Deref for TrackedBuffer {
    type Target = PixelBuffer;

    fn deref(&self) -> &PixelBuffer {
        &self.buf
    }
}

impl Drop for TrackedBuffer {
    fn drop(&mut self) {
        self.ledger.release(self.bytes);
    }
}
