//! Latest-value frame cell.
//!
//! One writer (the producer thread) overwrites, one reader (the renderer)
//! peeks. Nothing is ever queued: a frame that is overwritten before it was
//! rendered is counted as dropped and discarded.

use crate::capture::Frame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing slot traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    /// Frames written into the slot.
    pub stored: u64,
    /// Frames overwritten before they were rendered.
    pub dropped: u64,
    /// Render passes that found a frame.
    pub rendered: u64,
}

struct Latest {
    frame: Arc<Frame>,
    rendered: bool,
}

/// Overwrite cell holding at most one frame.
#[derive(Default)]
pub struct FrameSlot {
    latest: Mutex<Option<Latest>>,
    stored: AtomicU64,
    dropped: AtomicU64,
    rendered: AtomicU64,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the held frame.
    ///
    /// Returns true if the previous frame was discarded without having
    /// been rendered.
    pub fn store(&self, frame: Arc<Frame>) -> bool {
        let previous = self.latest.lock().replace(Latest {
            frame,
            rendered: false,
        });
        self.stored.fetch_add(1, Ordering::Relaxed);

        let dropped = matches!(previous, Some(Latest { rendered: false, .. }));
        if dropped {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        dropped
    }

    /// Returns the held frame without marking it rendered.
    pub fn latest(&self) -> Option<Arc<Frame>> {
        self.latest.lock().as_ref().map(|l| Arc::clone(&l.frame))
    }

    /// Returns the held frame for a render pass and marks it rendered.
    ///
    /// The frame stays in the slot so a later redraw can present it again.
    pub fn take_for_render(&self) -> Option<Arc<Frame>> {
        let frame = {
            let mut latest = self.latest.lock();
            let entry = latest.as_mut()?;
            entry.rendered = true;
            Arc::clone(&entry.frame)
        };
        self.rendered.fetch_add(1, Ordering::Relaxed);
        Some(frame)
    }

    /// Returns true if a frame is waiting to be rendered.
    pub fn is_pending(&self) -> bool {
        matches!(*self.latest.lock(), Some(Latest { rendered: false, .. }))
    }

    pub fn clear(&self) {
        self.latest.lock().take();
    }

    pub fn stats(&self) -> SlotStats {
        SlotStats {
            stored: self.stored.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            rendered: self.rendered.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for FrameSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSlot")
            .field("latest", &self.latest().map(|frame| frame.sequence()))
            .field("stats", &self.stats())
            .finish()
    }
}
