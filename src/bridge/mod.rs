//! Producer-to-renderer frame bridge.
//!
//! [`FrameBridge`] runs on the frame producer's thread. Each frame is
//! filtered, written into the shared [`FrameSlot`] (overwriting whatever was
//! not rendered yet), and the render sink is asked to redraw. When a picture
//! has been requested the same filtered frame is handed back as the
//! captured image.

mod filter;
mod slot;

pub use filter::{NoirFilter, DEFAULT_CONTRAST};
pub use slot::{FrameSlot, SlotStats};

use crate::capture::{Frame, FrameConsumer};
use crate::render::RenderSink;
use std::sync::Arc;

/// Picture request rendezvous with the state owner.
pub trait PictureRequests: Send + Sync {
    /// Reads whether a picture is currently requested.
    ///
    /// Must go through the same synchronization as state writes.
    fn is_taking_picture(&self) -> bool;

    /// Delivers the captured image.
    fn picture_taken(&self, image: Arc<Frame>);
}

/// Frame consumer feeding the renderer and picture requests.
pub struct FrameBridge {
    filter: NoirFilter,
    slot: Arc<FrameSlot>,
    sink: Arc<dyn RenderSink>,
    requests: Arc<dyn PictureRequests>,
}

impl FrameBridge {
    pub fn new(
        filter: NoirFilter,
        slot: Arc<FrameSlot>,
        sink: Arc<dyn RenderSink>,
        requests: Arc<dyn PictureRequests>,
    ) -> Self {
        Self {
            filter,
            slot,
            sink,
            requests,
        }
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }
}

impl FrameConsumer for FrameBridge {
    fn on_frame(&self, frame: Frame) {
        let filtered = Arc::new(self.filter.apply(&frame));

        if self.slot.store(Arc::clone(&filtered)) {
            tracing::trace!(sequence = filtered.sequence(), "Dropped unrendered frame");
        }
        self.sink.redraw();

        if self.requests.is_taking_picture() {
            tracing::debug!(sequence = filtered.sequence(), "Delivering captured picture");
            self.requests.picture_taken(filtered);
        }
    }
}

impl std::fmt::Debug for FrameBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBridge")
            .field("filter", &self.filter)
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Dimensions;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingSink(AtomicU64);

    impl RenderSink for CountingSink {
        fn redraw(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Clears the request on delivery, like the state owner does.
    #[derive(Default)]
    struct OneShotRequest {
        pending: AtomicBool,
        taken: Mutex<Vec<u64>>,
    }

    impl PictureRequests for OneShotRequest {
        fn is_taking_picture(&self) -> bool {
            self.pending.load(Ordering::SeqCst)
        }

        fn picture_taken(&self, image: Arc<Frame>) {
            self.pending.store(false, Ordering::SeqCst);
            self.taken.lock().push(image.sequence());
        }
    }

    fn bridge() -> (FrameBridge, Arc<CountingSink>, Arc<OneShotRequest>) {
        let sink = Arc::new(CountingSink::default());
        let requests = Arc::new(OneShotRequest::default());
        let bridge = FrameBridge::new(
            NoirFilter::default(),
            Arc::new(FrameSlot::new()),
            sink.clone(),
            requests.clone(),
        );
        (bridge, sink, requests)
    }

    fn frame(sequence: u64) -> Frame {
        Frame::filled(Dimensions::new(2, 2), [200, 10, 10], sequence)
    }

    #[test]
    fn test_each_frame_triggers_redraw() {
        let (bridge, sink, requests) = bridge();

        for sequence in 1..=5 {
            bridge.on_frame(frame(sequence));
        }

        assert_eq!(sink.0.load(Ordering::SeqCst), 5);
        assert_eq!(bridge.slot().latest().unwrap().sequence(), 5);
        assert!(requests.taken.lock().is_empty());
    }

    #[test]
    fn test_slot_holds_filtered_frame() {
        let (bridge, _, _) = bridge();
        bridge.on_frame(frame(1));

        let stored = bridge.slot().latest().unwrap();
        let px = &stored.pixels()[..3];
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_picture_delivered_once_per_request() {
        let (bridge, _, requests) = bridge();

        bridge.on_frame(frame(1));
        requests.pending.store(true, Ordering::SeqCst);
        bridge.on_frame(frame(2));
        bridge.on_frame(frame(3));

        assert_eq!(*requests.taken.lock(), vec![2]);
    }
}
