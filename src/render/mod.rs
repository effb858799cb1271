//! Render sink contract.
//!
//! Drawing itself belongs to the display surface. The core only binds a
//! surface and triggers redraws; [`Renderer`] picks the latest frame from
//! the slot, works out an aspect-fill scale and hands both to the surface.

use crate::bridge::FrameSlot;
use crate::capture::{Dimensions, Frame};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A display surface able to present frames.
pub trait Surface: Send + Sync {
    /// Current drawable size in pixels.
    fn drawable_size(&self) -> Dimensions;

    /// Presents `frame` scaled uniformly by `scale`.
    fn present(&self, frame: &Frame, scale: f64);
}

/// Handle to a bound display surface.
#[derive(Clone)]
pub struct RenderTarget(Arc<dyn Surface>);

impl RenderTarget {
    pub fn new(surface: Arc<dyn Surface>) -> Self {
        Self(surface)
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.0
    }
}

impl fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderTarget")
            .field(&self.0.drawable_size())
            .finish()
    }
}

/// Something that can be asked to redraw.
pub trait RenderSink: Send + Sync {
    fn redraw(&self);
}

/// Scale that makes `frame` cover `drawable` entirely.
pub fn aspect_fill_scale(frame: Dimensions, drawable: Dimensions) -> f64 {
    if frame.width == 0 || frame.height == 0 {
        return 1.0;
    }
    let horizontal = drawable.width as f64 / frame.width as f64;
    let vertical = drawable.height as f64 / frame.height as f64;
    horizontal.max(vertical)
}

/// Presents the latest slot frame on the bound surface.
pub struct Renderer {
    slot: Arc<FrameSlot>,
    target: Mutex<Option<RenderTarget>>,
}

impl Renderer {
    pub fn new(slot: Arc<FrameSlot>) -> Self {
        Self {
            slot,
            target: Mutex::new(None),
        }
    }

    /// Binds (or rebinds) the display surface.
    pub fn bind(&self, target: RenderTarget) {
        tracing::info!(drawable = %target.surface().drawable_size(), "Render target bound");
        *self.target.lock() = Some(target);
    }

    pub fn is_bound(&self) -> bool {
        self.target.lock().is_some()
    }

    pub fn slot(&self) -> &Arc<FrameSlot> {
        &self.slot
    }

    /// Presents the latest frame. Returns false if there was nothing to
    /// present or nowhere to present it.
    pub fn draw(&self) -> bool {
        let Some(target) = self.target.lock().clone() else {
            return false;
        };
        let Some(frame) = self.slot.take_for_render() else {
            return false;
        };

        let drawable = target.surface().drawable_size();
        let scale = aspect_fill_scale(frame.dimensions(), drawable);
        target.surface().present(&frame, scale);
        true
    }
}

impl RenderSink for Renderer {
    fn redraw(&self) {
        self.draw();
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("bound", &self.is_bound())
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RecordingSurface {
        size: Dimensions,
        presented: Mutex<Vec<(u64, f64)>>,
    }

    impl Surface for RecordingSurface {
        fn drawable_size(&self) -> Dimensions {
            self.size
        }

        fn present(&self, frame: &Frame, scale: f64) {
            self.presented.lock().push((frame.sequence(), scale));
        }
    }

    fn surface(width: u32, height: u32) -> Arc<RecordingSurface> {
        Arc::new(RecordingSurface {
            size: Dimensions::new(width, height),
            presented: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_aspect_fill_scale() {
        // 1080x1920 portrait frame onto a 1170x2532 screen.
        let scale = aspect_fill_scale(Dimensions::new(1080, 1920), Dimensions::new(1170, 2532));
        assert!((scale - 2532.0 / 1920.0).abs() < 1e-9);

        let down = aspect_fill_scale(Dimensions::new(200, 100), Dimensions::new(100, 100));
        assert!((down - 1.0).abs() < 1e-9);

        assert_eq!(aspect_fill_scale(Dimensions::new(0, 10), Dimensions::new(5, 5)), 1.0);
    }

    #[test]
    fn test_draw_without_target_or_frame() {
        let slot = Arc::new(FrameSlot::new());
        let renderer = Renderer::new(Arc::clone(&slot));
        assert!(!renderer.draw());

        let target = surface(10, 10);
        renderer.bind(RenderTarget::new(target.clone()));
        assert!(!renderer.draw());
        assert!(target.presented.lock().is_empty());
    }

    #[test]
    fn test_draw_presents_latest_frame() {
        let slot = Arc::new(FrameSlot::new());
        let renderer = Renderer::new(Arc::clone(&slot));
        let target = surface(20, 10);
        renderer.bind(RenderTarget::new(target.clone()));

        slot.store(Arc::new(Frame::filled(Dimensions::new(10, 10), [0, 0, 0], 1)));
        slot.store(Arc::new(Frame::filled(Dimensions::new(10, 10), [0, 0, 0], 2)));
        renderer.redraw();

        assert_eq!(*target.presented.lock(), vec![(2, 2.0)]);
        assert_eq!(slot.stats().dropped, 1);
        assert!(!slot.is_pending());
    }
}
