//! Metrics collection and registry.

use crate::bridge::SlotStats;
use crate::usecase::State;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of pipeline state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether camera access has been granted.
    pub is_authorized: bool,
    /// Whether the capture graph is configured.
    pub is_configured: bool,
    /// Frames the bridge stored in the slot.
    pub frames_received: u64,
    /// Frames overwritten before they were rendered.
    pub frames_dropped: u64,
    /// Frames presented by the renderer.
    pub frames_rendered: u64,
    /// Actions reduced by the store.
    pub actions_processed: u64,
}

impl MetricsSnapshot {
    /// Builds a snapshot from the published state and the slot counters.
    pub fn from_components(state: &State, slot: SlotStats, actions_processed: u64) -> Self {
        Self {
            is_authorized: state.is_authorized,
            is_configured: state.is_configured,
            frames_received: slot.stored,
            frames_dropped: slot.dropped,
            frames_rendered: slot.rendered,
            actions_processed,
        }
    }
}

/// Prometheus metrics registry for the capture pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    // State gauges
    authorized: IntGauge,
    configured: IntGauge,

    // Frame counters
    frames_received: IntCounter,
    frames_dropped: IntCounter,
    frames_rendered: IntCounter,

    actions_processed: IntCounter,
}

impl MetricsRegistry {
    /// Creates a new registry with all pipeline metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let authorized = IntGauge::new(
            "noir_camera_authorized",
            "Camera access granted (1=yes, 0=no)",
        )?;
        let configured = IntGauge::new(
            "noir_camera_configured",
            "Capture graph configured (1=yes, 0=no)",
        )?;

        let frames_received = IntCounter::new(
            "noir_camera_frames_received_total",
            "Frames filtered and stored for rendering",
        )?;
        let frames_dropped = IntCounter::new(
            "noir_camera_frames_dropped_total",
            "Frames overwritten before being rendered",
        )?;
        let frames_rendered = IntCounter::new(
            "noir_camera_frames_rendered_total",
            "Frames presented on the render target",
        )?;

        let actions_processed = IntCounter::new(
            "noir_camera_actions_processed_total",
            "Actions reduced by the use case store",
        )?;

        registry.register(Box::new(authorized.clone()))?;
        registry.register(Box::new(configured.clone()))?;
        registry.register(Box::new(frames_received.clone()))?;
        registry.register(Box::new(frames_dropped.clone()))?;
        registry.register(Box::new(frames_rendered.clone()))?;
        registry.register(Box::new(actions_processed.clone()))?;

        Ok(Self {
            registry,
            authorized,
            configured,
            frames_received,
            frames_dropped,
            frames_rendered,
            actions_processed,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.authorized.set(snapshot.is_authorized as i64);
        self.configured.set(snapshot.is_configured as i64);

        // Snapshots carry running totals; counters only move forward.
        advance(&self.frames_received, snapshot.frames_received);
        advance(&self.frames_dropped, snapshot.frames_dropped);
        advance(&self.frames_rendered, snapshot.frames_rendered);
        advance(&self.actions_processed, snapshot.actions_processed);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            is_authorized: true,
            is_configured: true,
            frames_received: 12,
            frames_dropped: 3,
            frames_rendered: 9,
            actions_processed: 5,
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("noir_camera_authorized 1"));
        assert!(output.contains("noir_camera_configured 1"));
        assert!(output.contains("noir_camera_frames_received_total 12"));
        assert!(output.contains("noir_camera_frames_dropped_total 3"));
        assert!(output.contains("noir_camera_actions_processed_total 5"));
    }

    #[test]
    fn test_counters_never_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames_rendered: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames_rendered: 4,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("noir_camera_frames_rendered_total 10"));
        assert!(output.contains("noir_camera_authorized 0"));
    }

    #[test]
    fn test_snapshot_from_components() {
        let state = State {
            is_authorized: true,
            ..Default::default()
        };
        let stats = SlotStats {
            stored: 7,
            dropped: 2,
            rendered: 5,
        };

        let snapshot = MetricsSnapshot::from_components(&state, stats, 4);
        assert!(snapshot.is_authorized);
        assert!(!snapshot.is_configured);
        assert_eq!(snapshot.frames_received, 7);
        assert_eq!(snapshot.frames_dropped, 2);
        assert_eq!(snapshot.frames_rendered, 5);
        assert_eq!(snapshot.actions_processed, 4);
    }

    #[test]
    fn test_metrics_encode() {
        let registry = MetricsRegistry::new().unwrap();
        let output = registry.encode().unwrap();

        assert!(output.contains("noir_camera_authorized"));
        assert!(output.contains("noir_camera_frames_dropped_total"));
        assert!(output.contains("noir_camera_actions_processed_total"));
    }
}
