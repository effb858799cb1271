//! Prometheus metrics for the capture pipeline.
//!
//! # Metrics Exposed
//!
//! ## State
//! - `noir_camera_authorized` - Camera access granted (1=yes, 0=no)
//! - `noir_camera_configured` - Capture graph configured (1=yes, 0=no)
//!
//! ## Frames
//! - `noir_camera_frames_received_total` - Frames stored by the bridge
//! - `noir_camera_frames_dropped_total` - Frames overwritten before rendering
//! - `noir_camera_frames_rendered_total` - Frames presented on the surface
//!
//! ## Use case
//! - `noir_camera_actions_processed_total` - Actions reduced by the store
//!
//! With the `metrics` feature, [`MetricsServer`] serves them over HTTP on
//! `/metrics`, with a liveness probe on `/health`.
//!
//! # Example
//!
//! ```no_run
//! use noir_camera::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     is_authorized: true,
//!     is_configured: true,
//!     frames_received: 120,
//!     frames_dropped: 4,
//!     frames_rendered: 116,
//!     actions_processed: 6,
//! };
//!
//! registry.update(&snapshot);
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
