//! Noir Camera Library
//!
//! The core of a live black-and-white viewfinder: a capture graph bound to
//! one camera at a time, a frame bridge that filters every frame and keeps
//! only the newest one for display, and a reducer-driven use case that
//! owns the UI-facing state.
//!
//! # Architecture
//!
//! ```text
//! backend producer ─▶ FrameBridge ─▶ FrameSlot ─▶ Renderer ─▶ Surface
//!                         │
//!                         └─ picture pending? ─▶ Store (State, reduce)
//!                                                  │
//!                                 effects ─▶ SessionFacade ─▶ CaptureGraph
//! ```
//!
//! # Design Principles
//!
//! - **Latest frame wins**: display never queues, stale frames are dropped
//! - **Single state owner**: all state changes go through one mailbox
//! - **Serialized graph mutation**: every reconfiguration holds the graph
//!   lock and is bracketed by begin/commit
//!
//! # Example
//!
//! ```ignore
//! use noir_camera::{
//!     capture::{CaptureConfig, CaptureGraph, MockBackend, StaticDirectory},
//!     bridge::{FrameSlot, NoirFilter},
//!     render::Renderer,
//!     session::{SessionFacade, StaticAuthorization},
//!     usecase::{Action, Environment, State, StoreHandle},
//! };
//! use std::sync::Arc;
//!
//! let backend = MockBackend::new();
//! let graph = CaptureGraph::new(
//!     Box::new(backend.clone()),
//!     Arc::new(StaticDirectory::handset()),
//!     CaptureConfig::default(),
//! );
//! let session = SessionFacade::new(graph, Arc::new(StaticAuthorization::authorized()));
//! let renderer = Arc::new(Renderer::new(Arc::new(FrameSlot::new())));
//!
//! let (store, _task) = StoreHandle::spawn(
//!     State::default(),
//!     Environment::new(session, renderer, NoirFilter::default()),
//! );
//! store.send(Action::ViewDidLoad);
//! store.send(Action::ViewWillAppear);
//!
//! let state = store.wait_for(|s| s.is_configured).await;
//! assert!(state.dimensions.is_some());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod capture;
pub mod metrics;
pub mod render;
pub mod session;
pub mod usecase;

// Re-export commonly used types at crate root
pub use bridge::{FrameBridge, FrameSlot, NoirFilter};
pub use capture::{CaptureBackend, CaptureGraph, Frame, GraphError, MockBackend};
pub use render::{Renderer, Surface};
pub use session::{AuthorizationStatus, SessionFacade};
pub use usecase::{reduce, Action, State, StoreHandle};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
