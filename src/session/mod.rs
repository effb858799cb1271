//! Session facade: the single entry point to the capture graph.
//!
//! All graph mutations go through one async mutex, so configure and toggle
//! never interleave no matter how many tasks call in. Graph operations are
//! synchronous once the lock is held; there is no suspension point inside
//! a mutation.

use crate::capture::{CaptureGraph, FrameConsumer, GraphConfiguration, GraphError, Position};
use async_trait::async_trait;
use parking_lot::Mutex as SyncMutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Camera permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    Restricted,
    NotDetermined,
}

/// Source of camera permission.
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    fn status(&self) -> AuthorizationStatus;

    /// Asks the user for access. May wait indefinitely for an answer.
    async fn request_access(&self) -> bool;
}

/// Fixed permission answers.
#[derive(Debug)]
pub struct StaticAuthorization {
    status: SyncMutex<AuthorizationStatus>,
    grant_on_request: bool,
    requests: SyncMutex<u32>,
}

impl StaticAuthorization {
    /// Starts at `status`; a request answers `grant_on_request` and
    /// settles the status accordingly.
    pub fn new(status: AuthorizationStatus, grant_on_request: bool) -> Self {
        Self {
            status: SyncMutex::new(status),
            grant_on_request,
            requests: SyncMutex::new(0),
        }
    }

    pub fn authorized() -> Self {
        Self::new(AuthorizationStatus::Authorized, true)
    }

    /// Number of access requests made so far.
    pub fn request_count(&self) -> u32 {
        *self.requests.lock()
    }
}

#[async_trait]
impl AuthorizationProvider for StaticAuthorization {
    fn status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    async fn request_access(&self) -> bool {
        *self.requests.lock() += 1;
        let granted = self.grant_on_request;
        *self.status.lock() = if granted {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        };
        granted
    }
}

/// Serialized access to the capture graph plus permission queries.
#[derive(Clone)]
pub struct SessionFacade {
    graph: Arc<Mutex<CaptureGraph>>,
    authorization: Arc<dyn AuthorizationProvider>,
}

impl SessionFacade {
    pub fn new(graph: CaptureGraph, authorization: Arc<dyn AuthorizationProvider>) -> Self {
        Self {
            graph: Arc::new(Mutex::new(graph)),
            authorization,
        }
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.authorization.status()
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization_status() == AuthorizationStatus::Authorized
    }

    pub async fn request_access(&self) -> bool {
        self.authorization.request_access().await
    }

    pub async fn configure(&self) -> Result<GraphConfiguration, GraphError> {
        self.graph.lock().await.configure()
    }

    pub async fn start_running(&self) {
        self.graph.lock().await.start_running();
    }

    pub async fn toggle_camera(&self) -> Result<(), GraphError> {
        self.graph.lock().await.toggle_input()
    }

    pub async fn set_frame_consumer(&self, consumer: Option<Arc<dyn FrameConsumer>>) {
        self.graph.lock().await.set_frame_consumer(consumer);
    }

    pub async fn current_position(&self) -> Option<Position> {
        self.graph.lock().await.current_position()
    }

    pub async fn is_running(&self) -> bool {
        self.graph.lock().await.is_running()
    }
}

impl std::fmt::Debug for SessionFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFacade")
            .field("authorization", &self.authorization_status())
            .finish()
    }
}
