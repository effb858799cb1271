//! Effect execution.
//!
//! Effects never touch state. Asynchronous work is spawned onto the
//! runtime and reports back by dispatching a follow-up action.

use super::state::{Action, Effect};
use super::store::StoreHandle;
use crate::bridge::{FrameBridge, NoirFilter, PictureRequests};
use crate::render::{RenderSink, Renderer};
use crate::session::SessionFacade;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Collaborators the effects run against.
#[derive(Clone)]
pub struct Environment {
    pub session: SessionFacade,
    /// Render sink handed to the frame bridge; also receives bound targets.
    pub renderer: Arc<Renderer>,
    pub filter: NoirFilter,
}

impl Environment {
    pub fn new(session: SessionFacade, renderer: Arc<Renderer>, filter: NoirFilter) -> Self {
        Self {
            session,
            renderer,
            filter,
        }
    }
}

pub(crate) struct EffectRunner {
    environment: Environment,
    handle: StoreHandle,
    tasks: JoinSet<()>,
}

impl EffectRunner {
    pub(crate) fn new(environment: Environment, handle: StoreHandle) -> Self {
        Self {
            environment,
            handle,
            tasks: JoinSet::new(),
        }
    }

    pub(crate) fn session(&self) -> &SessionFacade {
        &self.environment.session
    }

    pub(crate) fn run(&mut self, effect: Effect) {
        // Reap finished tasks so the set stays small.
        while self.tasks.try_join_next().is_some() {}

        tracing::debug!(effect = ?effect, "Running effect");
        match effect {
            Effect::BindRenderTarget(target) => self.environment.renderer.bind(target),

            Effect::RequestAccess => {
                let session = self.environment.session.clone();
                let handle = self.handle.clone();
                self.tasks.spawn(async move {
                    let granted = session.request_access().await;
                    handle.send(Action::RequestAccessResponse(granted));
                });
            }

            Effect::ConfigureAndStart => {
                let session = self.environment.session.clone();
                let handle = self.handle.clone();
                let bridge = self.frame_bridge();
                self.tasks.spawn(async move {
                    match session.configure().await {
                        Ok(configuration) => {
                            session.set_frame_consumer(Some(bridge)).await;
                            session.start_running().await;
                            handle.send(Action::SessionConfigured(configuration));
                        }
                        Err(error) => {
                            handle.send(Action::SessionConfiguredWithError(error));
                        }
                    }
                });
            }

            Effect::ToggleCamera => {
                let session = self.environment.session.clone();
                let handle = self.handle.clone();
                self.tasks.spawn(async move {
                    let result = session.toggle_camera().await;
                    handle.send(Action::ChangeCameraResponse(result.err()));
                });
            }
        }
    }

    fn frame_bridge(&self) -> Arc<FrameBridge> {
        let renderer = &self.environment.renderer;
        Arc::new(FrameBridge::new(
            self.environment.filter.clone(),
            Arc::clone(renderer.slot()),
            Arc::clone(renderer) as Arc<dyn RenderSink>,
            Arc::new(self.handle.clone()) as Arc<dyn PictureRequests>,
        ))
    }

    /// Aborts in-flight effects and detaches the frame bridge.
    pub(crate) async fn shutdown(mut self) {
        let in_flight = self.tasks.len();
        self.tasks.shutdown().await;
        self.environment.session.set_frame_consumer(None).await;
        tracing::info!(aborted = in_flight, "Effect runner stopped");
    }
}
