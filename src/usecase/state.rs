//! UI-facing state and the actions that mutate it.

use crate::capture::{Dimensions, Frame, GraphConfiguration, GraphError};
use crate::render::RenderTarget;
use std::sync::Arc;

/// Snapshot published to the UI after every processed action.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub is_authorized: bool,
    pub is_configured: bool,
    /// Set by a tap, cleared when the next frame is delivered as a picture.
    pub is_taking_picture: bool,
    pub is_changing_camera: bool,
    /// Last delivered picture, already filtered.
    pub captured_image: Option<Arc<Frame>>,
    /// Active format of the bound camera, once configured.
    pub dimensions: Option<Dimensions>,
}

/// Everything that can change [`State`].
#[derive(Debug, Clone)]
pub enum Action {
    // User and lifecycle events
    ViewDidLoad,
    ViewWillAppear,
    TakePictureTapped,
    SwitchCameraTapped,
    ConfigureRenderTarget(RenderTarget),

    // Effect results
    RequestAccessResponse(bool),
    SessionConfigured(GraphConfiguration),
    SessionConfiguredWithError(GraphError),
    PictureTaken(Arc<Frame>),
    ChangeCameraResponse(Option<GraphError>),
}

impl Action {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::ViewDidLoad => "view_did_load",
            Action::ViewWillAppear => "view_will_appear",
            Action::TakePictureTapped => "take_picture_tapped",
            Action::SwitchCameraTapped => "switch_camera_tapped",
            Action::ConfigureRenderTarget(_) => "configure_render_target",
            Action::RequestAccessResponse(_) => "request_access_response",
            Action::SessionConfigured(_) => "session_configured",
            Action::SessionConfiguredWithError(_) => "session_configured_with_error",
            Action::PictureTaken(_) => "picture_taken",
            Action::ChangeCameraResponse(_) => "change_camera_response",
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Ask for camera access, answer with `RequestAccessResponse`.
    RequestAccess,
    /// Configure the graph, install the frame bridge, start running, and
    /// answer with `SessionConfigured` or `SessionConfiguredWithError`.
    ConfigureAndStart,
    /// Bind the display surface to the renderer.
    BindRenderTarget(RenderTarget),
    /// Toggle the camera, answer with `ChangeCameraResponse`.
    ToggleCamera,
}
