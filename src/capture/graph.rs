//! The capture graph: one input, one output, and their connections.
//!
//! [`CaptureGraph`] owns the backend session exclusively. Every topology
//! change happens inside a [`ConfigurationGuard`], which commits the
//! backend configuration when dropped, so callers never observe a
//! half-applied change, including on early return.

use super::backend::{CaptureBackend, ConnectionSettings, DeviceInput, FrameConsumer};
use super::config::CaptureConfig;
use super::device::{DeviceDirectory, Dimensions, Position};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No device resolves, or the resolved device cannot be bound.
    #[error("capture device is unavailable")]
    DeviceUnavailable,
    /// The frame output cannot be attached.
    #[error("capture output is unavailable")]
    OutputUnavailable,
}

/// Result of a successful [`CaptureGraph::configure`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfiguration {
    /// Input bound when configuration finished.
    pub input: Option<DeviceInput>,
    /// Frame dimensions derived from the bound device's active format.
    pub dimensions: Option<Dimensions>,
}

impl GraphConfiguration {
    fn from_input(input: Option<DeviceInput>) -> Self {
        let dimensions = input.as_ref().map(|i| i.device().dimensions);
        Self { input, dimensions }
    }
}

/// Scope guard around a backend configuration bracket.
///
/// `begin_configuration` runs on creation and `commit_configuration` on
/// drop, unconditionally.
pub struct ConfigurationGuard<'a> {
    backend: &'a mut (dyn CaptureBackend + 'static),
}

impl<'a> ConfigurationGuard<'a> {
    pub fn begin(backend: &'a mut (dyn CaptureBackend + 'static)) -> Self {
        backend.begin_configuration();
        Self { backend }
    }
}

impl Deref for ConfigurationGuard<'_> {
    type Target = dyn CaptureBackend;

    fn deref(&self) -> &Self::Target {
        &*self.backend
    }
}

impl DerefMut for ConfigurationGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.backend
    }
}

impl Drop for ConfigurationGuard<'_> {
    fn drop(&mut self) {
        self.backend.commit_configuration();
    }
}

/// Owner of the single capture topology.
pub struct CaptureGraph {
    backend: Box<dyn CaptureBackend>,
    directory: Arc<dyn DeviceDirectory>,
    config: CaptureConfig,
    current_input: Option<DeviceInput>,
    output_attached: bool,
}

impl CaptureGraph {
    pub fn new(
        backend: Box<dyn CaptureBackend>,
        directory: Arc<dyn DeviceDirectory>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            backend,
            directory,
            config,
            current_input: None,
            output_attached: false,
        }
    }

    /// Configures preset, input, output and connections.
    ///
    /// Calling it again keeps the already-bound input and output, so the
    /// graph never holds more than one of each.
    pub fn configure(&mut self) -> Result<GraphConfiguration, GraphError> {
        let Self {
            backend,
            directory,
            config,
            current_input,
            output_attached,
        } = self;
        let mut session = ConfigurationGuard::begin(&mut **backend);

        let preset = if session.supports_preset(config.preferred_preset) {
            config.preferred_preset
        } else {
            config.fallback_preset
        };
        session.set_preset(preset);

        if current_input.is_none() {
            let Some(device) = directory.resolve_initial() else {
                tracing::error!("Default video device is unavailable");
                return Err(GraphError::DeviceUnavailable);
            };
            let input = DeviceInput::new(device);
            if !session.can_add_input(&input) {
                tracing::error!(device = %input.device().id, "Couldn't add video device input");
                return Err(GraphError::DeviceUnavailable);
            }
            session.add_input(&input);
            *current_input = Some(input);
        }

        if !*output_attached {
            if !session.can_add_output() {
                tracing::error!("Couldn't add video output");
                return Err(GraphError::OutputUnavailable);
            }
            session.add_output();
            *output_attached = true;
        }

        normalize_connections(&mut *session, config, current_input.as_ref());

        let configuration = GraphConfiguration::from_input(current_input.clone());
        tracing::info!(
            preset = %preset,
            device = ?configuration.input.as_ref().map(|i| i.device().id.as_str()),
            dimensions = ?configuration.dimensions,
            "Capture graph configured"
        );
        Ok(configuration)
    }

    /// Swaps the bound input for the best device on the opposite side.
    ///
    /// If the new device cannot be bound, the previous input is restored
    /// and `DeviceUnavailable` is returned.
    pub fn toggle_input(&mut self) -> Result<(), GraphError> {
        let current = self.current_input.clone().ok_or(GraphError::DeviceUnavailable)?;
        let position = current.device().position;

        let next_device = match position {
            Position::Back => self.directory.resolve_default(Position::Front),
            Position::Front => self.directory.resolve_default(Position::Back),
            Position::Unspecified => {
                tracing::warn!("Unknown capture position, defaulting to back camera");
                self.directory
                    .resolve_default(Position::Back)
                    .or_else(|| self.directory.resolve_fallback())
            }
        };
        let next = DeviceInput::new(next_device.ok_or(GraphError::DeviceUnavailable)?);

        let Self {
            backend,
            config,
            current_input,
            ..
        } = self;
        let mut session = ConfigurationGuard::begin(&mut **backend);

        session.remove_input(&current);
        let result = if session.can_add_input(&next) {
            session.add_input(&next);
            tracing::info!(
                from = %position,
                to = %next.device().position,
                device = %next.device().id,
                "Switched camera"
            );
            *current_input = Some(next);
            Ok(())
        } else {
            tracing::warn!(
                device = %next.device().id,
                "Couldn't add new input, restoring previous camera"
            );
            if session.can_add_input(&current) {
                session.add_input(&current);
            } else {
                tracing::error!(
                    device = %current.device().id,
                    "Previous camera could not be restored"
                );
                *current_input = None;
            }
            Err(GraphError::DeviceUnavailable)
        };

        // Connections are discarded on topology change.
        normalize_connections(&mut *session, config, current_input.as_ref());
        result
    }

    /// Starts data flow. Idempotent.
    pub fn start_running(&mut self) {
        if self.backend.is_running() {
            return;
        }
        self.backend.start_running();
        tracing::info!("Capture graph running");
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_running()
    }

    /// Installs, replaces or clears the frame consumer.
    pub fn set_frame_consumer(&mut self, consumer: Option<Arc<dyn FrameConsumer>>) {
        tracing::debug!(installed = consumer.is_some(), "Setting frame consumer");
        self.backend.set_frame_consumer(consumer);
    }

    pub fn current_input(&self) -> Option<&DeviceInput> {
        self.current_input.as_ref()
    }

    pub fn current_position(&self) -> Option<Position> {
        self.current_input.as_ref().map(|i| i.device().position)
    }

    pub fn is_front_camera_on(&self) -> bool {
        self.current_position() == Some(Position::Front)
    }

    pub fn is_back_camera_on(&self) -> bool {
        self.current_position() == Some(Position::Back)
    }
}

impl std::fmt::Debug for CaptureGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGraph")
            .field("current_input", &self.current_input)
            .field("output_attached", &self.output_attached)
            .finish()
    }
}

fn normalize_connections(
    session: &mut dyn CaptureBackend,
    config: &CaptureConfig,
    input: Option<&DeviceInput>,
) {
    let mirrored = input.map(|i| i.device().faces_user()).unwrap_or(false);
    session.apply_connection_settings(ConnectionSettings {
        orientation: config.orientation,
        mirrored,
    });
}
