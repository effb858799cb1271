//! Capture devices, the capture graph, and frame delivery.
//!
//! The graph is the only owner of the capture topology. Devices come from
//! an injected [`DeviceDirectory`]; the hardware session sits behind the
//! [`CaptureBackend`] trait so a simulated session can stand in for it.

mod backend;
mod config;
mod device;
mod frame;
mod graph;
mod producer;

pub use backend::{
    CaptureBackend, ConnectionSettings, DeviceInput, FrameConsumer, MockBackend, SessionPreset,
};
pub use config::{
    CaptureConfig, ConfigError, DeviceSpec, FileConfig, FilterConfig, LoggingConfig, OutputConfig,
};
pub use device::{
    Device, DeviceDirectory, DeviceType, Dimensions, Position, StaticDirectory, BACK_PREFERENCE,
    FRONT_PREFERENCE,
};
pub use frame::{ConnectionInfo, Frame, Orientation, BYTES_PER_PIXEL};
pub use graph::{CaptureGraph, ConfigurationGuard, GraphConfiguration, GraphError};
pub use producer::{FrameProducer, Tick};
