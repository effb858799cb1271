//! Capture session hardware abstraction.
//!
//! [`CaptureBackend`] is the raw session the capture graph drives: it knows
//! how to bind inputs and outputs but enforces none of the graph's
//! invariants. [`MockBackend`] simulates a handset session and produces
//! synthetic frames.

use super::device::{Device, Dimensions};
use super::frame::{ConnectionInfo, Frame, Orientation, BYTES_PER_PIXEL};
use super::producer::{FrameProducer, Tick};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Capture quality presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPreset {
    Hd1920x1080,
    Hd1280x720,
    /// Generic still-photo quality every session supports.
    Photo,
}

impl fmt::Display for SessionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPreset::Hd1920x1080 => write!(f, "hd1920x1080"),
            SessionPreset::Hd1280x720 => write!(f, "hd1280x720"),
            SessionPreset::Photo => write!(f, "photo"),
        }
    }
}

/// Properties applied to every input/output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub orientation: Orientation,
    pub mirrored: bool,
}

/// A device bound into a capture session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInput {
    device: Device,
}

impl DeviceInput {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

/// Receiver of produced frames.
///
/// Called on the producer's own thread; implementations must not block it
/// for long.
pub trait FrameConsumer: Send + Sync {
    fn on_frame(&self, frame: Frame);
}

/// Raw capture session operations.
///
/// Mutations are expected to happen between
/// [`begin_configuration`](CaptureBackend::begin_configuration) and
/// [`commit_configuration`](CaptureBackend::commit_configuration).
pub trait CaptureBackend: Send {
    fn supports_preset(&self, preset: SessionPreset) -> bool;
    fn set_preset(&mut self, preset: SessionPreset);

    fn begin_configuration(&mut self);
    fn commit_configuration(&mut self);

    fn can_add_input(&self, input: &DeviceInput) -> bool;
    fn add_input(&mut self, input: &DeviceInput);
    fn remove_input(&mut self, input: &DeviceInput);

    fn can_add_output(&self) -> bool;
    fn add_output(&mut self);

    /// Applies settings to all current connections.
    fn apply_connection_settings(&mut self, settings: ConnectionSettings);

    /// Starts frame delivery. Idempotent.
    fn start_running(&mut self);
    fn is_running(&self) -> bool;

    /// Installs, replaces or clears the frame delivery target.
    fn set_frame_consumer(&mut self, consumer: Option<Arc<dyn FrameConsumer>>);
}

struct MockState {
    supported_presets: Vec<SessionPreset>,
    preset: Option<SessionPreset>,
    inputs: Vec<DeviceInput>,
    outputs: usize,
    /// Connections exist only while an input and an output are bound and
    /// are discarded on every topology change.
    connection: Option<ConnectionSettings>,
    configuration_depth: u32,
    commits: u64,
    unbracketed_mutations: u64,
    running: bool,
    consumer: Option<Arc<dyn FrameConsumer>>,
    rejected_devices: HashSet<String>,
    reject_output: bool,
    frame_rate: Option<u32>,
    frame_size: Option<Dimensions>,
    producer: Option<FrameProducer>,
    sequence: u64,
}

impl MockState {
    fn record_mutation(&mut self) {
        if self.configuration_depth == 0 {
            self.unbracketed_mutations += 1;
        }
    }
}

/// Simulated capture session.
///
/// Cloning yields another handle to the same session, so tests can keep a
/// handle for inspection after moving one into a graph.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Creates a session that supports every preset and delivers frames
    /// only when [`emit_frame`](MockBackend::emit_frame) is called.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                supported_presets: vec![
                    SessionPreset::Hd1920x1080,
                    SessionPreset::Hd1280x720,
                    SessionPreset::Photo,
                ],
                preset: None,
                inputs: Vec::new(),
                outputs: 0,
                connection: None,
                configuration_depth: 0,
                commits: 0,
                unbracketed_mutations: 0,
                running: false,
                consumer: None,
                rejected_devices: HashSet::new(),
                reject_output: false,
                frame_rate: None,
                frame_size: None,
                producer: None,
                sequence: 0,
            })),
        }
    }

    /// Delivers frames from a background thread at `fps` once running.
    pub fn with_frame_rate(self, fps: u32) -> Self {
        self.state.lock().frame_rate = Some(fps.max(1));
        self
    }

    /// Overrides the synthetic frame size (defaults to the device format).
    pub fn with_frame_size(self, dimensions: Dimensions) -> Self {
        self.state.lock().frame_size = Some(dimensions);
        self
    }

    /// Restricts the presets the session accepts.
    pub fn with_supported_presets(self, presets: Vec<SessionPreset>) -> Self {
        self.state.lock().supported_presets = presets;
        self
    }

    /// Makes `can_add_input` refuse the given device.
    pub fn reject_device(&self, device_id: &str) {
        self.state.lock().rejected_devices.insert(device_id.to_string());
    }

    /// Makes `can_add_output` refuse.
    pub fn reject_output(&self, reject: bool) {
        self.state.lock().reject_output = reject;
    }

    pub fn preset(&self) -> Option<SessionPreset> {
        self.state.lock().preset
    }

    pub fn inputs(&self) -> Vec<DeviceInput> {
        self.state.lock().inputs.clone()
    }

    pub fn output_count(&self) -> usize {
        self.state.lock().outputs
    }

    pub fn connection(&self) -> Option<ConnectionSettings> {
        self.state.lock().connection
    }

    pub fn commits(&self) -> u64 {
        self.state.lock().commits
    }

    /// Returns true while a configuration bracket is open.
    pub fn in_configuration(&self) -> bool {
        self.state.lock().configuration_depth > 0
    }

    /// Number of topology mutations made outside a configuration bracket.
    pub fn unbracketed_mutations(&self) -> u64 {
        self.state.lock().unbracketed_mutations
    }

    pub fn has_consumer(&self) -> bool {
        self.state.lock().consumer.is_some()
    }

    /// Stops the background producer, if any, and waits for it.
    pub fn stop_running(&self) {
        let producer = {
            let mut state = self.state.lock();
            state.running = false;
            state.producer.take()
        };
        if let Some(producer) = producer {
            producer.stop();
        }
    }

    /// Produces one synthetic frame and hands it to the consumer on the
    /// calling thread.
    ///
    /// Returns the frame's sequence number, or `None` when the session is
    /// not running, has no complete topology, or has no consumer.
    pub fn emit_frame(&self) -> Option<u64> {
        let (consumer, frame) = {
            let mut state = self.state.lock();
            if !state.running || state.outputs == 0 {
                return None;
            }
            let consumer = state.consumer.clone()?;
            let device = state.inputs.first()?.device().clone();
            let connection = state.connection.unwrap_or(ConnectionSettings {
                orientation: Orientation::default(),
                mirrored: false,
            });

            state.sequence += 1;
            let size = state.frame_size.unwrap_or(device.dimensions);
            let frame = synthetic_frame(size, state.sequence).with_connection(ConnectionInfo {
                orientation: connection.orientation,
                mirrored: connection.mirrored,
                source: device.position,
            });
            (consumer, frame)
        };

        let sequence = frame.sequence();
        consumer.on_frame(frame);
        Some(sequence)
    }

    fn spawn_producer(weak: Weak<Mutex<MockState>>, fps: u32) -> FrameProducer {
        let interval = Duration::from_secs(1) / fps;
        FrameProducer::start("mock-capture", interval, move || {
            let Some(state) = weak.upgrade() else {
                return Tick::Stop;
            };
            let backend = MockBackend { state };
            if !backend.state.lock().running {
                return Tick::Stop;
            }
            backend.emit_frame();
            Tick::Continue
        })
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockBackend")
            .field("preset", &state.preset)
            .field("inputs", &state.inputs.len())
            .field("outputs", &state.outputs)
            .field("running", &state.running)
            .finish()
    }
}

/// Gradient that shifts with the sequence number.
fn synthetic_frame(size: Dimensions, sequence: u64) -> Frame {
    let mut pixels = Vec::with_capacity(size.pixel_count() * BYTES_PER_PIXEL);
    let shift = sequence as usize;
    for y in 0..size.height as usize {
        for x in 0..size.width as usize {
            pixels.push(((x + shift) % 256) as u8);
            pixels.push(((y + shift) % 256) as u8);
            pixels.push(((x ^ y) % 256) as u8);
        }
    }
    Frame::new(pixels, size.width, size.height, sequence)
}

impl CaptureBackend for MockBackend {
    fn supports_preset(&self, preset: SessionPreset) -> bool {
        self.state.lock().supported_presets.contains(&preset)
    }

    fn set_preset(&mut self, preset: SessionPreset) {
        let mut state = self.state.lock();
        state.record_mutation();
        state.preset = Some(preset);
    }

    fn begin_configuration(&mut self) {
        self.state.lock().configuration_depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut state = self.state.lock();
        state.configuration_depth = state.configuration_depth.saturating_sub(1);
        if state.configuration_depth == 0 {
            state.commits += 1;
        }
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        let state = self.state.lock();
        state.inputs.is_empty() && !state.rejected_devices.contains(&input.device().id)
    }

    fn add_input(&mut self, input: &DeviceInput) {
        let mut state = self.state.lock();
        state.record_mutation();
        state.inputs.push(input.clone());
        state.connection = None;
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        let mut state = self.state.lock();
        state.record_mutation();
        state.inputs.retain(|bound| bound != input);
        state.connection = None;
    }

    fn can_add_output(&self) -> bool {
        let state = self.state.lock();
        !state.reject_output && state.outputs == 0
    }

    fn add_output(&mut self) {
        let mut state = self.state.lock();
        state.record_mutation();
        state.outputs += 1;
        state.connection = None;
    }

    fn apply_connection_settings(&mut self, settings: ConnectionSettings) {
        let mut state = self.state.lock();
        if !state.inputs.is_empty() && state.outputs > 0 {
            state.connection = Some(settings);
        }
    }

    fn start_running(&mut self) {
        let mut state = self.state.lock();
        if state.running {
            return;
        }
        state.running = true;
        if let Some(fps) = state.frame_rate {
            state.producer = Some(Self::spawn_producer(Arc::downgrade(&self.state), fps));
        }
    }

    fn is_running(&self) -> bool {
        self.state.lock().running
    }

    fn set_frame_consumer(&mut self, consumer: Option<Arc<dyn FrameConsumer>>) {
        self.state.lock().consumer = consumer;
    }
}
