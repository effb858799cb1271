//! Capture device discovery.
//!
//! Devices are immutable snapshots handed out by a [`DeviceDirectory`].
//! The capture graph only references them; it never owns hardware
//! discovery, so tests can substitute a fixed inventory.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the handset a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    /// Faces away from the user.
    Back,
    /// Faces the user.
    Front,
    /// Position not reported by the hardware.
    #[default]
    Unspecified,
}

impl Position {
    /// Returns the position a camera toggle should move to.
    ///
    /// The mapping is total: anything that is not the front camera
    /// toggles to the back one.
    pub fn opposite(self) -> Position {
        match self {
            Position::Back => Position::Front,
            Position::Front | Position::Unspecified => Position::Back,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Back => write!(f, "back"),
            Position::Front => write!(f, "front"),
            Position::Unspecified => write!(f, "unspecified"),
        }
    }
}

/// Physical camera module kinds, as reported by discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceType {
    TripleCamera,
    DualWideCamera,
    DualCamera,
    WideAngleCamera,
    TrueDepthCamera,
}

/// Preferred back camera kinds, best first.
pub const BACK_PREFERENCE: &[DeviceType] = &[
    DeviceType::TripleCamera,
    DeviceType::DualWideCamera,
    DeviceType::DualCamera,
    DeviceType::WideAngleCamera,
];

/// Preferred front camera kinds, best first.
pub const FRONT_PREFERENCE: &[DeviceType] =
    &[DeviceType::TrueDepthCamera, DeviceType::WideAngleCamera];

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A capture device snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Stable identifier.
    pub id: String,
    /// Human readable name.
    pub name: String,
    pub position: Position,
    pub device_type: DeviceType,
    /// Dimensions of the active format.
    pub dimensions: Dimensions,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        position: Position,
        device_type: DeviceType,
        dimensions: Dimensions,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            position,
            device_type,
            dimensions,
        }
    }

    /// Returns true if the camera faces the user.
    pub fn faces_user(&self) -> bool {
        self.position == Position::Front
    }
}

/// Source of capture devices.
///
/// Implementors only provide [`discover`](DeviceDirectory::discover);
/// resolution by preference order is shared.
pub trait DeviceDirectory: Send + Sync {
    /// Lists available devices of the given kinds at a position.
    ///
    /// Results are ordered by the order of `types`, so the first entry
    /// is the most preferred available device.
    fn discover(&self, types: &[DeviceType], position: Position) -> Vec<Device>;

    /// Returns the most preferred available device at `position`.
    fn resolve_default(&self, position: Position) -> Option<Device> {
        let types = match position {
            Position::Back => BACK_PREFERENCE,
            Position::Front => FRONT_PREFERENCE,
            Position::Unspecified => return None,
        };
        self.discover(types, position).into_iter().next()
    }

    /// Returns the camera a fresh graph starts with: back, then front.
    fn resolve_initial(&self) -> Option<Device> {
        self.resolve_default(Position::Back)
            .or_else(|| self.resolve_default(Position::Front))
    }

    /// Last-resort device when the current position is not known.
    fn resolve_fallback(&self) -> Option<Device> {
        self.discover(&[DeviceType::DualCamera], Position::Back)
            .into_iter()
            .next()
    }
}

/// Fixed device inventory.
///
/// Used by the simulated backend and as a test fixture.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    devices: Vec<Device>,
}

impl StaticDirectory {
    pub fn new(devices: Vec<Device>) -> Self {
        Self { devices }
    }

    /// Inventory of a typical handset: a back triple camera and a
    /// front true-depth camera.
    pub fn handset() -> Self {
        Self::new(vec![
            Device::new(
                "back-triple",
                Position::Back,
                DeviceType::TripleCamera,
                Dimensions::new(1920, 1080),
            ),
            Device::new(
                "front-true-depth",
                Position::Front,
                DeviceType::TrueDepthCamera,
                Dimensions::new(1280, 720),
            ),
        ])
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }
}

impl DeviceDirectory for StaticDirectory {
    fn discover(&self, types: &[DeviceType], position: Position) -> Vec<Device> {
        types
            .iter()
            .flat_map(|kind| {
                self.devices
                    .iter()
                    .filter(move |d| d.device_type == *kind && d.position == position)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, position: Position, kind: DeviceType) -> Device {
        Device::new(id, position, kind, Dimensions::new(640, 480))
    }

    #[test]
    fn test_back_preference_order() {
        let directory = StaticDirectory::new(vec![
            device("wide", Position::Back, DeviceType::WideAngleCamera),
            device("dual", Position::Back, DeviceType::DualCamera),
            device("dual-wide", Position::Back, DeviceType::DualWideCamera),
        ]);

        let resolved = directory.resolve_default(Position::Back).unwrap();
        assert_eq!(resolved.id, "dual-wide");
    }

    #[test]
    fn test_front_preference_order() {
        let directory = StaticDirectory::new(vec![
            device("front-wide", Position::Front, DeviceType::WideAngleCamera),
            device("front-depth", Position::Front, DeviceType::TrueDepthCamera),
        ]);

        let resolved = directory.resolve_default(Position::Front).unwrap();
        assert_eq!(resolved.id, "front-depth");
    }

    #[test]
    fn test_front_ignores_back_only_kinds() {
        let directory = StaticDirectory::new(vec![device(
            "front-triple",
            Position::Front,
            DeviceType::TripleCamera,
        )]);

        assert!(directory.resolve_default(Position::Front).is_none());
    }

    #[test]
    fn test_initial_falls_back_to_front() {
        let directory = StaticDirectory::new(vec![device(
            "front",
            Position::Front,
            DeviceType::WideAngleCamera,
        )]);

        assert_eq!(directory.resolve_initial().unwrap().id, "front");
        assert!(StaticDirectory::default().resolve_initial().is_none());
    }

    #[test]
    fn test_unspecified_resolves_nothing() {
        let directory = StaticDirectory::handset();
        assert!(directory.resolve_default(Position::Unspecified).is_none());
    }

    #[test]
    fn test_opposite_is_total() {
        assert_eq!(Position::Back.opposite(), Position::Front);
        assert_eq!(Position::Front.opposite(), Position::Back);
        assert_eq!(Position::Unspecified.opposite(), Position::Back);
    }
}
