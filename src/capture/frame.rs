//! Frame type representing a decoded image with connection metadata.

use super::device::{Dimensions, Position};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Bytes per pixel of the packed RGB layout every frame uses.
pub const BYTES_PER_PIXEL: usize = 3;

/// Fixed orientation applied to capture connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Metadata of the connection a frame travelled through.
///
/// Only used to derive orientation and mirroring downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionInfo {
    pub orientation: Orientation,
    pub mirrored: bool,
    /// Position of the device that produced the frame.
    pub source: Position,
}

/// A single decoded image sample.
#[derive(Clone)]
pub struct Frame {
    /// Packed RGB8 pixel data.
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    /// Delivery timestamp.
    timestamp: Instant,
    /// Monotonic sequence number assigned by the producer.
    sequence: u64,
    connection: ConnectionInfo,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            pixels,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
            connection: ConnectionInfo::default(),
        }
    }

    /// Creates a uniformly coloured frame.
    pub fn filled(dimensions: Dimensions, rgb: [u8; 3], sequence: u64) -> Self {
        let pixels = rgb
            .iter()
            .copied()
            .cycle()
            .take(dimensions.pixel_count() * BYTES_PER_PIXEL)
            .collect();
        Self::new(pixels, dimensions.width, dimensions.height, sequence)
    }

    /// Attaches connection metadata.
    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = connection;
        self
    }

    /// Returns a copy of this frame carrying different pixels.
    ///
    /// Dimensions, timestamp, sequence and connection metadata are kept.
    pub fn with_pixels(&self, pixels: Vec<u8>) -> Self {
        Self {
            pixels,
            width: self.width,
            height: self.height,
            timestamp: self.timestamp,
            sequence: self.sequence,
            connection: self.connection,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    #[inline]
    pub fn connection(&self) -> ConnectionInfo {
        self.connection
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.pixels.len() == self.pixel_count() * BYTES_PER_PIXEL
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("connection", &self.connection)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_frame_is_valid() {
        let frame = Frame::filled(Dimensions::new(4, 2), [10, 20, 30], 7);

        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.sequence(), 7);
        assert!(frame.is_valid());
        assert_eq!(&frame.pixels()[..6], &[10, 20, 30, 10, 20, 30]);
    }

    #[test]
    fn test_frame_invalid_size() {
        let frame = Frame::new(vec![0u8; 100], 640, 480, 1);
        assert!(!frame.is_valid());
    }

    #[test]
    fn test_with_pixels_keeps_metadata() {
        let connection = ConnectionInfo {
            orientation: Orientation::Portrait,
            mirrored: true,
            source: Position::Front,
        };
        let frame = Frame::filled(Dimensions::new(1, 1), [1, 2, 3], 3).with_connection(connection);
        let copy = frame.with_pixels(vec![9, 9, 9]);

        assert_eq!(copy.sequence(), 3);
        assert_eq!(copy.connection(), connection);
        assert_eq!(copy.timestamp(), frame.timestamp());
        assert_eq!(copy.pixels(), &[9, 9, 9]);
    }
}
