//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use crate::permissions::Platform;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, the preview resolution the booth asks cameras for.
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720, for cameras that should capture photos in HD.
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    /// Parse a `WIDTHxHEIGHT` string such as `1280x720`.
    pub fn parse(s: &str) -> Option<Resolution> {
        let (w, h) = s.split_once('x')?;
        let width: u32 = w.trim().parse().ok()?;
        let height: u32 = h.trim().parse().ok()?;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Resolution { width, height })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::VGA
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A captured camera frame, always tightly packed RGB24.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Bytes per RGB pixel.
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Create a frame from RGB data.
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// A solid-colour frame, mostly useful for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::BYTES_PER_PIXEL)
            .collect();
        Self::new(data, width, height)
    }

    /// Resolution of this frame.
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the data length matches the declared dimensions.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }
}

/// Settings for camera capture.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Preferred camera device index
    pub device_index: u32,
    /// Requested capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
    /// Pause between loop iterations, in milliseconds
    pub loop_interval_ms: u64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
            loop_interval_ms: 30,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// No cameras found on the system
    NoDevices,
    /// Failed to query camera devices
    QueryFailed(String),
    /// Failed to open camera
    OpenFailed(String),
    /// Camera permission denied by the operating system
    PermissionDenied,
    /// Failed to start video stream
    StreamFailed(String),
    /// A single frame could not be read or decoded
    ReadFailed(String),
    /// Capture thread is already running
    AlreadyRunning,
    /// Operation needs a running capture thread
    NotRunning,
    /// A recording is already in progress
    AlreadyRecording,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoDevices => write!(f, "No cameras found"),
            CameraError::QueryFailed(msg) => write!(f, "Failed to query cameras: {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::PermissionDenied => match Platform::detect().camera_permission_hint() {
                Some(hint) => write!(f, "Camera permission denied. {}", hint),
                None => write!(f, "Camera permission denied"),
            },
            CameraError::StreamFailed(msg) => write!(f, "Failed to start camera stream: {}", msg),
            CameraError::ReadFailed(msg) => write!(f, "Failed to read frame: {}", msg),
            CameraError::AlreadyRunning => write!(f, "Capture thread is already running"),
            CameraError::NotRunning => write!(f, "Camera is not running"),
            CameraError::AlreadyRecording => write!(f, "Already recording"),
        }
    }
}

impl std::error::Error for CameraError {}
