//! Camera capture module for webcam access and frame capture.
//!
//! This module provides a high-level API for camera capture operations:
//! - Device enumeration via [`list_devices`]
//! - Frame sources via [`FrameSource`] ([`NokhwaSource`], [`SimulatedSource`])
//! - Background capture via [`CameraCapture`]
//! - Configuration via [`CameraSettings`] and [`Resolution`]

mod capture;
mod capture_loop;
mod device;
mod frame_utils;
mod simulated;
mod source;
mod types;

pub use capture::CameraCapture;
pub use capture_loop::{CaptureShared, READ_RETRY_DELAY, run_capture_loop};
pub use device::{list_devices, probe_order};
pub use frame_utils::mirror_horizontal;
pub use simulated::SimulatedSource;
pub use source::{FrameSource, NokhwaSource, SourceMode, open_first_available, open_source};
pub use types::{CameraError, CameraInfo, CameraSettings, Frame, Resolution};
