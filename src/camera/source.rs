//! Frame sources: the real camera (nokhwa) and how one gets picked.

use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};

use super::device::{list_devices, probe_order};
use super::frame_utils::{convert_to_rgb, mirror_horizontal};
use super::simulated::SimulatedSource;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Anything the capture loop can pull frames from.
///
/// Sources are opened on the capture thread and never leave it, so they do
/// not need to be `Send`.
pub trait FrameSource {
    /// Block until the next frame is available.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;

    /// Resolution the source actually delivers.
    fn resolution(&self) -> Resolution;

    /// Frame rate the source actually delivers.
    fn frame_rate(&self) -> u32;

    /// Short label for logs and the status line.
    fn describe(&self) -> String;

    /// Release the underlying device. Called once when the loop exits.
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        (**self).read_frame()
    }

    fn resolution(&self) -> Resolution {
        (**self).resolution()
    }

    fn frame_rate(&self) -> u32 {
        (**self).frame_rate()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// How [`open_source`] should pick a frame source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Real camera only; failure is an error.
    Camera,
    /// Real camera, falling back to the simulated feed when none opens.
    CameraOrSimulated,
    /// Simulated feed only.
    Simulated,
}

/// A physical camera driven through nokhwa.
pub struct NokhwaSource {
    camera: Camera,
    index: u32,
    mirror: bool,
    released: bool,
}

impl NokhwaSource {
    /// Open the camera at `index` and start its stream.
    pub fn open(index: u32, settings: &CameraSettings) -> Result<Self, CameraError> {
        let mut camera = open_camera_with_fallback(&CameraIndex::Index(index), settings)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let source = Self {
            camera,
            index,
            mirror: settings.mirror,
            released: false,
        };
        log::info!(
            "Opened camera {} at {}@{}fps",
            index,
            source.resolution(),
            source.frame_rate()
        );
        Ok(source)
    }
}

impl FrameSource for NokhwaSource {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::ReadFailed(e.to_string()))?;
        let mut frame = convert_to_rgb(&buffer)?;
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        Ok(frame)
    }

    fn resolution(&self) -> Resolution {
        let res = self.camera.resolution();
        Resolution {
            width: res.width(),
            height: res.height(),
        }
    }

    fn frame_rate(&self) -> u32 {
        self.camera.frame_rate()
    }

    fn describe(&self) -> String {
        format!("camera {}", self.index)
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            if let Err(e) = self.camera.stop_stream() {
                log::warn!("Error releasing camera {}: {}", self.index, e);
            } else {
                log::info!("Camera {} released", self.index);
            }
        }
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    let requested_resolution =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);

    // NV12 is native on macOS, MJPEG is the widest supported elsewhere, and
    // as a last resort the camera picks.
    let format_attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            requested_resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = String::from("no format accepted");
    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = e.to_string(),
        }
    }

    let msg = last_error.to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(last_error))
    }
}

/// Open the first camera that both opens and delivers a test frame.
///
/// The preferred index is tried first, then every other enumerated device.
pub fn open_first_available(settings: &CameraSettings) -> Result<NokhwaSource, CameraError> {
    let devices = list_devices()?;
    if devices.is_empty() {
        return Err(CameraError::NoDevices);
    }

    let mut last_error = None;
    for index in probe_order(settings.device_index, &devices) {
        log::debug!("Trying camera {}...", index);
        match NokhwaSource::open(index, settings) {
            Ok(mut source) => match source.read_frame() {
                Ok(frame) => {
                    log::info!(
                        "Camera {} delivered a {}x{} test frame",
                        index,
                        frame.width,
                        frame.height
                    );
                    return Ok(source);
                }
                Err(e) => {
                    log::warn!("Camera {} opened but could not read frames: {}", index, e);
                    source.release();
                    last_error = Some(e);
                }
            },
            Err(e) => {
                log::warn!("Could not open camera {}: {}", index, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or(CameraError::NoDevices))
}

/// Open a frame source according to `mode`.
pub fn open_source(
    settings: &CameraSettings,
    mode: SourceMode,
) -> Result<Box<dyn FrameSource>, CameraError> {
    match mode {
        SourceMode::Simulated => Ok(Box::new(SimulatedSource::new())),
        SourceMode::Camera => Ok(Box::new(open_first_available(settings)?)),
        SourceMode::CameraOrSimulated => match open_first_available(settings) {
            Ok(source) => Ok(Box::new(source)),
            Err(e) => {
                log::warn!("No usable camera ({}), using simulated camera instead", e);
                Ok(Box::new(SimulatedSource::new()))
            }
        },
    }
}
