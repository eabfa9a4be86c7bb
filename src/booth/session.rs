//! State of one visit to the camera screen.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::experience::Experience;
use crate::api::{ApiError, BoothClient, MediaType};
use crate::camera::{CameraCapture, CameraError, CameraSettings, FrameSource, SourceMode};
use crate::media::{FfmpegVideoWriter, MediaError, MediaStore, Recording};
use crate::preview::DisplaySink;

/// Errors from booth actions. Each one is also reflected in the status line.
#[derive(Debug, thiserror::Error)]
pub enum BoothError {
    #[error("{0}")]
    Camera(#[from] CameraError),

    #[error("{0}")]
    Media(#[from] MediaError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("{0} mode does not record")]
    NotRecordable(Experience),

    #[error("No frame available yet")]
    NoFrame,

    #[error("Not recording")]
    NotRecording,

    #[error("Nothing captured yet")]
    NothingToUpload,
}

/// Colour hint for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Info,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }
}

/// A file produced during the session.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedMedia {
    pub path: PathBuf,
    pub media_type: MediaType,
    pub uploaded: bool,
}

impl CapturedMedia {
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Camera, recording state and captured files for one event experience.
pub struct CaptureSession {
    event_id: i64,
    experience: Experience,
    template_id: Option<i64>,
    store: MediaStore,
    camera: Option<CameraCapture>,
    status: StatusLine,
    recording_seconds: u64,
    output_path: Option<PathBuf>,
    captured: Vec<CapturedMedia>,
}

impl CaptureSession {
    pub fn new(event_id: i64, experience: Experience, store: MediaStore) -> Self {
        Self {
            event_id,
            experience,
            template_id: None,
            store,
            camera: None,
            status: StatusLine::info("Initializing camera..."),
            recording_seconds: 0,
            output_path: None,
            captured: Vec::new(),
        }
    }

    pub fn with_template(mut self, template_id: Option<i64>) -> Self {
        self.template_id = template_id;
        self
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    pub fn experience(&self) -> Experience {
        self.experience
    }

    pub fn template_id(&self) -> Option<i64> {
        self.template_id
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn recording_seconds(&self) -> u64 {
        self.recording_seconds
    }

    /// File of the current or most recent recording.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn captured(&self) -> &[CapturedMedia] {
        &self.captured
    }

    pub fn camera(&self) -> Option<&CameraCapture> {
        self.camera.as_ref()
    }

    pub fn is_camera_ready(&self) -> bool {
        self.camera.as_ref().is_some_and(CameraCapture::is_running)
    }

    pub fn is_recording(&self) -> bool {
        self.camera.as_ref().is_some_and(CameraCapture::is_recording)
    }

    fn fail(&mut self, prefix: &str, error: BoothError) -> BoothError {
        log::error!("{}: {}", prefix, error);
        self.status = StatusLine::error(format!("{}: {}", prefix, error));
        error
    }

    /// Open the camera per `mode` and start previewing into `sink`.
    pub fn start_camera(
        &mut self,
        settings: CameraSettings,
        mode: SourceMode,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<(), BoothError> {
        self.release();
        let mut camera = CameraCapture::new(settings);
        self.status = StatusLine::info("Initializing camera...");
        let result = camera.start(mode, sink);
        self.finish_start(camera, result)
    }

    /// Like [`CaptureSession::start_camera`] with a custom source.
    pub fn start_camera_with<S, F>(
        &mut self,
        settings: CameraSettings,
        opener: F,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<(), BoothError>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, CameraError> + Send + 'static,
    {
        self.release();
        let mut camera = CameraCapture::new(settings);
        self.status = StatusLine::info("Initializing camera...");
        let result = camera.start_with(opener, sink);
        self.finish_start(camera, result)
    }

    fn finish_start(&mut self, camera: CameraCapture, result: Result<(), CameraError>) -> Result<(), BoothError> {
        match result {
            Ok(()) => {
                self.camera = Some(camera);
                self.status = StatusLine::success("Camera ready");
                Ok(())
            }
            Err(e) => Err(self.fail("Camera error", e.into())),
        }
    }

    /// Save the latest frame as a photo.
    pub fn capture_photo(&mut self) -> Result<PathBuf, BoothError> {
        if !self.is_camera_ready() {
            return Err(self.fail("Camera not ready", CameraError::NotRunning.into()));
        }
        let Some(frame) = self.camera.as_ref().and_then(CameraCapture::latest_frame) else {
            return Err(self.fail("Camera not ready", BoothError::NoFrame));
        };

        match self.store.save_photo(&frame) {
            Ok(path) => {
                self.status = StatusLine::success(format!("Photo saved: {}", file_name(&path)));
                self.captured.push(CapturedMedia {
                    path: path.clone(),
                    media_type: MediaType::Photo,
                    uploaded: false,
                });
                Ok(path)
            }
            Err(e) => Err(self.fail("Error capturing photo", e.into())),
        }
    }

    /// Start a recording, or stop the one in progress.
    pub fn toggle_recording(&mut self) -> Result<(), BoothError> {
        if self.is_recording() {
            self.stop_recording().map(|_| ())
        } else {
            self.start_recording()
        }
    }

    /// Begin recording in the session's experience mode.
    pub fn start_recording(&mut self) -> Result<(), BoothError> {
        if !self.experience.records() {
            return Err(self.fail("Failed to start recording", BoothError::NotRecordable(self.experience)));
        }
        if !self.is_camera_ready() {
            return Err(self.fail("Failed to start recording", CameraError::NotRunning.into()));
        }
        if self.is_recording() {
            return Err(self.fail("Failed to start recording", CameraError::AlreadyRecording.into()));
        }
        if self.experience == Experience::Video && !FfmpegVideoWriter::is_available() {
            return Err(self.fail("Failed to start recording", MediaError::FfmpegNotFound.into()));
        }

        let (prefix, ext) = self.experience.file_parts();
        let path = self.store.timestamped_path(prefix, ext);
        let Some(writer) = self.experience.writer(&path) else {
            return Err(self.fail("Failed to start recording", BoothError::NotRecordable(self.experience)));
        };
        let recording = Recording::new(writer, &path, self.experience.auto_stop());

        let started = match self.camera.as_ref() {
            Some(camera) => camera.start_recording(recording),
            None => Err(CameraError::NotRunning),
        };
        if let Err(e) = started {
            return Err(self.fail("Failed to start recording", e.into()));
        }

        self.recording_seconds = 0;
        self.output_path = Some(path);
        self.status = StatusLine::info("Recording started");
        Ok(())
    }

    /// Finish the recording in progress and add its file to the captured media.
    pub fn stop_recording(&mut self) -> Result<CapturedMedia, BoothError> {
        let finished = match self.camera.as_ref() {
            Some(camera) => camera.stop_recording(),
            None => Ok(None),
        };
        self.recording_seconds = 0;

        match finished {
            Ok(Some(summary)) => {
                log::info!(
                    "Recording stopped after {:.1}s ({} frames)",
                    summary.duration.as_secs_f64(),
                    summary.frames
                );
                self.status = StatusLine::success(self.experience.finished_message(summary.duration));
                let media = CapturedMedia {
                    path: summary.path,
                    media_type: self.experience.media_type(),
                    uploaded: false,
                };
                self.output_path = Some(media.path.clone());
                self.captured.push(media.clone());
                Ok(media)
            }
            Ok(None) => Err(self.fail("Failed to stop recording", BoothError::NotRecording)),
            Err(e) => Err(self.fail("Failed to stop recording", e.into())),
        }
    }

    /// Advance the recording timer; call about once a second.
    ///
    /// Updates the "Recording: Ns" status and stops recordings that have
    /// reached their experience's time limit.
    pub fn tick(&mut self) {
        let Some(camera) = self.camera.as_ref() else {
            return;
        };
        let Some(elapsed) = camera.recording_elapsed() else {
            return;
        };

        if camera.recording_expired() {
            log::info!("{} recording reached its limit", self.experience);
            // Failures already land in the status line.
            let _ = self.stop_recording();
            return;
        }

        let seconds = elapsed.as_secs();
        if seconds > 0 && seconds != self.recording_seconds {
            self.recording_seconds = seconds;
            self.status = StatusLine::info(format!("Recording: {}s", seconds));
        }
    }

    /// Upload the newest captured file to the event.
    pub async fn upload_latest(&mut self, client: &BoothClient) -> Result<(), BoothError> {
        let Some(latest) = self.captured.last().cloned() else {
            return Err(self.fail("Upload failed", BoothError::NothingToUpload));
        };

        self.status = StatusLine::info(format!("Uploading {}...", latest.file_name()));
        match client
            .upload_media(self.event_id, &latest.path, latest.media_type, self.template_id)
            .await
        {
            Ok(()) => {
                if let Some(media) = self.captured.last_mut() {
                    media.uploaded = true;
                }
                self.status = StatusLine::success(format!("Uploaded {}", latest.file_name()));
                Ok(())
            }
            Err(e) => Err(self.fail("Upload failed", e.into())),
        }
    }

    /// Stop any recording and close the camera.
    pub fn release(&mut self) {
        if self.is_recording()
            && let Err(e) = self.stop_recording()
        {
            log::warn!("Recording lost while releasing camera: {}", e);
        }
        if let Some(mut camera) = self.camera.take() {
            camera.stop();
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
