//! Camera capture handle and public API.

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::capture_loop::{CaptureShared, lock, run_capture_loop};
use super::source::{FrameSource, SourceMode, open_source};
use super::types::{CameraError, CameraSettings, Frame, Resolution};
use crate::media::{MediaError, Recording, RecordingSummary};
use crate::preview::DisplaySink;

/// What the capture thread reports once its source is open.
struct SourceInfo {
    resolution: Resolution,
    fps: u32,
    label: String,
}

/// Camera capture handle.
///
/// The source is opened inside a background thread, which then reads frames
/// until [`CameraCapture::stop`] is called or the handle is dropped. The
/// latest frame is kept in a shared buffer; an optional [`Recording`] is fed
/// every frame while it is active.
pub struct CameraCapture {
    settings: CameraSettings,
    shared: Arc<CaptureShared>,
    capture_thread: Option<JoinHandle<()>>,
    actual_resolution: Option<Resolution>,
    actual_fps: Option<u32>,
    source_label: Option<String>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("source", &self.source_label)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Create a stopped handle. Nothing is opened until `start`.
    pub fn new(settings: CameraSettings) -> Self {
        Self {
            settings,
            shared: Arc::new(CaptureShared::default()),
            capture_thread: None,
            actual_resolution: None,
            actual_fps: None,
            source_label: None,
        }
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Resolution the source actually delivers, once started.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Frame rate the source reports, once started.
    pub fn actual_fps(&self) -> Option<u32> {
        self.actual_fps
    }

    /// Human-readable name of the open source.
    pub fn source_label(&self) -> Option<&str> {
        self.source_label.as_deref()
    }

    /// Open a source per `mode` and start capturing.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * Any error from opening the source (`NoDevices`, `PermissionDenied`, ...)
    pub fn start(&mut self, mode: SourceMode, sink: Arc<dyn DisplaySink>) -> Result<(), CameraError> {
        let settings = self.settings.clone();
        self.start_with(move || open_source(&settings, mode), sink)
    }

    /// Start capturing from the source built by `opener`.
    ///
    /// `opener` runs on the capture thread. This call blocks until it has
    /// either produced a source or failed.
    pub fn start_with<S, F>(&mut self, opener: F, sink: Arc<dyn DisplaySink>) -> Result<(), CameraError>
    where
        S: FrameSource + 'static,
        F: FnOnce() -> Result<S, CameraError> + Send + 'static,
    {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.shared = Arc::new(CaptureShared::default());
        let shared = Arc::clone(&self.shared);
        let interval = Duration::from_millis(self.settings.loop_interval_ms);
        let (info_tx, info_rx) = mpsc::channel::<Result<SourceInfo, CameraError>>();

        let handle = thread::Builder::new()
            .name("camera-capture".to_string())
            .spawn(move || {
                let source = match opener() {
                    Ok(source) => source,
                    Err(e) => {
                        let _ = info_tx.send(Err(e));
                        return;
                    }
                };
                let _ = info_tx.send(Ok(SourceInfo {
                    resolution: source.resolution(),
                    fps: source.frame_rate(),
                    label: source.describe(),
                }));
                run_capture_loop(source, shared, sink, interval);
            })
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        self.capture_thread = Some(handle);

        match info_rx.recv() {
            Ok(Ok(info)) => {
                log::info!("Camera started: {} at {} ({} fps)", info.label, info.resolution, info.fps);
                self.actual_resolution = Some(info.resolution);
                self.actual_fps = Some(info.fps);
                self.source_label = Some(info.label);
                Ok(())
            }
            Ok(Err(e)) => {
                self.join_thread();
                Err(e)
            }
            Err(_) => {
                self.join_thread();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    fn join_thread(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.capture_thread.take()
            && handle.join().is_err()
        {
            log::error!("Capture thread panicked");
        }
    }

    /// Stop the capture thread and wait for it to finish.
    ///
    /// A recording still in progress is finished by the thread on its way out.
    pub fn stop(&mut self) {
        if self.capture_thread.is_some() {
            log::info!("Stopping camera");
        }
        self.join_thread();
    }

    /// Get the latest captured frame.
    pub fn latest_frame(&self) -> Option<Frame> {
        lock(&self.shared.latest).clone()
    }

    /// Frames read since the last start.
    pub fn frames_captured(&self) -> u64 {
        self.shared.frames.load(Ordering::Relaxed)
    }

    /// Check if the capture thread is currently running.
    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Hand `recording` to the capture loop.
    pub fn start_recording(&self, recording: Recording) -> Result<(), CameraError> {
        if !self.is_running() {
            return Err(CameraError::NotRunning);
        }
        let mut slot = lock(&self.shared.recording);
        if slot.is_some() {
            return Err(CameraError::AlreadyRecording);
        }
        log::info!("Recording to {}", recording.path().display());
        *slot = Some(recording);
        Ok(())
    }

    /// Take the active recording back from the loop and finish it.
    ///
    /// Returns `Ok(None)` when nothing was recording.
    pub fn stop_recording(&self) -> Result<Option<RecordingSummary>, MediaError> {
        let recording = lock(&self.shared.recording).take();
        match recording {
            Some(recording) => recording.finish().map(Some),
            None => Ok(None),
        }
    }

    pub fn is_recording(&self) -> bool {
        lock(&self.shared.recording).is_some()
    }

    /// Time since the active recording started.
    pub fn recording_elapsed(&self) -> Option<Duration> {
        lock(&self.shared.recording).as_ref().map(Recording::elapsed)
    }

    /// Whether the active recording has reached its time limit.
    pub fn recording_expired(&self) -> bool {
        lock(&self.shared.recording)
            .as_ref()
            .is_some_and(Recording::is_expired)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}
