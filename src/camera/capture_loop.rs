//! Background capture thread implementation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use super::source::FrameSource;
use super::types::Frame;
use crate::media::Recording;
use crate::preview::DisplaySink;

/// Pause after a failed read before trying again.
pub const READ_RETRY_DELAY: Duration = Duration::from_millis(100);

/// State shared between [`super::CameraCapture`] and its thread.
#[derive(Default)]
pub struct CaptureShared {
    /// Latest captured frame
    pub latest: Mutex<Option<Frame>>,
    /// Recording fed by the loop, if any
    pub recording: Mutex<Option<Recording>>,
    /// Frames read since start
    pub frames: AtomicU64,
    /// Signal to stop the loop
    pub stop: AtomicBool,
}

/// Lock a mutex, recovering the data if a panicking thread poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the capture loop until the stop flag is set.
///
/// Each frame is counted, written to the active recording, stored as the
/// latest frame and shown on `sink`, in that order. On exit any recording
/// still in progress is finished and the source released.
pub fn run_capture_loop<S: FrameSource>(
    mut source: S,
    shared: Arc<CaptureShared>,
    sink: Arc<dyn DisplaySink>,
    interval: Duration,
) {
    let label = source.describe();
    log::info!("Capture loop started on {}", label);

    while !shared.stop.load(Ordering::Relaxed) {
        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("Frame read failed on {}: {}", label, e);
                thread::sleep(READ_RETRY_DELAY);
                continue;
            }
        };

        let count = shared.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if count % 30 == 0 {
            log::debug!("Captured {} frames", count);
        }

        if let Some(recording) = lock(&shared.recording).as_mut() {
            recording.write(&frame);
        }

        *lock(&shared.latest) = Some(frame.clone());
        sink.show(&frame);

        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    if let Some(recording) = lock(&shared.recording).take() {
        match recording.finish() {
            Ok(summary) => log::info!("Recording finished on shutdown: {}", summary.path.display()),
            Err(e) => log::error!("Recording could not be finished on shutdown: {}", e),
        }
    }

    source.release();
    log::info!(
        "Capture loop stopped on {} after {} frames",
        label,
        shared.frames.load(Ordering::Relaxed)
    );
}
