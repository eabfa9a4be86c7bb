//! An in-progress recording shared between the capture loop and its owner.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{FrameWriter, MediaError};
use crate::camera::Frame;

/// A writer plus the bookkeeping of one recording.
pub struct Recording {
    writer: Box<dyn FrameWriter>,
    path: PathBuf,
    started_at: Instant,
    limit: Option<Duration>,
    write_errors: u64,
}

/// What a finished recording produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub duration: Duration,
    pub frames: u64,
}

impl Recording {
    /// Start recording into `writer`, which will produce `path`.
    ///
    /// Frames arriving after `limit` are dropped; the owner is expected to
    /// notice [`Recording::is_expired`] and finish it.
    pub fn new(writer: Box<dyn FrameWriter>, path: impl Into<PathBuf>, limit: Option<Duration>) -> Self {
        Self {
            writer,
            path: path.into(),
            started_at: Instant::now(),
            limit,
            write_errors: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.limit.is_some_and(|limit| self.elapsed() >= limit)
    }

    pub fn frames_written(&self) -> u64 {
        self.writer.frames_written()
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    /// Feed one frame to the writer.
    ///
    /// Errors are counted and logged rather than returned: one bad frame
    /// should not end the recording.
    pub fn write(&mut self, frame: &Frame) {
        if self.is_expired() {
            return;
        }
        if let Err(e) = self.writer.write_frame(frame) {
            self.write_errors += 1;
            if self.write_errors == 1 {
                log::warn!("Recording to {} failed to write a frame: {}", self.path.display(), e);
            }
        }
    }

    /// Close the writer.
    pub fn finish(self) -> Result<RecordingSummary, MediaError> {
        let duration = self.elapsed();
        let frames = self.writer.frames_written();
        if self.write_errors > 0 {
            log::warn!("{} frame(s) could not be written to {}", self.write_errors, self.path.display());
        }
        let path = self.writer.finish()?;
        Ok(RecordingSummary { path, duration, frames })
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("path", &self.path)
            .field("elapsed", &self.elapsed())
            .field("limit", &self.limit)
            .field("frames", &self.writer.frames_written())
            .finish()
    }
}
