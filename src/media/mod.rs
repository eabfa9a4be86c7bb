//! Captured media: where files go and how frames become photos, GIFs and videos.

mod error;
mod gif;
mod recording;
mod store;
mod video;

use std::path::PathBuf;

use crate::camera::Frame;

pub use error::MediaError;
pub use gif::{GIF_FPS, GIF_MAX_WIDTH, GifMode, GifWriter, playback_order};
pub use recording::{Recording, RecordingSummary};
pub use store::{MEDIA_DIR_NAME, MediaStore};
pub use video::{FfmpegVideoWriter, VIDEO_FPS};

/// Sink for the frames of one recording.
///
/// Writers live inside the capture loop while recording, so they must be `Send`.
pub trait FrameWriter: Send {
    /// Append one frame.
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError>;

    /// Frames accepted so far.
    fn frames_written(&self) -> u64;

    /// Flush and close the output, returning the file written.
    fn finish(self: Box<Self>) -> Result<PathBuf, MediaError>;
}
