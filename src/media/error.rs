use std::path::PathBuf;

use crate::camera::Resolution;

/// Errors from writing captured media.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("FFmpeg not found. Install ffmpeg to record videos")]
    FfmpegNotFound,

    #[error("FFmpeg failed: {0}")]
    FfmpegFailed(String),

    #[error("Recording contains no frames")]
    EmptyRecording,

    #[error("Frame is {got} but the recording is {expected}")]
    FrameSizeMismatch { expected: Resolution, got: Resolution },

    #[error("Frame data ({len} bytes) does not match {width}x{height}")]
    MalformedFrame { width: u32, height: u32, len: usize },

    #[error("Media file not found: {}", .0.display())]
    NotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_error_display() {
        assert_eq!(
            MediaError::FfmpegNotFound.to_string(),
            "FFmpeg not found. Install ffmpeg to record videos"
        );
        assert_eq!(MediaError::EmptyRecording.to_string(), "Recording contains no frames");
        let mismatch = MediaError::FrameSizeMismatch {
            expected: Resolution::VGA,
            got: Resolution::HD,
        };
        assert_eq!(mismatch.to_string(), "Frame is 1280x720 but the recording is 640x480");
        assert_eq!(
            MediaError::NotFound(PathBuf::from("/tmp/x.jpg")).to_string(),
            "Media file not found: /tmp/x.jpg"
        );
    }
}
