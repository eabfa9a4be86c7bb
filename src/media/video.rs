//! MP4 recording through an FFmpeg child process.
//!
//! Frames are piped to FFmpeg's stdin as raw RGB24. The process is spawned
//! on the first frame, once the frame size is known.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::{self, JoinHandle};

use super::{FrameWriter, MediaError};
use crate::camera::{Frame, Resolution};

/// Frame rate the MP4 is tagged with.
pub const VIDEO_FPS: u32 = 30;

/// Lines of FFmpeg stderr kept for error messages.
const STDERR_TAIL: usize = 5;

struct Encoder {
    child: Child,
    stdin: ChildStdin,
    resolution: Resolution,
    stderr_thread: Option<JoinHandle<Vec<String>>>,
}

/// Writes frames to an H.264 MP4 via `ffmpeg`.
pub struct FfmpegVideoWriter {
    path: PathBuf,
    fps: u32,
    encoder: Option<Encoder>,
    frames: u64,
}

impl FfmpegVideoWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fps: VIDEO_FPS,
            encoder: None,
            frames: 0,
        }
    }

    /// Whether an `ffmpeg` binary can be run.
    pub fn is_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ffmpeg_args(&self, resolution: Resolution) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "-s".to_string(),
            resolution.to_string(),
            "-r".to_string(),
            self.fps.to_string(),
            "-i".to_string(),
            "-".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            self.path.to_string_lossy().into_owned(),
        ]
    }

    fn spawn(&self, resolution: Resolution) -> Result<Encoder, MediaError> {
        let mut child = Command::new("ffmpeg")
            .args(self.ffmpeg_args(resolution))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MediaError::FfmpegNotFound
                } else {
                    MediaError::Io(e)
                }
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::FfmpegFailed("stdin unavailable".to_string()))?;

        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let mut lines = Vec::new();
                for line in BufReader::new(stderr).lines() {
                    match line {
                        Ok(l) => {
                            log::debug!("[ffmpeg] {}", l);
                            lines.push(l);
                        }
                        Err(_) => break,
                    }
                }
                lines
            })
        });

        log::info!("Recording {} video to {}", resolution, self.path.display());
        Ok(Encoder {
            child,
            stdin,
            resolution,
            stderr_thread,
        })
    }
}

impl FrameWriter for FfmpegVideoWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        if !frame.is_consistent() {
            return Err(MediaError::MalformedFrame {
                width: frame.width,
                height: frame.height,
                len: frame.data.len(),
            });
        }
        if self.encoder.is_none() {
            self.encoder = Some(self.spawn(frame.resolution())?);
        }
        let Some(encoder) = self.encoder.as_mut() else {
            return Ok(());
        };
        if frame.resolution() != encoder.resolution {
            return Err(MediaError::FrameSizeMismatch {
                expected: encoder.resolution,
                got: frame.resolution(),
            });
        }
        encoder.stdin.write_all(&frame.data)?;
        self.frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }

    fn finish(self: Box<Self>) -> Result<PathBuf, MediaError> {
        let Some(encoder) = self.encoder else {
            return Err(MediaError::EmptyRecording);
        };
        let Encoder {
            mut child,
            stdin,
            stderr_thread,
            ..
        } = encoder;

        // Closing stdin is FFmpeg's end-of-input signal.
        drop(stdin);
        let status = child.wait()?;
        let stderr = stderr_thread.and_then(|h| h.join().ok()).unwrap_or_default();

        if !status.success() {
            let tail = stderr
                .iter()
                .rev()
                .take(STDERR_TAIL)
                .rev()
                .cloned()
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MediaError::FfmpegFailed(format!("{} {}", status, tail).trim().to_string()));
        }

        log::info!("Video saved to {} ({} frames)", self.path.display(), self.frames);
        Ok(self.path)
    }
}
