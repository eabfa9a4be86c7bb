//! Animated GIF and boomerang encoding.
//!
//! Frames are sampled and downscaled as they arrive; encoding happens in
//! [`FrameWriter::finish`] once the full sequence is known.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, RgbImage};

use super::{FrameWriter, MediaError};
use crate::camera::{Frame, Resolution};
use crate::preview::{fit_width, to_rgb_image};

/// Playback rate of generated GIFs.
pub const GIF_FPS: u32 = 10;

/// GIF frames are scaled down to at most this width.
pub const GIF_MAX_WIDTH: u32 = 320;

/// How captured frames are laid out in the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GifMode {
    /// Play once forward, then loop.
    Forward,
    /// Play forward then backward, then loop.
    Boomerang,
}

/// Indices of `count` captured frames in playback order.
///
/// Boomerang plays back without repeating the first and last frames, so the
/// loop point doesn't stutter: `0 1 2 3 2 1`.
pub fn playback_order(count: usize, mode: GifMode) -> Vec<usize> {
    let forward = 0..count;
    match mode {
        GifMode::Forward => forward.collect(),
        GifMode::Boomerang if count <= 2 => forward.collect(),
        GifMode::Boomerang => forward.chain((1..count - 1).rev()).collect(),
    }
}

/// Collects frames for an animated GIF.
pub struct GifWriter {
    path: PathBuf,
    mode: GifMode,
    max_width: u32,
    interval: Duration,
    last_kept: Option<Instant>,
    frames: Vec<RgbImage>,
}

impl GifWriter {
    pub fn new(path: impl Into<PathBuf>, mode: GifMode) -> Self {
        Self {
            path: path.into(),
            mode,
            max_width: GIF_MAX_WIDTH,
            interval: Duration::from_millis(1000 / GIF_FPS as u64),
            last_kept: None,
            frames: Vec::new(),
        }
    }

    /// Minimum spacing between kept frames, by capture timestamp.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> GifMode {
        self.mode
    }

    fn should_keep(&self, frame: &Frame) -> bool {
        match self.last_kept {
            None => true,
            Some(last) => frame.timestamp.saturating_duration_since(last) >= self.interval,
        }
    }
}

impl FrameWriter for GifWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        if !self.should_keep(frame) {
            return Ok(());
        }
        let image = fit_width(to_rgb_image(frame)?, self.max_width);
        if let Some(first) = self.frames.first()
            && first.dimensions() != image.dimensions()
        {
            return Err(MediaError::FrameSizeMismatch {
                expected: Resolution {
                    width: first.width(),
                    height: first.height(),
                },
                got: frame.resolution(),
            });
        }
        self.frames.push(image);
        self.last_kept = Some(frame.timestamp);
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames.len() as u64
    }

    fn finish(self: Box<Self>) -> Result<PathBuf, MediaError> {
        if self.frames.is_empty() {
            return Err(MediaError::EmptyRecording);
        }

        let file = BufWriter::new(File::create(&self.path)?);
        let mut encoder = GifEncoder::new_with_speed(file, 10);
        encoder.set_repeat(Repeat::Infinite)?;

        let delay = Delay::from_numer_denom_ms(1000, GIF_FPS);
        let order = playback_order(self.frames.len(), self.mode);
        for &i in &order {
            let rgba = DynamicImage::ImageRgb8(self.frames[i].clone()).into_rgba8();
            encoder.encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))?;
        }

        log::info!(
            "GIF saved to {} ({} frames, {:?})",
            self.path.display(),
            order.len(),
            self.mode
        );
        Ok(self.path)
    }
}
