//! Live preview: where captured frames go to be seen.
//!
//! The capture loop hands every frame to a [`DisplaySink`]. The TUI uses
//! [`AsciiPreview`], the headless `preview` command uses [`JpegPreview`].

mod ascii;
mod jpeg;

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::camera::Frame;

pub use ascii::{AsciiFrame, CellColor, CharSet, render_ascii};
pub use jpeg::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_WIDTH, encode_jpeg, fit_width, to_rgb_image};

/// Receives every frame the capture loop reads, on the capture thread.
pub trait DisplaySink: Send + Sync {
    fn show(&self, frame: &Frame);
}

/// Discards frames.
#[derive(Debug, Default)]
pub struct NullSink;

impl DisplaySink for NullSink {
    fn show(&self, _frame: &Frame) {}
}

/// Keeps the most recent frame as JPEG bytes.
#[derive(Debug)]
pub struct JpegPreview {
    max_width: u32,
    quality: u8,
    latest: Mutex<Option<Vec<u8>>>,
    displayed: AtomicU64,
}

impl Default for JpegPreview {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH, DEFAULT_JPEG_QUALITY)
    }
}

impl JpegPreview {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width,
            quality,
            latest: Mutex::new(None),
            displayed: AtomicU64::new(0),
        }
    }

    /// The latest encoded frame, if any.
    pub fn latest_jpeg(&self) -> Option<Vec<u8>> {
        self.latest.lock().ok()?.clone()
    }

    /// Number of frames encoded so far.
    pub fn displayed(&self) -> u64 {
        self.displayed.load(Ordering::Relaxed)
    }
}

impl DisplaySink for JpegPreview {
    fn show(&self, frame: &Frame) {
        match encode_jpeg(frame, Some(self.max_width), self.quality) {
            Ok(bytes) => {
                if let Ok(mut latest) = self.latest.lock() {
                    *latest = Some(bytes);
                }
                self.displayed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => log::warn!("Error converting frame to JPEG: {}", e),
        }
    }
}

/// Renders each frame to ASCII at the size the TUI last asked for.
#[derive(Debug)]
pub struct AsciiPreview {
    size: Mutex<(u16, u16)>,
    charset: CharSet,
    invert: bool,
    latest: Mutex<Option<AsciiFrame>>,
    updates: AtomicU64,
}

impl AsciiPreview {
    pub fn new(charset: CharSet, invert: bool) -> Self {
        Self {
            size: Mutex::new((0, 0)),
            charset,
            invert,
            latest: Mutex::new(None),
            updates: AtomicU64::new(0),
        }
    }

    /// Set the character grid subsequent frames are rendered into.
    pub fn set_size(&self, cols: u16, rows: u16) {
        if let Ok(mut size) = self.size.lock() {
            *size = (cols, rows);
        }
    }

    pub fn latest(&self) -> Option<AsciiFrame> {
        self.latest.lock().ok()?.clone()
    }

    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

impl DisplaySink for AsciiPreview {
    fn show(&self, frame: &Frame) {
        let (cols, rows) = self.size.lock().map(|s| *s).unwrap_or((0, 0));
        if cols == 0 || rows == 0 {
            return;
        }
        let ascii = render_ascii(frame, cols, rows, self.charset, self.invert);
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(ascii);
        }
        self.updates.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_preview_keeps_latest() {
        let preview = JpegPreview::default();
        assert!(preview.latest_jpeg().is_none());

        preview.show(&Frame::solid(8, 8, [255, 0, 0]));
        preview.show(&Frame::solid(8, 8, [0, 255, 0]));

        let jpeg = preview.latest_jpeg().unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(preview.displayed(), 2);
    }

    #[test]
    fn test_ascii_preview_waits_for_size() {
        let preview = AsciiPreview::new(CharSet::Standard, false);
        preview.show(&Frame::solid(8, 8, [255, 255, 255]));
        assert!(preview.latest().is_none());

        preview.set_size(4, 2);
        preview.show(&Frame::solid(8, 8, [255, 255, 255]));
        let ascii = preview.latest().unwrap();
        assert_eq!((ascii.width, ascii.height), (4, 2));
        assert_eq!(preview.updates(), 1);
    }
}
