//! The media directory and its file naming.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use image::codecs::jpeg::JpegEncoder;

use super::MediaError;
use crate::camera::Frame;
use crate::preview::to_rgb_image;

/// Directory name under the home directory when none is configured.
pub const MEDIA_DIR_NAME: &str = "SelfieBooth_Media";

/// JPEG quality for saved photos.
const PHOTO_QUALITY: u8 = 95;

/// Fixed directory that every captured file is written to.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Use `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, MediaError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// `~/SelfieBooth_Media`.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(MEDIA_DIR_NAME)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.<ext>` for the current local time.
    pub fn timestamped_path(&self, prefix: &str, ext: &str) -> PathBuf {
        self.path_at(prefix, ext, Local::now().naive_local())
    }

    /// Like [`MediaStore::timestamped_path`] for a given time.
    ///
    /// Two captures within the same second get `_1`, `_2`, ... suffixes
    /// instead of overwriting each other.
    pub fn path_at(&self, prefix: &str, ext: &str, at: NaiveDateTime) -> PathBuf {
        let stem = format!("{}_{}", prefix, at.format("%Y%m%d_%H%M%S"));
        let mut candidate = self.dir.join(format!("{}.{}", stem, ext));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{}_{}.{}", stem, n, ext));
            n += 1;
        }
        candidate
    }

    /// Save `frame` as `photo_<timestamp>.jpg`.
    pub fn save_photo(&self, frame: &Frame) -> Result<PathBuf, MediaError> {
        let path = self.timestamped_path("photo", "jpg");
        let image = to_rgb_image(frame)?;
        let file = std::io::BufWriter::new(std::fs::File::create(&path)?);
        JpegEncoder::new_with_quality(file, PHOTO_QUALITY).encode_image(&image)?;
        log::info!("Photo saved to {}", path.display());
        Ok(path)
    }
}
