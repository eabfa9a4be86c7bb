//! The capture modes offered for an event.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::api::MediaType;
use crate::media::{FfmpegVideoWriter, FrameWriter, GifMode, GifWriter};

/// What the camera view captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Experience {
    #[default]
    Photo,
    Gif,
    Video,
    Boomerang,
}

impl Experience {
    /// In the order the selection screen shows them.
    pub const ALL: [Experience; 4] = [
        Experience::Photo,
        Experience::Gif,
        Experience::Video,
        Experience::Boomerang,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "photo" => Some(Experience::Photo),
            "gif" => Some(Experience::Gif),
            "video" => Some(Experience::Video),
            "boomerang" => Some(Experience::Boomerang),
            _ => None,
        }
    }

    /// Mode name as used in routes.
    pub fn as_str(self) -> &'static str {
        match self {
            Experience::Photo => "photo",
            Experience::Gif => "gif",
            Experience::Video => "video",
            Experience::Boomerang => "boomerang",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Experience::Photo => "Photo",
            Experience::Gif => "GIF",
            Experience::Video => "Video",
            Experience::Boomerang => "Boomerang",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Experience::Photo => "Take a photo with our professional camera setup",
            Experience::Gif => "Create an animated GIF with multiple photos",
            Experience::Video => "Record a short video message",
            Experience::Boomerang => "Create a fun boomerang loop",
        }
    }

    /// Recordings in this mode stop by themselves after this long.
    pub fn auto_stop(self) -> Option<Duration> {
        match self {
            Experience::Gif => Some(Duration::from_secs(5)),
            Experience::Boomerang => Some(Duration::from_secs(3)),
            Experience::Photo | Experience::Video => None,
        }
    }

    /// Whether Space starts a recording rather than taking a photo.
    pub fn records(self) -> bool {
        self != Experience::Photo
    }

    pub fn media_type(self) -> MediaType {
        match self {
            Experience::Photo => MediaType::Photo,
            Experience::Gif => MediaType::Gif,
            Experience::Video => MediaType::Video,
            Experience::Boomerang => MediaType::Boomerang,
        }
    }

    /// File name prefix and extension of captured files.
    pub fn file_parts(self) -> (&'static str, &'static str) {
        match self {
            Experience::Photo => ("photo", "jpg"),
            Experience::Gif => ("gif", "gif"),
            Experience::Video => ("video", "mp4"),
            Experience::Boomerang => ("boomerang", "gif"),
        }
    }

    /// Writer for a recording in this mode, or `None` for photos.
    pub fn writer(self, path: &Path) -> Option<Box<dyn FrameWriter>> {
        match self {
            Experience::Photo => None,
            Experience::Video => Some(Box::new(FfmpegVideoWriter::new(path))),
            Experience::Gif => Some(Box::new(GifWriter::new(path, GifMode::Forward))),
            Experience::Boomerang => Some(Box::new(GifWriter::new(path, GifMode::Boomerang))),
        }
    }

    /// Status text once a recording in this mode is done.
    pub fn finished_message(self, duration: Duration) -> String {
        match self {
            Experience::Gif => "GIF created".to_string(),
            Experience::Boomerang => "Boomerang created".to_string(),
            Experience::Photo | Experience::Video => {
                format!("Video recorded ({:.1}s)", duration.as_secs_f64())
            }
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_as_str() {
        for experience in Experience::ALL {
            assert_eq!(Experience::parse(experience.as_str()), Some(experience));
        }
        assert_eq!(Experience::parse(" GIF "), Some(Experience::Gif));
        assert_eq!(Experience::parse("panorama"), None);
    }

    #[test]
    fn test_auto_stop_limits() {
        assert_eq!(Experience::Gif.auto_stop(), Some(Duration::from_secs(5)));
        assert_eq!(Experience::Boomerang.auto_stop(), Some(Duration::from_secs(3)));
        assert_eq!(Experience::Video.auto_stop(), None);
        assert_eq!(Experience::Photo.auto_stop(), None);
    }

    #[test]
    fn test_only_photo_does_not_record() {
        assert!(!Experience::Photo.records());
        assert!(Experience::Photo.writer(Path::new("/tmp/x.jpg")).is_none());
        for experience in [Experience::Gif, Experience::Video, Experience::Boomerang] {
            assert!(experience.records());
            assert!(experience.writer(Path::new("/tmp/x")).is_some());
        }
    }

    #[test]
    fn test_file_parts_and_media_type() {
        assert_eq!(Experience::Boomerang.file_parts(), ("boomerang", "gif"));
        assert_eq!(Experience::Video.file_parts(), ("video", "mp4"));
        assert_eq!(Experience::Gif.media_type(), MediaType::Gif);
    }

    #[test]
    fn test_finished_message() {
        assert_eq!(
            Experience::Video.finished_message(Duration::from_millis(4260)),
            "Video recorded (4.3s)"
        );
        assert_eq!(Experience::Gif.finished_message(Duration::ZERO), "GIF created");
        assert_eq!(
            Experience::Boomerang.finished_message(Duration::ZERO),
            "Boomerang created"
        );
    }
}
