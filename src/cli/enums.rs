//! Value enums for CLI flags.

use clap::ValueEnum;

use crate::api::{EventTab, MediaType};
use crate::booth::Experience;

/// Experiences that produce a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RecordMode {
    #[default]
    Video,
    Gif,
    Boomerang,
}

impl From<RecordMode> for Experience {
    fn from(m: RecordMode) -> Self {
        match m {
            RecordMode::Video => Experience::Video,
            RecordMode::Gif => Experience::Gif,
            RecordMode::Boomerang => Experience::Boomerang,
        }
    }
}

/// Event list tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Tab {
    #[default]
    Upcoming,
    Today,
    Past,
}

impl From<Tab> for EventTab {
    fn from(t: Tab) -> Self {
        match t {
            Tab::Upcoming => EventTab::Upcoming,
            Tab::Today => EventTab::Today,
            Tab::Past => EventTab::Past,
        }
    }
}

/// Media type sent with an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaKind {
    Photo,
    Gif,
    Video,
    Boomerang,
}

impl From<MediaKind> for MediaType {
    fn from(k: MediaKind) -> Self {
        match k {
            MediaKind::Photo => MediaType::Photo,
            MediaKind::Gif => MediaType::Gif,
            MediaKind::Video => MediaType::Video,
            MediaKind::Boomerang => MediaType::Boomerang,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_mode_conversion() {
        assert_eq!(Experience::from(RecordMode::Video), Experience::Video);
        assert_eq!(Experience::from(RecordMode::Gif), Experience::Gif);
        assert_eq!(Experience::from(RecordMode::Boomerang), Experience::Boomerang);
        assert!(Experience::from(RecordMode::default()).records());
    }

    #[test]
    fn test_tab_conversion() {
        assert_eq!(EventTab::from(Tab::Today).date_filter(), "exact");
        assert_eq!(EventTab::from(Tab::Past).date_filter(), "lt");
    }

    #[test]
    fn test_media_kind_conversion() {
        assert_eq!(MediaType::from(MediaKind::Boomerang), MediaType::Boomerang);
    }
}
