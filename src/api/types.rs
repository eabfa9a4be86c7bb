//! Request and response bodies of the booth backend.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Login request body.
#[derive(Debug, Serialize)]
pub(crate) struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Access and refresh tokens issued at login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PinRequest<'a> {
    pub pin: &'a str,
}

/// The logged-in user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// Name for greetings: name, else email, else "User".
    pub fn display_name(&self) -> &str {
        [self.name.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("User")
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Package {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A booth event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub package: Option<Package>,
}

impl Event {
    /// The event date, accepting RFC 3339, naive ISO timestamps and plain dates.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        let raw = self.date.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(dt);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn package_name(&self) -> &str {
        self.package
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("-")
    }
}

/// One page of events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Event>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

impl EventPage {
    /// `max(1, ceil(count / page_size))`.
    pub fn total_pages(&self, page_size: u32) -> u32 {
        total_pages(self.count, page_size)
    }
}

/// Number of pages needed for `count` items; never less than one.
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size as u64).max(1) as u32
}

/// An overlay template that uploads can be tagged with.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Event list tabs and their `date_filter` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTab {
    #[default]
    Upcoming,
    Today,
    Past,
}

impl EventTab {
    pub const ALL: [EventTab; 3] = [EventTab::Upcoming, EventTab::Today, EventTab::Past];

    pub fn date_filter(self) -> &'static str {
        match self {
            EventTab::Upcoming => "gt",
            EventTab::Today => "exact",
            EventTab::Past => "lt",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventTab::Upcoming => "Upcoming",
            EventTab::Today => "Today",
            EventTab::Past => "Past",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "upcoming" => Some(EventTab::Upcoming),
            "today" => Some(EventTab::Today),
            "past" => Some(EventTab::Past),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            EventTab::Upcoming => EventTab::Today,
            EventTab::Today => EventTab::Past,
            EventTab::Past => EventTab::Upcoming,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            EventTab::Upcoming => EventTab::Past,
            EventTab::Today => EventTab::Upcoming,
            EventTab::Past => EventTab::Today,
        }
    }
}

/// Kind of an uploaded media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Gif,
    Video,
    Boomerang,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Gif => "gif",
            MediaType::Video => "video",
            MediaType::Boomerang => "boomerang",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "photo" => Some(MediaType::Photo),
            "gif" => Some(MediaType::Gif),
            "video" => Some(MediaType::Video),
            "boomerang" => Some(MediaType::Boomerang),
            _ => None,
        }
    }

    /// Guess from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "png" => Some(MediaType::Photo),
            "gif" => Some(MediaType::Gif),
            "mp4" | "mov" | "avi" => Some(MediaType::Video),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
