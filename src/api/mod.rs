//! Client for the booth backend: authentication, events, templates, uploads.

mod client;
mod error;
mod types;

pub use client::{API_URL_ENV, BoothClient, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use types::{Event, EventPage, EventTab, MediaType, Package, Template, TokenPair, User, total_pages};
