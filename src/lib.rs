//! selfie-booth library crate.
//!
//! A photo booth client: operators log in, pick an event and capture photos,
//! GIFs, videos or boomerangs that are uploaded to the event's REST backend.
//! The binary drives these modules from a terminal UI or headless subcommands.

pub mod api;
pub mod booth;
pub mod camera;
pub mod cli;
pub mod config;
pub mod logging;
pub mod media;
pub mod permissions;
pub mod preview;
pub mod route;
pub mod ui;
