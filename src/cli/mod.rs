//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    CommandError, EMAIL_ENV, PASSWORD_ENV, events, handle_config_action, list_cameras, login_from_env, preview,
    record, resolve_media_type, snap, upload,
};
pub use enums::{MediaKind, RecordMode, Tab};
