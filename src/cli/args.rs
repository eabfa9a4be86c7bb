//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{MediaKind, RecordMode, Tab};
use crate::route::Route;

fn parse_route(s: &str) -> Result<Route, String> {
    Route::parse(s).ok_or_else(|| format!("Unknown route '{}'. Try /events or /camera_test/<id>?mode=gif", s))
}

/// Photo booth client for events
#[derive(Parser, Debug)]
#[command(name = "selfie-booth")]
#[command(version, about = "Terminal photo booth: browse events and capture photos, GIFs and videos", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Screen to open after login (e.g. /event/12 or /camera_test/12?mode=gif)
    #[arg(long, value_parser = parse_route)]
    pub route: Option<Route>,

    /// Use the simulated camera instead of a real device
    #[arg(long)]
    pub simulate: bool,

    /// Camera device index (from list-cameras)
    #[arg(long)]
    pub camera: Option<u32>,

    /// API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Take one photo into the media directory
    Snap,
    /// Record a video, GIF or boomerang (Ctrl-C stops early)
    Record {
        /// What to record
        #[arg(long, short, default_value = "video")]
        mode: RecordMode,
        /// Length in seconds (default: the mode's limit, or until Ctrl-C)
        #[arg(long, short)]
        seconds: Option<u64>,
    },
    /// Keep writing the latest preview frame to a JPEG file
    Preview {
        /// Output file
        #[arg(long, short)]
        out: PathBuf,
        /// Stop after this many frames (default: until Ctrl-C)
        #[arg(long)]
        frames: Option<u64>,
    },
    /// List events (logs in with SELFIE_BOOTH_EMAIL / SELFIE_BOOTH_PASSWORD)
    Events {
        #[arg(long, default_value = "upcoming")]
        tab: Tab,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
    },
    /// Upload a file to an event (logs in with SELFIE_BOOTH_EMAIL / SELFIE_BOOTH_PASSWORD)
    Upload {
        event_id: i64,
        file: PathBuf,
        /// Media type (default: guessed from the file extension)
        #[arg(long)]
        media_type: Option<MediaKind>,
        /// Template id to tag the upload with
        #[arg(long)]
        template: Option<i64>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booth::Experience;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["selfie-booth"]);
        assert!(args.command.is_none());
        assert!(args.route.is_none());
        assert!(!args.simulate);
        assert!(args.camera.is_none());
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_route() {
        let args = Args::parse_from(["selfie-booth", "--route", "/camera_test/12?mode=gif"]);
        assert_eq!(
            args.route,
            Some(Route::Camera {
                event_id: 12,
                mode: Experience::Gif
            })
        );
        assert!(Args::try_parse_from(["selfie-booth", "--route", "/nowhere"]).is_err());
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["selfie-booth", "-c", "/tmp/test.toml", "-v", "--simulate"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert!(args.verbose);
        assert!(args.simulate);
    }

    #[test]
    fn test_args_record_subcommand() {
        let args = Args::parse_from(["selfie-booth", "record", "--mode", "boomerang", "--seconds", "2"]);
        match args.command {
            Some(Command::Record { mode, seconds }) => {
                assert_eq!(mode, RecordMode::Boomerang);
                assert_eq!(seconds, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }

        let args = Args::parse_from(["selfie-booth", "record"]);
        assert!(matches!(
            args.command,
            Some(Command::Record {
                mode: RecordMode::Video,
                seconds: None
            })
        ));
    }

    #[test]
    fn test_args_events_subcommand() {
        let args = Args::parse_from(["selfie-booth", "events", "--tab", "past", "--search", "gala", "--page", "3"]);
        match args.command {
            Some(Command::Events { tab, search, page }) => {
                assert_eq!(tab, Tab::Past);
                assert_eq!(search.as_deref(), Some("gala"));
                assert_eq!(page, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_args_upload_subcommand() {
        let args = Args::parse_from([
            "selfie-booth",
            "upload",
            "7",
            "out.gif",
            "--media-type",
            "boomerang",
            "--template",
            "3",
        ]);
        match args.command {
            Some(Command::Upload {
                event_id,
                file,
                media_type,
                template,
            }) => {
                assert_eq!(event_id, 7);
                assert_eq!(file, PathBuf::from("out.gif"));
                assert_eq!(media_type, Some(MediaKind::Boomerang));
                assert_eq!(template, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_args_config_subcommands() {
        let args = Args::parse_from(["selfie-booth", "config", "show"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));

        let args = Args::parse_from(["selfie-booth", "config", "init", "--force"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init { force: true }
            })
        ));
    }

    #[test]
    fn test_args_list_cameras_subcommand() {
        let args = Args::parse_from(["selfie-booth", "list-cameras"]);
        assert!(matches!(args.command, Some(Command::ListCameras)));
    }
}
