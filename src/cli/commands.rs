//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::args::ConfigAction;
use crate::api::{ApiError, BoothClient, EventTab, MediaType, User};
use crate::booth::Experience;
use crate::camera::{self, CameraCapture, CameraError, Frame, SourceMode};
use crate::config::{self, Config, ConfigError};
use crate::media::{FfmpegVideoWriter, MediaError, MediaStore, Recording};
use crate::permissions::Platform;
use crate::preview::{DisplaySink, JpegPreview, NullSink};

pub const EMAIL_ENV: &str = "SELFIE_BOOTH_EMAIL";
pub const PASSWORD_ENV: &str = "SELFIE_BOOTH_PASSWORD";

/// How long headless commands wait for the camera's first frame.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Errors from headless commands. `main` prints them and exits non-zero.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Camera(#[from] CameraError),

    #[error("{0}")]
    Media(#[from] MediaError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Set {EMAIL_ENV} and {PASSWORD_ENV} to log in")]
    MissingCredentials,

    #[error("{0} mode does not record")]
    NotRecordable(Experience),

    #[error("Cannot tell the media type of {0}; pass --media-type")]
    UnknownMediaType(PathBuf),

    #[error("Camera delivered no frame within {0:?}")]
    NoFrame(Duration),

    #[error("Could not install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// List available cameras and print them to stdout.
pub fn list_cameras() -> Result<(), CommandError> {
    let devices = camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
        if let Some(hint) = Platform::detect().camera_permission_hint() {
            println!("{}.", hint);
        }
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --camera <index> to select a camera.");
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>, config: &Config) -> Result<(), CommandError> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config::default_path);
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!();
            print!("{}", config.to_toml()?);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", config_path.display());
            }
            println!("Media directory: {}", config.media_dir().display());
        }
        ConfigAction::Init { force } => {
            config::write_default(&config_path, force)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

/// Set a flag on Ctrl-C instead of exiting.
fn ctrlc_flag() -> Result<Arc<AtomicBool>, CommandError> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = flag.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, stopping...");
    })?;
    Ok(flag)
}

fn wait_for_frame(camera: &CameraCapture) -> Result<Frame, CommandError> {
    let deadline = Instant::now() + FIRST_FRAME_TIMEOUT;
    loop {
        if let Some(frame) = camera.latest_frame() {
            return Ok(frame);
        }
        if Instant::now() >= deadline || !camera.is_running() {
            return Err(CommandError::NoFrame(FIRST_FRAME_TIMEOUT));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn open_camera(config: &Config, mode: SourceMode, sink: Arc<dyn DisplaySink>) -> Result<CameraCapture, CommandError> {
    let mut camera = CameraCapture::new(config.camera_settings());
    camera.start(mode, sink)?;
    if let (Some(label), Some(resolution)) = (camera.source_label(), camera.actual_resolution()) {
        eprintln!("Using {} at {}", label, resolution);
    }
    Ok(camera)
}

/// Take a single photo.
pub fn snap(config: &Config, mode: SourceMode) -> Result<PathBuf, CommandError> {
    let store = MediaStore::new(config.media_dir())?;
    let mut camera = open_camera(config, mode, Arc::new(NullSink))?;
    let frame = wait_for_frame(&camera);
    camera.stop();

    let path = store.save_photo(&frame?)?;
    println!("Photo saved: {}", path.display());
    Ok(path)
}

/// Record until `seconds` pass, the experience limit is hit, or Ctrl-C.
pub fn record(config: &Config, mode: SourceMode, experience: Experience, seconds: Option<u64>) -> Result<PathBuf, CommandError> {
    if experience == Experience::Video && !FfmpegVideoWriter::is_available() {
        return Err(MediaError::FfmpegNotFound.into());
    }
    let store = MediaStore::new(config.media_dir())?;
    let (prefix, ext) = experience.file_parts();
    let path = store.timestamped_path(prefix, ext);
    let Some(writer) = experience.writer(&path) else {
        return Err(CommandError::NotRecordable(experience));
    };
    let limit = seconds.map(Duration::from_secs).or(experience.auto_stop());

    let stop = ctrlc_flag()?;
    let mut camera = open_camera(config, mode, Arc::new(NullSink))?;
    wait_for_frame(&camera)?;

    camera.start_recording(Recording::new(writer, &path, limit))?;
    match limit {
        Some(limit) => eprintln!("Recording {} for {}s (Ctrl-C to stop)...", experience, limit.as_secs()),
        None => eprintln!("Recording {} (Ctrl-C to stop)...", experience),
    }

    while !stop.load(Ordering::SeqCst) && !camera.recording_expired() && camera.is_running() {
        std::thread::sleep(POLL_INTERVAL);
    }

    let summary = camera.stop_recording()?;
    camera.stop();
    let summary = summary.ok_or(MediaError::EmptyRecording)?;
    println!(
        "{}: {} ({} frames)",
        experience.finished_message(summary.duration),
        summary.path.display(),
        summary.frames
    );
    Ok(summary.path)
}

/// Replace `out` atomically.
fn write_jpeg(out: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = out.with_extension("jpg.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, out)
}

/// Keep `out` updated with the latest preview frame.
pub fn preview(config: &Config, mode: SourceMode, out: &Path, frames: Option<u64>) -> Result<u64, CommandError> {
    let stop = ctrlc_flag()?;
    let sink = Arc::new(JpegPreview::new(config.preview.max_width, config.preview.jpeg_quality));
    let mut camera = open_camera(config, mode, sink.clone())?;
    eprintln!("Writing preview to {} (Ctrl-C to stop)...", out.display());

    let mut written = 0;
    let mut last_seen = 0;
    while !stop.load(Ordering::SeqCst) && camera.is_running() {
        let displayed = sink.displayed();
        if displayed != last_seen
            && let Some(bytes) = sink.latest_jpeg()
        {
            write_jpeg(out, &bytes)?;
            last_seen = displayed;
            written += 1;
        }
        if frames.is_some_and(|limit| displayed >= limit) {
            break;
        }
        std::thread::sleep(Duration::from_millis(30));
    }

    camera.stop();
    log::info!("Preview wrote {} updates, {} frames encoded", written, sink.displayed());
    Ok(written)
}

/// Log in with credentials from the environment (read through `lookup`).
pub async fn login_from_env(
    client: &BoothClient,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<User, CommandError> {
    let email = lookup(EMAIL_ENV).filter(|s| !s.trim().is_empty());
    let password = lookup(PASSWORD_ENV).filter(|s| !s.is_empty());
    let (Some(email), Some(password)) = (email, password) else {
        return Err(CommandError::MissingCredentials);
    };
    let user = client.login(email.trim(), &password).await?;
    eprintln!("Logged in as {}", user.display_name());
    Ok(user)
}

/// Print one page of events.
pub async fn events(
    client: &BoothClient,
    tab: EventTab,
    search: Option<&str>,
    page: u32,
    page_size: u32,
) -> Result<(), CommandError> {
    let result = client
        .get_events_paginated(page.max(1), page_size, Some(tab), search)
        .await?;
    let total = result.total_pages(page_size);

    println!("{} events ({} total)", tab.label(), result.count);
    if result.data.is_empty() {
        println!("No events found");
    }
    for event in &result.data {
        let date = event
            .parsed_date()
            .map(|d| d.format("%b %d, %Y").to_string())
            .unwrap_or_else(|| event.date.clone());
        println!(
            "  [{}] {:<30} {:<14} {:<12} {}",
            event.id,
            event.name,
            date,
            event.package_name(),
            event.location
        );
    }
    println!("Page {} of {}", page.max(1), total);
    Ok(())
}

/// Media type for `file`: the explicit one, else guessed from its extension.
pub fn resolve_media_type(file: &Path, explicit: Option<MediaType>) -> Result<MediaType, CommandError> {
    explicit
        .or_else(|| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .and_then(MediaType::from_extension)
        })
        .ok_or_else(|| CommandError::UnknownMediaType(file.to_path_buf()))
}

/// Upload `file` to an event.
pub async fn upload(
    client: &BoothClient,
    event_id: i64,
    file: &Path,
    media_type: Option<MediaType>,
    template_id: Option<i64>,
) -> Result<(), CommandError> {
    let media_type = resolve_media_type(file, media_type)?;
    client.upload_media(event_id, file, media_type, template_id).await?;
    println!("Uploaded {} to event {} as {}", file.display(), event_id, media_type);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_media_type() {
        assert_eq!(resolve_media_type(Path::new("a.JPG"), None).unwrap(), MediaType::Photo);
        assert_eq!(resolve_media_type(Path::new("a.mp4"), None).unwrap(), MediaType::Video);
        assert_eq!(
            resolve_media_type(Path::new("a.gif"), Some(MediaType::Boomerang)).unwrap(),
            MediaType::Boomerang
        );
        assert!(matches!(
            resolve_media_type(Path::new("notes.txt"), None),
            Err(CommandError::UnknownMediaType(_))
        ));
    }

    #[test]
    fn test_write_jpeg_replaces_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("preview.jpg");
        write_jpeg(&out, b"one").unwrap();
        write_jpeg(&out, b"two").unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"two");
        assert!(!tmp.path().join("preview.jpg.tmp").exists());
    }

    #[tokio::test]
    async fn test_login_from_env_requires_both_values() {
        let client = BoothClient::new("http://127.0.0.1:9").unwrap();
        let only_email = |key: &str| (key == EMAIL_ENV).then(|| "a@b.c".to_string());
        assert!(matches!(
            login_from_env(&client, only_email).await,
            Err(CommandError::MissingCredentials)
        ));
    }

    #[test]
    fn test_config_init_refuses_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config::default();
        handle_config_action(ConfigAction::Init { force: false }, Some(&path), &config).unwrap();
        assert!(path.exists());
        assert!(matches!(
            handle_config_action(ConfigAction::Init { force: false }, Some(&path), &config),
            Err(CommandError::Config(ConfigError::AlreadyExists(_)))
        ));
        handle_config_action(ConfigAction::Init { force: true }, Some(&path), &config).unwrap();
    }
}
