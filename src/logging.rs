//! Logger setup.
//!
//! Headless commands log to stderr. The TUI owns the terminal, so while it
//! runs log lines go to a file instead.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Where log output should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `<data local dir>/selfie-booth/selfie-booth.log`.
pub fn default_log_file() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("selfie-booth")
        .join("selfie-booth.log")
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. Falls back to stderr if the log file can't be opened.
///
/// `verbose` lowers the default filter to `debug`.
pub fn init(target: LogTarget, verbose: bool) {
    let default_filter = if verbose { "debug" } else { DEFAULT_FILTER };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    let mut file_error = None;
    if let LogTarget::File(path) = &target {
        match open_log_file(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
                builder.format(|buf, record| {
                    writeln!(
                        buf,
                        "{} {:<5} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        record.args()
                    )
                });
            }
            Err(e) => file_error = Some((path.clone(), e)),
        }
    }

    // A second init (tests, repeated calls) is harmless.
    if builder.try_init().is_err() {
        return;
    }
    if let Some((path, e)) = file_error {
        log::warn!("Could not open log file {}: {}", path.display(), e);
    }
}
