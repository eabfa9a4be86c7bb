use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use selfie_booth::api::{BoothClient, DEFAULT_CONNECT_TIMEOUT};
use selfie_booth::camera::SourceMode;
use selfie_booth::cli::{self, Args, Command, CommandError};
use selfie_booth::config::Config;
use selfie_booth::logging::{self, LogTarget};
use selfie_booth::ui;

/// Load `.env` without overriding variables that are already set.
fn load_env() {
    // Err just means there is no .env file.
    let _ = dotenv::dotenv();
}

/// Config file, then environment, then command-line flags.
fn load_config(args: &Args) -> Result<Config, CommandError> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(device) = args.camera {
        config.camera.device = device;
    }
    Ok(config)
}

fn source_mode(args: &Args, config: &Config) -> SourceMode {
    if args.simulate {
        SourceMode::Simulated
    } else if config.camera.simulate_fallback {
        SourceMode::CameraOrSimulated
    } else {
        SourceMode::Camera
    }
}

fn build_client(config: &Config) -> Result<BoothClient, CommandError> {
    let client = BoothClient::with_timeouts(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
        DEFAULT_CONNECT_TIMEOUT,
    )?;
    log::debug!("API base URL: {}", client.base_url());
    Ok(client)
}

async fn run(args: Args) -> Result<(), CommandError> {
    let config = load_config(&args)?;
    let mode = source_mode(&args, &config);
    let env = |key: &str| std::env::var(key).ok();

    match args.command {
        None => {
            let client = Arc::new(build_client(&config)?);
            log::info!("Starting booth UI (camera: {:?})", mode);
            ui::run_booth(client, config, mode, args.route).await?;
        }
        Some(Command::ListCameras) => cli::list_cameras()?,
        Some(Command::Config { action }) => cli::handle_config_action(action, args.config.as_deref(), &config)?,
        Some(Command::Snap) => {
            cli::snap(&config, mode)?;
        }
        Some(Command::Record { mode: record_mode, seconds }) => {
            cli::record(&config, mode, record_mode.into(), seconds)?;
        }
        Some(Command::Preview { out, frames }) => {
            cli::preview(&config, mode, &out, frames)?;
        }
        Some(Command::Events { tab, search, page }) => {
            let client = build_client(&config)?;
            cli::login_from_env(&client, env).await?;
            cli::events(&client, tab.into(), search.as_deref(), page, config.booth.page_size).await?;
        }
        Some(Command::Upload {
            event_id,
            file,
            media_type,
            template,
        }) => {
            let client = build_client(&config)?;
            cli::login_from_env(&client, env).await?;
            cli::upload(&client, event_id, &file, media_type.map(Into::into), template).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_env();

    let args = Args::parse();

    // The TUI owns the terminal, so its log lines go to a file.
    let target = if args.command.is_none() {
        LogTarget::File(logging::default_log_file())
    } else {
        LogTarget::Stderr
    };
    logging::init(target, args.verbose);

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
