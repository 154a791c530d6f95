use clap::Parser;
use gsd_mediakeys::config::{self, Config};
use gsd_mediakeys::{BusStatus, MediaKeys, PlaybackState, Player};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gsd-mediakeys",
    about = "Media-key client for the GNOME settings daemon"
)]
struct Args {
    /// Path to config file (default: ~/.config/gsd-mediakeys/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gsd-mediakeys")
        .join("config.toml")
}

/// Player that only logs what a real player would do
struct LoggingPlayer {
    state: Mutex<PlaybackState>,
}

impl LoggingPlayer {
    fn new() -> Self {
        Self {
            state: Mutex::new(PlaybackState::Stopped),
        }
    }

    fn set_state(&self, state: PlaybackState) {
        if let Ok(mut guard) = self.state.lock() {
            *guard = state;
        }
    }
}

impl Player for LoggingPlayer {
    fn play(&self) {
        info!("play");
        self.set_state(PlaybackState::Playing);
    }

    fn stop(&self) {
        info!("stop");
        self.set_state(PlaybackState::Stopped);
    }

    fn next_station(&self) {
        info!("next station");
    }

    fn previous_station(&self) {
        info!("previous station");
    }

    fn volume_up(&self) {
        info!("volume up");
    }

    fn volume_down(&self) {
        info!("volume down");
    }

    fn state(&self) -> PlaybackState {
        self.state
            .lock()
            .map(|guard| *guard)
            .unwrap_or(PlaybackState::Stopped)
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let explicit_path = args.config.is_some();
    let config_path = args.config.unwrap_or_else(default_config_path);
    info!("loading config from {}", config_path.display());

    let config = match config::load(&config_path) {
        Ok(config) => config,
        Err(err) if !explicit_path && err.is_not_found() => {
            info!("no config file found, using defaults");
            Config::default()
        }
        Err(err) => {
            // Use miette's fancy error display
            eprintln!("{:?}", miette::Report::new(err));
            return ExitCode::FAILURE;
        }
    };

    // MediaKeys blocks while connecting, so build it outside the runtime
    let keys = MediaKeys::new(Arc::new(LoggingPlayer::new()), &config);
    if keys.status() == BusStatus::Disabled {
        warn!("media keys unavailable, exiting");
        return ExitCode::FAILURE;
    }

    if let Err(err) = wait_for_ctrl_c() {
        eprintln!("error: {err:?}");
        return ExitCode::FAILURE;
    }

    drop(keys);
    ExitCode::SUCCESS
}

fn wait_for_ctrl_c() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(tokio::signal::ctrl_c())?;
    info!("interrupted, shutting down");
    Ok(())
}
