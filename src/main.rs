use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use snake_autopilot::game::GameConfig;
use snake_autopilot::modes::{HeadlessMode, RunConfig, WatchMode, WatchOptions};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_autopilot")]
#[command(version, about = "A snake that plays itself")]
struct Cli {
    /// Watch in the terminal, or run sessions headless
    #[arg(long, default_value = "watch")]
    mode: Mode,

    /// JSON game configuration; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width; without --config the default snake length is shortened
    /// to fit
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Seed for obstacles and fruit
    #[arg(long)]
    seed: Option<u64>,

    /// Sessions to play in run mode
    #[arg(long, default_value = "1")]
    sessions: usize,

    /// Wall-clock limit per session in seconds, 0 for none
    #[arg(long, default_value = "300")]
    time_limit: u64,

    /// Tick interval in milliseconds at normal watch speed
    #[arg(long, default_value = "50")]
    tick_ms: u64,

    /// Write logs to this file (the only log output in watch mode)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print run-mode reports as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Render the autopilot in the terminal
    Watch,
    /// Play sessions without a display and print reports
    Run,
}

fn init_tracing(mode: Mode, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match (mode, log_file) {
        (_, Some(path)) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
        }
        (Mode::Run, None) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
        }
        // The TUI owns the terminal
        (Mode::Watch, None) => {}
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    if let Some(width) = cli.width {
        config.grid_width = width;
    }
    if let Some(height) = cli.height {
        config.grid_height = height;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.config.is_none() {
        config.fit_snake_length();
    }

    config.validate().context("Invalid game configuration")?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.mode, cli.log_file.as_deref())?;

    let config = load_config(&cli)?;
    let time_limit = (cli.time_limit > 0).then(|| Duration::from_secs(cli.time_limit));

    match cli.mode {
        Mode::Watch => {
            let options = WatchOptions {
                tick: Duration::from_millis(cli.tick_ms),
                time_limit,
            };
            let mut watch_mode = WatchMode::new(config, options)?;
            watch_mode.run().await?;
        }
        Mode::Run => {
            let run_config = RunConfig {
                sessions: cli.sessions,
                time_limit,
                json: cli.json,
                game_config: config,
            };
            let mut headless_mode = HeadlessMode::new(run_config)?;
            headless_mode.run()?;
        }
    }

    Ok(())
}
