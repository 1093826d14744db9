use clap::Parser;
use log::{LevelFilter, info};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use videograb::cli::InteractiveMode;
use videograb::config::GrabConfigBuilder;
use videograb::progress::ProgressBoard;
use videograb::{DownloadManager, GrabConfig, GrabError, Quality, VideoFormat};

#[derive(Parser, Debug)]
#[command(name = "videograb")]
#[command(about = "Video download manager with simulated transfers", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    /// Start with the sample dashboard entries
    #[arg(long)]
    demo: bool,

    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    #[arg(long, value_name = "PERCENT")]
    step: Option<u8>,

    #[arg(short = 'u', long = "url", value_name = "URL", num_args = 1..)]
    urls: Vec<String>,

    #[arg(short, long, default_value = "mp4")]
    format: VideoFormat,

    #[arg(short, long, default_value = "1080p")]
    quality: Quality,

    /// Do not draw progress bars
    #[arg(long)]
    no_progress: bool,

    /// Wait for the given URLs to finish instead of reading commands
    #[arg(long)]
    batch: bool,
}

fn build_config(cli: &Cli) -> Result<GrabConfig, GrabError> {
    let mut config = match &cli.config {
        Some(path) => GrabConfig::from_file(path)?,
        None => GrabConfigBuilder::new().debug(cli.verbose).build()?,
    };
    if let Some(ms) = cli.tick_ms {
        config.tick_interval_ms = ms;
    }
    if let Some(step) = cli.step {
        config.progress_step = step;
    }
    config.seed_demo_entries |= cli.demo;
    config.debug |= cli.verbose;
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), GrabError> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let log_level = if config.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!(
        "Tick every {}ms, +{}% per tick",
        config.tick_interval_ms, config.progress_step
    );
    let tick = config.tick_interval();
    let manager = DownloadManager::new(config)?;

    let board = Arc::new(if cli.no_progress {
        ProgressBoard::hidden()
    } else {
        ProgressBoard::new()
    });
    for entry in manager.entries().await {
        board.track(&entry);
    }

    let mut rx = manager.subscribe_events();
    let board_manager = Arc::clone(&manager);
    let board_clone = Arc::clone(&board);
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => board_clone.apply(&event, &board_manager).await,
                Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                    log::warn!("Progress board skipped {} event(s)", n);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    for url in &cli.urls {
        if let Err(e) = manager.submit_url(url.clone(), cli.format, cli.quality).await {
            log::error!("Could not start {}: {}", url, e);
        }
    }

    if cli.batch {
        while manager.active_transfers() > 0 {
            tokio::time::sleep(tick.max(Duration::from_millis(50))).await;
        }
        // let the board drain the final events
        tokio::time::sleep(Duration::from_millis(50)).await;
    } else {
        InteractiveMode::new(Arc::clone(&manager)).run().await;
    }

    manager.shutdown();
    info!("{}", manager.summary().await);
    Ok(())
}
