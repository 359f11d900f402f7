mod bus;
mod cli;
mod config;
mod controller;
mod coordinator;
mod error;
mod models;
mod scrapers;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use config::{LogFormat, LoggingConfig, ScoutConfig};
use controller::Controller;
use coordinator::Coordinator;
use scrapers::{ChromePage, ScraperEngine};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    match config.format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn wait_for(duration: Option<Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ScoutConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    init_logging(&config.logging);

    info!("🔎 Lead Scout");
    info!("==========================================");

    let mut controller = Controller::new(None);
    controller.set_search_term(cli.term.clone());
    controller.set_search_type(cli.search_type);
    controller.set_city(cli.city.clone().unwrap_or_default());

    if !controller.can_start() {
        anyhow::bail!("Search term must not be empty");
    }

    let page = ChromePage::launch(&config.browser)?;

    // engine -> coordinator -> controller
    let (engine_tx, engine_rx) = mpsc::unbounded_channel();
    let (relay_tx, mut controller_rx) = mpsc::unbounded_channel();

    let engine = ScraperEngine::new(page, &config.engine, engine_tx)
        .context("Failed to create scraper engine")?;
    let (handle, engine_task) = engine.spawn();
    tokio::spawn(Coordinator::new(engine_rx, relay_tx).run());

    controller.attach(handle.clone());

    info!(
        "Searching {} for \"{}\"{}",
        cli.search_type,
        cli.term,
        cli.city
            .as_deref()
            .map(|city| format!(" in {city}"))
            .unwrap_or_default()
    );
    info!("Type pause, resume or stop and press enter; Ctrl-C also stops");
    controller.start().await;

    let deadline = wait_for(cli.duration_secs.map(Duration::from_secs));
    tokio::pin!(deadline);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            Some(event) = controller_rx.recv() => controller.absorb(event),
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "pause" if controller.is_paused() => info!("Search is already paused"),
                    "resume" if !controller.is_paused() => info!("Search is not paused"),
                    "pause" | "resume" => controller.toggle_pause().await,
                    "stop" => break,
                    "" => {}
                    other => warn!("Unknown input `{}` (pause, resume, stop)", other),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("Stopped reading stdin: {}", e);
                    stdin_open = false;
                }
            },
            _ = &mut deadline => {
                info!("Time limit reached");
                break;
            }
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
        }
    }

    if controller.is_searching() {
        controller.stop().await;
    }
    info!("Stopped after {} scrolls", handle.status().state.scroll_count);

    // Closing every command sender ends the engine task, which in turn ends the relay.
    controller.detach();
    drop(handle);
    if let Err(e) = engine_task.await {
        warn!("Scraper engine task failed: {}", e);
    }
    while let Some(event) = controller_rx.recv().await {
        controller.absorb(event);
    }

    info!("\n✅ Found {} entities\n", controller.results().len());
    for (i, row) in controller.results().iter().enumerate() {
        println!("{}. {} [{}]", i + 1, row.entity.name, row.entity.entity_type);
        println!("   {}", row.entity.profile_url);
        println!();
    }

    controller
        .export_json(&config.output.results_path)
        .await?;

    Ok(())
}
