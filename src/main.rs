//! PairLens - Uniswap V2 Pair Inspector
//!
//! Run with: cargo run -- <PAIR_ADDRESS>...
//!
//! Every pair costs two Multicall round trips: pair facts, then the metadata
//! of both tokens.

use chrono::Local;
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pairlens::config::Config;
use pairlens::context::AppContext;
use pairlens::display;
use pairlens::inspector::{MulticallAggregator, PairResolver};
use pairlens::state::PairDataStore;

#[derive(Parser)]
#[command(name = "pairlens")]
#[command(about = "Inspect Uniswap V2 pairs: token metadata, reserves and LP supply", long_about = None)]
struct Cli {
    /// Pair contract addresses
    #[arg(required_unless_present = "save_config")]
    pairs: Vec<String>,

    /// Print records as JSON instead of the table view
    #[arg(long)]
    json: bool,

    /// Override RPC_URL
    #[arg(long)]
    rpc_url: Option<String>,

    /// Override MULTICALL_ADDRESS
    #[arg(long)]
    multicall: Option<String>,

    /// Read settings from a TOML file instead of the environment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings to a TOML file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Refresh until Ctrl-C
    #[arg(short, long)]
    watch: bool,

    /// Seconds between refreshes in watch mode (overrides WATCH_INTERVAL_SECS)
    #[arg(short, long)]
    interval: Option<u64>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    if let Some(url) = &cli.rpc_url {
        config.rpc_url = url.clone();
    }
    if let Some(multicall) = &cli.multicall {
        config.multicall_address = multicall.clone();
    }
    if let Some(secs) = cli.interval {
        config.watch_interval_secs = secs;
    }

    Ok(config)
}

fn spinner(hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }

    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

/// Inspect every pair once. Returns the number of pairs that failed.
async fn inspect_all(
    store: &PairDataStore,
    resolver: &PairResolver<MulticallAggregator>,
    pairs: &[String],
    json_output: bool,
) -> Result<usize> {
    let mut failed = 0;
    let mut entries: Vec<Value> = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let bar = spinner(json_output)?;
        bar.set_message(format!("Fetching {}...", pair));

        let state = store.fetch(resolver, pair).await;
        bar.finish_and_clear();

        if let Some(record) = state.record() {
            if json_output {
                entries.push(serde_json::to_value(record)?);
            } else {
                display::print_record(record);
            }
        } else if let Some(message) = state.error() {
            failed += 1;
            if json_output {
                entries.push(json!({ "pairAddress": pair, "error": message }));
            } else {
                display::print_error(message);
                println!();
            }
        } else {
            warn!("Fetch for {} ended without a result: {:?}", pair, state);
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    }

    Ok(failed)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let directive = if cli.verbose { "pairlens=debug" } else { "pairlens=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    if !cli.json {
        display::print_banner();
    }

    // Load configuration
    let config = load_config(&cli)?;

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        error!("Please check your .env file or --config");
        return Err(e);
    }

    if let Some(path) = &cli.save_config {
        config.save_to_file(path)?;
        info!("Configuration written to {}", path.display());
        if cli.pairs.is_empty() {
            return Ok(());
        }
    }

    if !cli.json {
        config.print_summary();
        println!();
    }

    let pairs: Vec<String> = cli
        .pairs
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| {
            if p.is_empty() {
                warn!("Skipping blank pair address");
            }
            !p.is_empty()
        })
        .collect();

    if pairs.is_empty() {
        return Err(eyre!("no pair addresses given"));
    }

    let ctx = AppContext::new(&config)?;
    let resolver = ctx.resolver();
    let store = PairDataStore::new();

    debug!(
        "Resolver bound to multicall {} (configured {})",
        resolver.aggregator().multicall_address(),
        ctx.multicall_address()
    );

    if !cli.watch {
        let failed = inspect_all(&store, &resolver, &pairs, cli.json).await?;
        if failed > 0 {
            return Err(eyre!("{} of {} pairs could not be inspected", failed, pairs.len()));
        }
        return Ok(());
    }

    info!(
        "Watching {} pair(s) every {}s, Ctrl-C to stop",
        pairs.len(),
        config.watch_interval_secs
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(config.watch_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }

        if !cli.json {
            println!(
                "{}",
                style(format!("── {} ──", Local::now().format("%H:%M:%S"))).dim()
            );
        }

        tokio::select! {
            outcome = inspect_all(&store, &resolver, &pairs, cli.json) => {
                let failed = outcome?;
                if failed > 0 {
                    debug!("{} of {} pairs failed this round", failed, pairs.len());
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Fetch cancelled, store is now {:?}", store.state());
                break;
            }
        }
    }

    info!("Stopped");
    Ok(())
}
