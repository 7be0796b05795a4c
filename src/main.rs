//! Wave portal command-line client.
//!
//! # Architecture Overview
//!
//! ```text
//!   wallet (EIP-1193 JSON-RPC)
//!        ▲
//!        │ eth_accounts / eth_requestAccounts / eth_chainId
//!        │ eth_call / eth_sendTransaction / eth_getLogs
//!  ┌─────┴──────────┐    ┌──────────────┐    ┌──────────────────┐
//!  │ ProviderGateway│◀───│ NetworkGuard │◀───│ FeedSynchronizer │
//!  └─────▲──────────┘    └──────────────┘    └────────▲─────────┘
//!        │               ┌──────────────┐             │
//!        └───────────────│ ChainContract│◀────────────┤
//!                        └──────────────┘    ┌────────┴─────────┐
//!                                            │ SessionController│◀── CLI
//!                                            └──────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::time::{interval, MissedTickBehavior};
use tracing::Instrument;

use wave_portal::config::{load_config, PortalConfig};
use wave_portal::lifecycle::signals::spawn_signal_listener;
use wave_portal::lifecycle::startup::build_controller;
use wave_portal::lifecycle::Shutdown;
use wave_portal::observability::{logging, metrics};
use wave_portal::{Message, SessionController, SyncError};

#[derive(Parser)]
#[command(name = "wave-portal")]
#[command(about = "Send waves to the WavePortal contract and follow the live feed", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request account access (may prompt in the wallet) instead of silent discovery.
    #[arg(long)]
    connect: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show wallet session and feed state
    Status,
    /// Print every wave, newest first
    Feed,
    /// Submit a wave and wait until it is mined
    Wave {
        /// Message text
        text: String,
    },
    /// Follow the live feed until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!("wave-portal v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Metrics disabled");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut controller = build_controller(&config)?;
    let span = tracing::info_span!("session", session_id = %controller.id());

    let code = run(&cli, &config, &mut controller).instrument(span).await;
    controller.teardown();

    tracing::info!("Shutdown complete");
    Ok(code)
}

async fn run(cli: &Cli, config: &PortalConfig, controller: &mut SessionController) -> ExitCode {
    let connected = if cli.connect {
        controller.connect().await
    } else {
        controller.load().await
    };
    if let Err(e) = &connected {
        report(e);
    }

    match &cli.command {
        Commands::Status => {
            let status = json!({
                "state": controller.state(),
                "session": controller.session(),
                "required_network": controller.required_network(),
                "feed": format!("{:?}", controller.sync_state()),
                "messages": controller.feed().len(),
            });
            match serde_json::to_string_pretty(&status) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("error: {}", e),
            }
            ExitCode::SUCCESS
        }
        Commands::Feed => {
            if connected.is_err() {
                return ExitCode::FAILURE;
            }
            if !controller.state().is_connected() {
                report(&SyncError::NotConnected);
                return ExitCode::FAILURE;
            }
            for message in controller.snapshot().iter().rev() {
                print_message(message);
            }
            ExitCode::SUCCESS
        }
        Commands::Wave { text } => match controller.wave(text).await {
            Ok(handle) => {
                println!("{} {:?}", handle.hash, handle.status);
                ExitCode::SUCCESS
            }
            Err(e) => {
                report(&e);
                ExitCode::FAILURE
            }
        },
        Commands::Watch => {
            watch(controller, Duration::from_millis(config.sync.wallet_poll_interval_ms)).await;
            ExitCode::SUCCESS
        }
    }
}

/// Print new feed entries as they arrive and relay wallet account/network
/// changes to the controller.
async fn watch(controller: &mut SessionController, wallet_poll: Duration) {
    let shutdown = Shutdown::new();
    let mut shutdown_rx = shutdown.subscribe();
    let listener = spawn_signal_listener(shutdown);

    let mut ticker = interval(wallet_poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut printed = 0usize;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll_wallet(controller).await;

                let feed = controller.snapshot();
                if feed.len() < printed {
                    // Feed was reset (network or account switch) and reloaded.
                    printed = 0;
                }
                for message in &feed[printed..] {
                    print_message(message);
                }
                printed = feed.len();
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("Watch loop received shutdown signal, exiting");
                break;
            }
        }
    }

    listener.abort();
}

async fn poll_wallet(controller: &mut SessionController) {
    let gateway = controller.gateway().clone();
    if !gateway.detect() {
        return;
    }

    match gateway.get_accounts().await {
        Ok(accounts) => {
            if let Err(e) = controller.on_accounts_changed(accounts).await {
                report(&e);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to poll wallet accounts"),
    }

    match gateway.get_network_id().await {
        Ok(network) => {
            if let Err(e) = controller.on_chain_changed(network).await {
                report(&e);
            }
        }
        Err(e) => tracing::warn!(error = %e, "Failed to poll wallet network"),
    }
}

fn print_message(message: &Message) {
    println!(
        "[{}] {}: {}",
        message.submitted_at_unix_seconds, message.author, message.text
    );
}

fn report(err: &SyncError) {
    eprintln!("error: {} ({})", err, err.corrective_action());
}
