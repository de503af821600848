mod console;
mod streams;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tether_client::{
    NegotiatorConfig, RetryPolicy, SignalingConfig, StreamEndpoint, StreamRegistry,
    WebrtcNegotiator, WsTransport, WsTransportConfig,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleListener, status_line};
use crate::streams::expand_streamers;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version, about = "Keeps signaling sessions to camera streamers alive")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to one or more streamers and keep the connections up.
    Watch {
        /// Streamer ids. `all` expands to the eight default cameras.
        #[arg(required = true)]
        streamers: Vec<String>,

        #[arg(long, env = "TETHER_SIGNALING_URL", default_value = "ws://localhost:80/signaling")]
        url: String,

        /// Seconds between status lines.
        #[arg(long, default_value_t = 5)]
        status_interval: u64,

        /// Seconds between WebSocket keep-alive pings.
        #[arg(long, default_value_t = 10)]
        ping_interval: u64,

        #[arg(long = "ice-server", env = "TETHER_ICE_SERVER")]
        ice_servers: Vec<String>,

        /// Only keep signaling up; do not negotiate media.
        #[arg(long)]
        signaling_only: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            streamers,
            url,
            status_interval,
            ping_interval,
            ice_servers,
            signaling_only,
        } => {
            let mut negotiator_config = NegotiatorConfig::default();
            if !ice_servers.is_empty() {
                negotiator_config.ice_servers = ice_servers;
            }
            let negotiator_config = (!signaling_only).then_some(negotiator_config);

            let transport_config = WsTransportConfig {
                ping_interval: Duration::from_secs(ping_interval.max(1)),
            };

            watch(
                expand_streamers(&streamers),
                url,
                Duration::from_secs(status_interval.max(1)),
                transport_config,
                negotiator_config,
            )
            .await?;
        }
    }

    Ok(())
}

async fn watch(
    streamers: Vec<String>,
    url: String,
    status_interval: Duration,
    transport_config: WsTransportConfig,
    negotiator_config: Option<NegotiatorConfig>,
) -> Result<()> {
    println!(
        "{} {} stream(s) via {}",
        "Watching".green().bold(),
        streamers.len(),
        url.cyan()
    );

    let registry = StreamRegistry::new(RetryPolicy::default(), move |stream_id| {
        let endpoint = StreamEndpoint::new(
            SignalingConfig::for_streamer(url.clone(), stream_id),
            Arc::new(WsTransport::with_config(transport_config.clone())),
        )
        .with_listener(Arc::new(ConsoleListener::new(stream_id)));

        let Some(config) = negotiator_config.clone() else {
            return endpoint;
        };
        match WebrtcNegotiator::new(config) {
            Ok(negotiator) => endpoint.with_delegate(Arc::new(negotiator)),
            Err(e) => {
                warn!("Media disabled for {}: {:?}", stream_id, e);
                endpoint
            }
        }
    });

    for stream_id in &streamers {
        registry.get_or_create(stream_id);
    }
    registry.start_all();

    let mut ticker = tokio::time::interval(status_interval);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                for (stream_id, status) in registry.statuses() {
                    println!("{}", status_line(&stream_id, &status));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                break;
            }
        }
    }

    println!("{}", "Shutting down...".yellow());
    registry.stop_all().await;
    println!("{}", "All streams stopped.".green().bold());

    Ok(())
}
