//! # engine_app: tank runtime client
//!
//! Runs the client-side ECS for one game session.
//!
//! ## Startup Sequence
//!
//! 1. Connect to NATS (`--nats-url`, then `NATS_URL`, then
//!    `nats://localhost:4222`).
//! 2. Spawn the bridge that pumps `rtb.client.<player>` into the session and
//!    the session's outbound queue onto `rtb.server`.
//! 3. Build the tank scene, mark the host ready, and start the tick loop on a
//!    blocking thread. Systems stay disabled until the handshake completes.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use engine_app::{AppConfig, HandshakeConfig, TankScene, TickConfig, TickLoop};
use engine_net::{NatsBridge, NetworkSession, bridge};

/// Command-line flags.
#[derive(Debug, Parser)]
#[command(name = "engine_app", about = "Tank runtime client")]
struct Args {
    /// NATS server URL.
    #[arg(long)]
    nats_url: Option<String>,

    /// Player identity announced during the handshake. Random if omitted.
    #[arg(long)]
    player: Option<String>,

    /// Target ticks per second.
    #[arg(long, default_value_t = 60.0, value_parser = parse_rate)]
    tick_rate: f64,

    /// Fixed-timestep boundaries per second.
    #[arg(long, default_value_t = 50.0, value_parser = parse_rate)]
    fixed_rate: f64,

    /// Stop after this many ticks (0 = run forever).
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,

    /// Milliseconds between unanswered handshake requests.
    #[arg(long, default_value_t = 1000)]
    retry_ms: u64,
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("`{s}` is not a number: {e}"))?;
    engine_app::check_rate("rate", value).map_err(|e| e.to_string())
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let mut handshake =
            HandshakeConfig::default().with_retry_interval(Duration::from_millis(args.retry_ms));
        if let Some(player) = args.player {
            handshake = handshake.with_player(player);
        }
        Self {
            tick: TickConfig::default()
                .with_tick_rate(args.tick_rate)
                .with_fixed_rate(args.fixed_rate)
                .with_max_ticks(args.max_ticks),
            handshake,
            nats_url: args.nats_url,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let config = AppConfig::from(Args::parse());
    info!(player = %config.handshake.local_player, "tank client starting");

    let url = bridge::resolve_url(config.nats_url.as_deref());
    let nats = NatsBridge::connect(&url, &config.handshake.local_player).await?;

    let (session, endpoint) = NetworkSession::pair();
    let bridge_task = tokio::spawn(async move {
        if let Err(e) = nats.run(endpoint).await {
            warn!(%e, "NATS bridge stopped");
        }
    });

    let mut tick_loop = TickLoop::new(config.tick, config.handshake, session)?;
    let outcome = tokio::task::spawn_blocking(move || {
        tick_loop.setup(&mut TankScene::default())?;
        tick_loop.on_ready();
        tick_loop.start();
        tick_loop.run()
    })
    .await?;

    bridge_task.abort();
    outcome?;

    info!("tank client shut down");
    Ok(())
}
