//! Tankduel entry point
//!
//! Modes (first argument):
//! - `relay`      run the rendezvous relay service
//! - `host`       register with the relay, print a join id, wait for a
//!                peer, then play as the authoritative side
//! - `join <id>`  dial a host through the relay and play as the
//!                non-authoritative side
//! - `demo`       two in-process peers over the in-memory transport
//!
//! `host`/`join`/`demo` play via the bot pilot since the process is
//! headless; real frontends embed the library instead.

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use tankduel::config::Config;
use tankduel::game::GameConfig;
use tankduel::net::transport::Channel;
use tankduel::net::ws;
use tankduel::relay;
use tankduel::session::{Bot, LogFrontend, Session};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    let game_cfg = GameConfig {
        width: config.viewport_width,
        height: config.viewport_height,
        ..GameConfig::default()
    };

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "demo".to_string());

    match mode.as_str() {
        "relay" => {
            relay::run(config.relay_addr).await?;
        }

        "host" => {
            let listener = ws::open_host(&config.relay_url)
                .await
                .context("failed to register with the relay")?;
            info!(join_id = %listener.peer_id(), "share this id: `tankduel join <id>`");

            let channel = listener
                .accept()
                .await
                .context("failed to accept a peer")?;

            let session =
                Session::new_authoritative(game_cfg, channel, LogFrontend, rand::random());
            let end = session.run(Some(Bot::new(rand::random()))).await;
            info!(end = ?end, "session finished");
        }

        "join" => {
            let id = args
                .next()
                .context("usage: tankduel join <host-id>")?;
            let host_id: Uuid = id.parse().context("host id is not a valid UUID")?;

            let channel = ws::open_join(&config.relay_url, host_id)
                .await
                .context("failed to reach the host")?;

            let session = Session::new_non_authoritative(game_cfg, channel, LogFrontend);
            let end = session.run(Some(Bot::new(rand::random()))).await;
            info!(end = ?end, "session finished");
        }

        "demo" => {
            info!("local demo: two bot-piloted peers over the in-memory transport");
            let (host_channel, guest_channel) = Channel::memory_pair(64);

            let host = Session::new_authoritative(
                game_cfg.clone(),
                host_channel,
                LogFrontend,
                rand::random(),
            );
            let guest = Session::new_non_authoritative(game_cfg, guest_channel, LogFrontend);

            let host_task = tokio::spawn(host.run(Some(Bot::new(rand::random()))));
            let guest_task = tokio::spawn(guest.run(Some(Bot::new(rand::random()))));

            let (host_end, guest_end) = tokio::try_join!(host_task, guest_task)?;
            info!(host = ?host_end, guest = ?guest_end, "demo finished");
        }

        other => {
            bail!("unknown mode `{other}` (expected relay, host, join or demo)");
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
