//! `fxg serve` -- connect the bot and serve the webhook API.
//!
//! # Lifecycle
//!
//! ```text
//! 1. Load and validate config
//! 2. Build the REST client and the shared RelayService
//! 3. Spawn the gateway loop (READY flips the service to ready)
//! 4. Bind the HTTP listener and serve the router
//! 5. On Ctrl+C: stop accepting requests, cancel the gateway, wait for it
//! ```

use std::sync::Arc;

use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use fxg_discord::{DiscordApiClient, DiscordGateway};
use fxg_relay::RelayService;
use fxg_relay::api::build_router;

use super::load_config;

/// Arguments for the `fxg serve` subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen port (overrides config and PORT).
    #[arg(short, long)]
    pub port: Option<u16>,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    let api = DiscordApiClient::with_base_url(
        config.discord.token.clone(),
        config.discord.api_base_url.clone(),
    );
    let gateway = DiscordGateway::new(
        config.discord.token.clone(),
        config.discord.gateway_url.clone(),
        config.discord.intents,
    );
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let service = Arc::new(RelayService::new(config, Arc::new(api)));

    let cancel = CancellationToken::new();
    let gateway_task = {
        let handler = service.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = gateway.run(handler, cancel).await {
                error!(error = %e, "gateway stopped");
            }
        })
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    info!(addr = %addr, "webhook API listening");

    let shutdown = cancel.clone();
    let served = axum::serve(listener, build_router(service))
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("shutting down"),
                _ = shutdown.cancelled() => {}
            }
        })
        .await;

    cancel.cancel();
    if let Err(e) = gateway_task.await {
        error!(error = %e, "gateway task panicked");
    }
    served?;
    info!("stopped");
    Ok(())
}
