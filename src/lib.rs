//! Blockchain-verified peer-discovery relay with a legacy-compatible HTTP
//! topology API.
//!
//! Three subsystems compose the service: [`vetting`] harvests and verifies
//! pool relays from the blockchain, [`buffer`] holds the resulting
//! [`model::Producer`] samples, and [`server`] serves them behind the
//! legacy `/htopology/v1/` HTTP contract.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod errors;
pub mod http_util;
pub mod legacy_fetch;
pub mod legacy_push;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod probe;
pub mod server;
pub mod shutdown;
pub mod vetting;
pub mod ws_client;

use buffer::ProducerBuffer;
use clap::Parser;
use cli::{Args, Command};
use std::sync::Arc;

/// Parses arguments, loads configuration, and dispatches to the requested
/// subcommand (defaulting to `serve`).
pub async fn start() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = config::Settings::load(args.config.as_deref())?;
    let debug = args.debug || settings.debug;
    logging::init(debug);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Fetch { endpoint_url, network, max, ipv } => {
            match legacy_fetch::fetch(&endpoint_url, network, max, ipv).await {
                Ok(out) => {
                    println!("{out}");
                    Ok(())
                }
                Err(err) => {
                    tracing::error!(%err, "unable to get data");
                    std::process::exit(1);
                }
            }
        }
        Command::Push { endpoint_url, network, port } => {
            match legacy_push::push(&settings.client.endpoint, &endpoint_url, network, port).await {
                Ok(out) => {
                    println!("{out}");
                    Ok(())
                }
                Err(err) => {
                    tracing::error!(%err, "cannot push ledger data");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn serve(settings: config::Settings) -> anyhow::Result<()> {
    let buffer = Arc::new(ProducerBuffer::new(settings.client.fetch_maximum));

    if settings.client.enabled {
        let pipeline = vetting::VettingPipeline::new(
            settings.client.endpoint.clone(),
            buffer.clone(),
            settings.client.probe_timeout,
        );
        let period = settings.client.period_seconds;
        tokio::spawn(pipeline.run(period));
    } else {
        tracing::info!("client.enabled=false, vetting pipeline will not run");
    }

    let state = Arc::new(server::AppState { buffer, settings: settings.server.clone() });
    let app = server::router(state);

    server::serve(&settings.server.listen_addr, app, shutdown::signal_handler())
        .await
        .map_err(Into::into)
}
