use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use ladle::{Migrations, config::Configuration, state::ServiceState};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Opt {
    /// Configuration files, later ones overriding earlier ones.
    #[clap(short, long, value_parser)]
    pub config: Vec<PathBuf>,
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::warn!("Unable to listen for shutdown signal: {err}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = Opt::parse();

    let config = Configuration::config(Configuration::figment(options.config))?;

    let client = hiqlite::start_node(config.clone().try_into()?).await?;
    client.wait_until_healthy_db().await;
    client.migrate::<Migrations>().await?;

    let state = Arc::new(ServiceState::new(config.clone(), client.clone()));

    let listener = TcpListener::bind((config.http.address.as_str(), config.http.port)).await?;
    info!("Serving recipes on {}", listener.local_addr()?);

    axum::serve(listener, ladle::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    client.shutdown().await?;

    Ok(())
}
