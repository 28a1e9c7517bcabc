use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geodash::api;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "geodash=debug,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = geodash::config::load()?;
    let args = geodash::cli::Cli::parse();

    match args.command {
        Some(geodash::cli::Commands::Serve { port }) => {
            let port = port.unwrap_or(cfg.port);
            run_server(cfg, port).await
        }
        Some(geodash::cli::Commands::Resolve { ip }) => {
            let state = geodash::build_state(cfg);
            let point = state.resolver.resolve(&ip).await;
            println!("{}", serde_json::to_string_pretty(&point)?);
            Ok(())
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    }
}

async fn run_server(cfg: geodash::config::Config, port: u16) -> anyhow::Result<()> {
    let state = geodash::build_state(cfg);
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("geodash listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
