use std::sync::Arc;

use clap::Parser;
use searchzone_core::loading::load_road_graph;
use searchzone_server::config::{Args, ServerConfig};
use searchzone_server::isochrone::OpenRouteService;
use searchzone_server::{AppState, app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::load(&args)?;

    let graph_path = config.graph_path()?.to_path_buf();
    tracing::info!(path = %graph_path.display(), "Loading road graph");
    let graph = tokio::task::spawn_blocking(move || load_road_graph(&graph_path)).await??;
    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Road graph ready"
    );

    let isochrone = Arc::new(OpenRouteService::new(&config.isochrone)?);
    let bind = config.bind;
    let router = app(AppState::new(graph, config, isochrone));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
