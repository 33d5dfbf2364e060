use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_board::board::{BoardConfig, BoardLoader};
use departure_board::domain::TransitMode;
use departure_board::transit::{TransitClient, TransitConfig};
use departure_board::web::{AppState, create_router};

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("departure_board=info")),
        )
        .init();

    // The one startup parameter: which mode to show
    let mode = match std::env::var("TRANSIT_MODE") {
        Ok(value) => match TransitMode::parse(&value) {
            Ok(mode) => mode,
            Err(e) => {
                error!("{e}");
                std::process::exit(2);
            }
        },
        Err(_) => TransitMode::default(),
    };

    let mut transit_config = TransitConfig::new();
    if let Ok(url) = std::env::var("TRANSIT_API_URL") {
        transit_config = transit_config.with_base_url(url);
    }
    match std::env::var("TRANSIT_API_KEY") {
        Ok(key) if !key.is_empty() => transit_config = transit_config.with_api_key(key),
        _ => warn!("TRANSIT_API_KEY not set; using anonymous rate limits"),
    }

    let client = match TransitClient::new(transit_config) {
        Ok(client) => client,
        Err(e) => {
            error!("failed to create transit client: {e}");
            std::process::exit(1);
        }
    };

    let board = Arc::new(BoardLoader::new(client, BoardConfig::new(mode)));

    // First load in the background so the server is up immediately
    let initial = board.clone();
    tokio::spawn(async move {
        if let Err(e) = initial.load().await {
            warn!("initial board load failed: {e}");
        }
    });

    let app = create_router(AppState::new(board));

    let addr: SocketAddr = match std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
    {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid BIND_ADDR: {e}");
            std::process::exit(2);
        }
    };

    info!("{} departure board listening on http://{addr}", mode.label());
    info!("  GET  /health                  - Health check");
    info!("  GET  /api/departures          - Current board");
    info!("  POST /api/departures/refresh  - Reload the board");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {e}");
        std::process::exit(1);
    }
}
