//! Poker Timer - tournament blind-level clock server
//!
//! This is the main entry point for the poker-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use poker_timer::{
    config::Config,
    state::AppState,
    store::TimerStore,
    api::create_router,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("poker_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting poker-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, database={}, level={}min",
          config.host, config.port, config.database, config.level_minutes);

    let store = TimerStore::connect(&config.database).await?;
    info!("Database connected");

    let state = Arc::new(AppState::new(
        store,
        config.default_schedule(),
        config.port,
        config.host.clone(),
    ));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /api/games/:id/timer             - Timer snapshot");
    info!("  PUT  /api/games/:id/timer/start       - Start the clock");
    info!("  PUT  /api/games/:id/timer/pause       - Pause the clock");
    info!("  PUT  /api/games/:id/timer/resume      - Resume the clock");
    info!("  PUT  /api/games/:id/timer/reset       - Reset the clock");
    info!("  PUT  /api/games/:id/timer/schedule    - Replace the schedule");
    info!("  PUT  /api/games/:id/timer/preset/:idx - Apply a preset");
    info!("  PUT  /api/games/:id/status            - Set game status");
    info!("  GET  /api/club/timer/presets          - List presets");
    info!("  PUT  /api/club/timer/presets          - Save presets");
    info!("  GET  /status                          - Server status");
    info!("  GET  /health                          - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
