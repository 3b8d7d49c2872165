//! # Taskboard API Server
//!
//! REST API for a multi-user kanban board, with a WebSocket channel
//! that notifies live viewers after every mutation.
//!
//! ## Startup sequence
//!
//! 1. Load configuration from the environment
//! 2. Connect the database pool (fails fast if unreachable)
//! 3. Run embedded migrations
//! 4. Seed the default columns into an empty board
//! 5. Serve until SIGINT
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskboard \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p taskboard-api
//! ```

use taskboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskboard_shared::{
    db::{migrations::run_migrations, pool::create_pool},
    models::column::BoardColumn,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    if BoardColumn::seed_defaults(&pool).await? {
        tracing::info!("Seeded default columns into empty board");
    }

    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, exiting...");
}
