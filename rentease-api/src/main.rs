//! # RentEase API Server
//!
//! Rental management backend: landlord and tenant accounts, sessions,
//! password reset, landlord tenant lists and a real-time payment feed for
//! dashboards.
//!
//! ## Usage
//!
//! ```bash
//! SESSION_SECRET=$(openssl rand -hex 32) cargo run -p rentease-api
//! ```
//!
//! Without `DATABASE_URL` the server runs on an in-memory store that is lost
//! on restart.

use rentease_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use rentease_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, PoolSettings},
    },
    store::{MemoryUserStore, PgUserStore, UserStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(
        "RentEase API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let postgres = match &config.database {
        Some(db) => {
            let pool = create_pool(PoolSettings::new(db.url.clone()).max_connections(db.max_connections))
                .await?;
            run_migrations(&pool).await?;
            Some(PgUserStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            None
        }
    };

    let store: Arc<dyn UserStore> = match &postgres {
        Some(pg) => Arc::new(pg.clone()),
        None => Arc::new(MemoryUserStore::new()),
    };
    tracing::info!(storage = store.backend_name(), "Storage ready");

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg) = postgres {
        close_pool(pg.pool().clone()).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rentease_api=debug,rentease_shared=debug,tower_http=debug".into());

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received terminate signal, shutting down"),
    }
}
