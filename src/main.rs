use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;

use tradebook_api::{
    config::{init_tracing, load_config},
    db::{establish_connection_from_app_config, run_migrations},
    events::{process_events, EventSender},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = load_config().context("failed to load configuration")?;
    init_tracing(cfg.log_level(), cfg.log_json);

    info!(environment = %cfg.environment, "Starting tradebook-api");

    let db = Arc::new(
        establish_connection_from_app_config(&cfg)
            .await
            .context("failed to connect to the database")?,
    );

    if cfg.auto_migrate {
        run_migrations(&db)
            .await
            .context("failed to run database migrations")?;
    }

    let (event_tx, event_rx) = mpsc::channel(1024);
    tokio::spawn(process_events(event_rx));
    let event_sender = Some(Arc::new(EventSender::new(event_tx)));

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port configuration")?;
    let state = AppState::new(db, cfg, event_sender);
    let app = tradebook_api::app_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
