use std::net::SocketAddr;

use axum::ServiceExt;
use axum::extract::Request;
use dotenvy::dotenv;
use tokio::time::Duration;
use tracing::{error, info};

use wanderlust::bootstrap::app_context::AppContext;
use wanderlust::bootstrap::config::Config;
use wanderlust::bootstrap::services::{build_services, spawn_session_sweeper};
use wanderlust::presentation::http;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "wanderlust=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting Wanderlust");

    let services = build_services(&cfg).await?;
    let ctx = AppContext::new(cfg.clone(), services);

    let sweeper = spawn_session_sweeper(ctx.session_store(), SESSION_SWEEP_INTERVAL);

    let app = http::app(ctx);
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP listening");

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    sweeper.abort();
    if let Err(e) = &served {
        error!(?e, "HTTP server failed");
    }
    served?;
    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(?e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
