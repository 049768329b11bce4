//! HTTP API surface for the dashboard front-end (spec.md §4.8, §6).
//!
//! A thin `axum` router: every handler locks straight through to
//! `loom-storage`/`loom-engine`/`loom-query` and translates errors into the
//! `{error, code, details?}` envelope from §7. Never started by the engine
//! itself -- the CLI's `dashboard`/`server start` subcommands own the
//! process lifecycle (spec.md §4.5).

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Binds `addr` and serves the API until `shutdown` resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "dashboard listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}

/// Convenience wrapper: serves until SIGINT/SIGTERM, for direct `dashboard`
/// CLI invocations that don't already manage their own shutdown signal.
pub async fn serve_until_signal(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    serve(state, addr, shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
