//! HTTP surface for the phonebook.
//!
//! # Responsibility
//! - Assemble the router and its middleware stack.
//! - Own the store lifecycle: open before binding, release after draining.
//!
//! # Invariants
//! - The server never binds when the store failed to open.
//! - Handler panics are contained to their request.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use config::ServerConfig;
use log::info;
use phonebook_core::{open_store, RepoError};
use state::AppState;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open store: {0}")]
    Store(#[from] RepoError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(std::io::Error),
}

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/api/persons",
            get(routes::list_persons)
                .post(routes::create_person)
                .fallback(routes::unknown_endpoint),
        )
        .route(
            "/api/persons/:id",
            get(routes::get_person)
                .put(routes::update_person)
                .delete(routes::delete_person)
                .fallback(routes::unknown_endpoint),
        )
        .route(
            "/info",
            get(routes::info).fallback(routes::unknown_endpoint),
        )
        .fallback(routes::unknown_endpoint);
    with_middleware(routes, state)
}

/// Wraps `routes` in the request stack: timeout, panic capture, access log,
/// body limit.
pub fn with_middleware(routes: Router<AppState>, state: AppState) -> Router {
    let mode = state.mode;
    routes
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::enforce_timeout,
        ))
        .layer(CatchPanicLayer::custom(move |payload| {
            middleware::panic_response(payload, mode)
        }))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Opens the store, serves until a shutdown signal, then releases the store.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let repo = open_store(&config.store)?;
    let state = AppState::new(repo, &config);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(
        "event=server_start module=server status=ok addr={} mode={} store={}",
        addr,
        config.mode,
        config.store.mode()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!(
        "event=store_close module=server status=ok store={}",
        config.store.mode()
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("event=signal_install module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                log::error!(
                    "event=signal_install module=server status=error signal=sigterm error={err}"
                );
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
    info!("event=server_shutdown module=server status=draining");
}
