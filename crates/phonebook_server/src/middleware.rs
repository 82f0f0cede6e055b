//! Request-scoped middleware: timeout budget, access log, panic capture.

use crate::config::RunMode;
use crate::error::{ApiError, ApiFailure};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use log::{info, warn};
use std::any::Any;
use std::time::Instant;

const MAX_PANIC_MESSAGE_CHARS: usize = 160;

/// Fails the request with 503 when it outlives the configured budget.
///
/// Store work already handed to the blocking pool is not cancelled, so a
/// create, update or delete answered with 503 may still commit.
pub async fn enforce_timeout(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(
                "event=request_timeout module=server status=error timeout_ms={}",
                state.request_timeout.as_millis()
            );
            state.fail(ApiError::Timeout).into_response()
        }
    }
}

/// One access line per request; bodies are never logged.
pub async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    info!(
        "event=http_request module=server method={} path={} status={} duration_ms={}",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

/// Renders a caught handler panic as a 500 envelope.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>, mode: RunMode) -> Response {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    let message = message
        .replace(['\n', '\r'], " ")
        .chars()
        .take(MAX_PANIC_MESSAGE_CHARS)
        .collect();
    ApiFailure::new(ApiError::Panicked(message), mode).into_response()
}
