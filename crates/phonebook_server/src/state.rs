//! Shared request state.
//!
//! # Responsibility
//! - Own the phonebook service for the server's lifetime.
//! - Move blocking store work off the async runtime.

use crate::config::{RunMode, ServerConfig};
use crate::error::{ApiError, ApiFailure};
use phonebook_core::{PhonebookService, ServiceResult, SharedRepository};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PhonebookService<SharedRepository>>,
    pub mode: RunMode,
    pub request_timeout: Duration,
    pub docs_url: Arc<str>,
}

impl AppState {
    pub fn new(repo: SharedRepository, config: &ServerConfig) -> Self {
        Self {
            service: Arc::new(PhonebookService::new(repo)),
            mode: config.mode,
            request_timeout: config.request_timeout,
            docs_url: Arc::from(config.docs_url.as_str()),
        }
    }

    /// Runs a service call on the blocking pool.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiFailure>
    where
        T: Send + 'static,
        F: FnOnce(&PhonebookService<SharedRepository>) -> ServiceResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let outcome = tokio::task::spawn_blocking(move || op(&service))
            .await
            .map_err(|err| self.fail(ApiError::from(err)))?;
        outcome.map_err(|err| self.fail(ApiError::Service(err)))
    }

    pub fn fail(&self, error: ApiError) -> ApiFailure {
        ApiFailure::new(error, self.mode)
    }
}
