//! HTTP error boundary.
//!
//! # Responsibility
//! - Map every failure a handler can see onto a status code and the JSON
//!   error envelope.
//!
//! # Invariants
//! - Every error body carries `success: false`, a message, and a kind.
//! - `details` and `sourceChain` appear only in development mode.
//! - Internal failures never echo their cause in production.

use crate::config::RunMode;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use phonebook_core::{ErrorKind, PersonId, ServiceError};
use serde::Serialize;
use std::error::Error as _;
use thiserror::Error;
use tokio::task::JoinError;

const INTERNAL_MESSAGE: &str = "Internal server error";
const TIMEOUT_KIND: &str = "Timeout";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
    #[error("Request timed out")]
    Timeout,
    #[error("worker task failed: {0}")]
    Worker(#[from] JoinError),
    #[error("handler panicked: {0}")]
    Panicked(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => match err.kind() {
                ErrorKind::Validation | ErrorKind::MalformedIdentifier => StatusCode::BAD_REQUEST,
                ErrorKind::Duplicate => StatusCode::CONFLICT,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::MalformedBody(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Worker(_) | Self::Panicked(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Service(err) => err.kind().as_str(),
            Self::MalformedBody(_) => ErrorKind::Validation.as_str(),
            Self::Timeout => TIMEOUT_KIND,
            Self::Worker(_) | Self::Panicked(_) => ErrorKind::Internal.as_str(),
        }
    }

    /// Client-facing message; internal causes are replaced by a fixed text.
    pub fn public_message(&self) -> String {
        match self {
            Self::Service(ServiceError::Internal(_)) | Self::Worker(_) | Self::Panicked(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    fn required_fields(&self) -> Option<Vec<&'static str>> {
        match self {
            Self::Service(ServiceError::MissingFields(fields)) => Some(fields.clone()),
            _ => None,
        }
    }

    fn existing_id(&self) -> Option<PersonId> {
        match self {
            Self::Service(ServiceError::Duplicate { existing_id, .. }) => *existing_id,
            _ => None,
        }
    }

    fn source_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = self.source();
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        chain
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_fields: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<PersonId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_chain: Option<Vec<String>>,
}

impl ErrorBody {
    pub fn from_error(error: &ApiError, mode: RunMode) -> Self {
        let (details, source_chain) = if mode.exposes_details() {
            (Some(error.to_string()), Some(error.source_chain()))
        } else {
            (None, None)
        };
        Self {
            success: false,
            error: error.public_message(),
            kind: error.kind(),
            required_fields: error.required_fields(),
            existing_id: error.existing_id(),
            details,
            source_chain,
        }
    }
}

/// An `ApiError` bound to the mode it should be rendered in.
#[derive(Debug)]
pub struct ApiFailure {
    pub error: ApiError,
    pub mode: RunMode,
}

impl ApiFailure {
    pub fn new(error: ApiError, mode: RunMode) -> Self {
        Self { error, mode }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            error!(
                "event=request_failed module=server status=error http_status={} error_kind={} error={}",
                status.as_u16(),
                self.error.kind(),
                self.error
            );
        }
        (status, Json(ErrorBody::from_error(&self.error, self.mode))).into_response()
    }
}
