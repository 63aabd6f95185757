//! HTTP error mapping.
//!
//! Every failure leaves the API as an `{message, error}` envelope with the
//! status code that matches its class.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use super::page::PageError;
use crate::db::DbError;

/// Error envelope returned on every failure path.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "failed to fetch todos")]
    pub message: String,
    #[schema(example = "Database query failed")]
    pub error: String,
}

/// Errors a handler can answer with.
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Malformed request: {0}")]
    #[diagnostic(code(todo_api::api::malformed_request))]
    MalformedRequest(String),

    #[error("Todo '{id}' not found")]
    #[diagnostic(code(todo_api::api::not_found))]
    NotFound { id: String },

    #[error("{context}")]
    #[diagnostic(code(todo_api::api::storage))]
    Storage {
        context: &'static str,
        #[source]
        source: DbError,
    },

    #[error("Failed to render page")]
    #[diagnostic(code(todo_api::api::page))]
    Page(#[from] PageError),

    #[error("Request did not complete in time")]
    #[diagnostic(code(todo_api::api::request_timeout))]
    RequestTimeout,
}

impl ApiError {
    /// Map a storage failure, keeping `NotFound` distinct from real errors.
    pub fn from_db(context: &'static str, err: DbError) -> Self {
        match err {
            DbError::NotFound { id, .. } => ApiError::NotFound { id },
            source => ApiError::Storage { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } | ApiError::Page(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::MalformedRequest(detail) => ErrorResponse {
                message: "malformed request".to_string(),
                error: detail.clone(),
            },
            ApiError::NotFound { .. } => ErrorResponse {
                message: "todo not found".to_string(),
                error: self.to_string(),
            },
            // Only the top-level message reaches the client; the driver's
            // error chain goes to the log.
            ApiError::Storage { context, source } => {
                error!(error = ?source, "{}", context);
                ErrorResponse {
                    message: context.to_string(),
                    error: source.to_string(),
                }
            }
            ApiError::Page(source) => {
                error!(error = ?source, "Failed to render page");
                let error = match source {
                    // The template path stays in the log
                    PageError::Read { .. } => "Page template could not be read".to_string(),
                    PageError::Encoding { .. } => "Page template is not valid UTF-8".to_string(),
                    missing @ PageError::Missing { .. } => missing.to_string(),
                };
                ErrorResponse {
                    message: self.to_string(),
                    error,
                }
            }
            ApiError::RequestTimeout => ErrorResponse {
                message: "request timed out".to_string(),
                error: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
