//! HTTP error responses.
//!
//! Every failure leaves the server as `{"detail": "..."}`. Client errors carry
//! their message; server errors are logged in full and answered with a
//! generic detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::QrBuilderError;

const INTERNAL_DETAIL: &str = "Internal server error";

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub enum ApiError {
    /// Failure from the generation pipeline
    Builder(QrBuilderError),
    /// Extractor rejection (body too large, malformed multipart, ...)
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn rejected(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Builder(err) => StatusCode::from_u16(err.to_http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Rejected { status, .. } => *status,
        }
    }

    /// Detail shown to the client.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Builder(err) if err.is_client_error() => err.to_string(),
            ApiError::Builder(_) => INTERNAL_DETAIL.to_string(),
            ApiError::Rejected { status, .. } if status.is_server_error() => {
                INTERNAL_DETAIL.to_string()
            }
            ApiError::Rejected { message, .. } => message.clone(),
        }
    }
}

impl From<QrBuilderError> for ApiError {
    fn from(err: QrBuilderError) -> Self {
        ApiError::Builder(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Builder(err) if status.is_server_error() => {
                tracing::error!(error = %err, status = status.as_u16(), "Request failed");
            }
            ApiError::Builder(err) => {
                tracing::warn!(error = %err, status = status.as_u16(), "Bad request");
            }
            ApiError::Rejected { message, .. } => {
                tracing::warn!(error = %message, status = status.as_u16(), "Request rejected");
            }
        }

        let body = ErrorBody {
            detail: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
