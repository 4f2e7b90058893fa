//! Response envelopes shared by every API endpoint.
//!
//! Success: `{success: true, data, metadata}`.
//! Failure: `{success: false, message, error}`.

use crate::error::MarketError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T, M> {
    pub success: bool,
    pub data: T,
    pub metadata: M,
}

impl<T, M> ApiResponse<T, M> {
    pub fn success(data: T, metadata: M) -> Self {
        Self {
            success: true,
            data,
            metadata,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub error: String,
}

/// API-facing error. Only caller usage errors are 400; everything else is 500.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: String,
}

impl ApiError {
    pub fn invalid_query(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            error: MarketError::InvalidQuery(message.clone()).to_string(),
            message,
        }
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidQuery(message) => ApiError::invalid_query(message),
            MarketError::Pipeline { operation, source } => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: format!("Failed to {}", operation),
                error: source.to_string(),
            },
            other => ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Internal server error".to_string(),
                error: other.to_string(),
            },
        }
    }
}

/// A query string that fails to deserialize, such as a repeated parameter.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to read query parameters".to_string(),
            error: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.message, self.error);
        } else {
            warn!("Rejected request: {}", self.message);
        }

        let body = ErrorBody {
            success: false,
            message: self.message,
            error: self.error,
        };
        (self.status, Json(body)).into_response()
    }
}
