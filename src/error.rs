//! Error types for the REST API.

use crate::strategy::StrategyError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[cfg(test)]
mod tests;

/// API error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code.
    pub code: String,
}

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Strategy not found.
    #[error("Strategy not found: {0}")]
    StrategyNotFound(Uuid),

    /// Leg not found.
    #[error("Leg not found: {0}")]
    LegNotFound(Uuid),

    /// Template not found.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// A leg or strategy field is structurally invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation needs market data that was not supplied.
    #[error("Missing market data: {0}")]
    MissingMarketData(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for the error.
    #[must_use]
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::StrategyNotFound(_) => (StatusCode::NOT_FOUND, "STRATEGY_NOT_FOUND"),
            ApiError::LegNotFound(_) => (StatusCode::NOT_FOUND, "LEG_NOT_FOUND"),
            ApiError::TemplateNotFound(_) => (StatusCode::NOT_FOUND, "TEMPLATE_NOT_FOUND"),
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            ApiError::MissingMarketData(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_MARKET_DATA")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<StrategyError> for ApiError {
    fn from(err: StrategyError) -> Self {
        match err {
            StrategyError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            StrategyError::MissingMarketData(msg) => ApiError::MissingMarketData(msg),
            StrategyError::LegNotFound(id) => ApiError::LegNotFound(id),
            StrategyError::UnknownTemplate(name) => ApiError::TemplateNotFound(name),
        }
    }
}
