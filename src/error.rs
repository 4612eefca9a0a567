use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid Solana wallet address")]
    InvalidAddress,

    #[error("Blockchain RPC error: {0}")]
    BlockchainRpc(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Upstream failures surface as a generic message; the detail stays
        // in the service logs.
        let (status, code, message) = match self {
            AppError::InvalidAddress => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS",
                "Invalid Solana wallet address".to_string(),
            ),
            AppError::BlockchainRpc(_) => (
                StatusCode::BAD_GATEWAY,
                "RPC_ERROR",
                "Upstream RPC request failed".to_string(),
            ),
            AppError::ExternalApi(_) => (
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_API_ERROR",
                "External service request failed".to_string(),
            ),
            AppError::NotFound(ref msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::BadRequest(ref msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
