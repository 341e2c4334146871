//! API Response wrapper

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            }),
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Error that still carries a payload the client needs to continue.
    pub fn error_with_data(code: &str, message: &str, data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::error(code, message)
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// `200 OK` with the success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    ApiResponse::success(data).with_status(StatusCode::OK)
}

/// `201 Created` with the success envelope.
pub fn created<T: Serialize>(data: T) -> Response {
    ApiResponse::success(data).with_status(StatusCode::CREATED)
}
