//! 核心错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 核心错误类型
///
/// 错误分类对应抓取管线的各个阶段：浏览器/网络不可达（Connection）、
/// 页面加载成功但无可提取数据（Content）、价格非法（InvalidPrice）、
/// 资源不存在（NotFound）。没有任何自动重试，错误直接上抛给调用方。
#[derive(Debug)]
pub enum CoreError {
    BadRequest(String),
    NotFound(String),
    Connection(String),
    Content(String),
    InvalidPrice(String),
    Database(String),
    Internal(String),
}

/// 错误响应结构
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub timestamp: String,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            CoreError::NotFound(msg) => write!(f, "not found: {}", msg),
            CoreError::Connection(msg) => write!(f, "connection error: {}", msg),
            CoreError::Content(msg) => write!(f, "content error: {}", msg),
            CoreError::InvalidPrice(msg) => write!(f, "invalid price: {}", msg),
            CoreError::Database(msg) => write!(f, "database error: {}", msg),
            CoreError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for CoreError {}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, error_code, user_message) = match self {
            CoreError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            CoreError::Connection(msg) => (StatusCode::BAD_GATEWAY, "CONNECTION_ERROR", msg),
            CoreError::Content(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "CONTENT_ERROR", msg),
            CoreError::InvalidPrice(msg) => (StatusCode::BAD_REQUEST, "INVALID_PRICE", msg),
            CoreError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let error_response = ErrorResponse {
            error: error_code.to_string(),
            message: user_message,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, axum::Json(error_response)).into_response()
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => CoreError::NotFound("row not found".to_string()),
            other => CoreError::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(_, errors)| {
                errors.iter().map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| "Validation error".to_string())
                })
            })
            .collect();

        CoreError::BadRequest(messages.join(", "))
    }
}
