//! HTTP 层错误类型
//!
//! 领域错误在这里映射为状态码与统一的错误响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use marketplace_core::CoreError;
use serde_json::json;

/// 系统错误对外返回的通用提示
const GENERIC_SYSTEM_MESSAGE: &str = "服务内部错误，请稍后重试";

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 业务错误：Display 即响应 message
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("参数校验失败: {0}")]
    Validation(String),

    // 系统错误
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统错误只记录日志，响应中不带细节
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                GENERIC_SYSTEM_MESSAGE.to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                GENERIC_SYSTEM_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::BadRequest(msg) => Self::BadRequest(msg),
            CoreError::NotFound(msg) => Self::NotFound(msg),
            CoreError::Unauthorized(msg) => Self::Unauthorized(msg),
            CoreError::Forbidden(msg) => Self::Forbidden(msg),
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Database(e) => Self::Database(e),
            CoreError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 序列化错误转换
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON 处理错误: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn all_error_variants() -> Vec<(ApiError, StatusCode, &'static str)> {
        vec![
            (ApiError::bad_request("Booking exceeds event capacity"), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ApiError::NotFound("Event not found".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ApiError::unauthorized("Invalid token"), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ApiError::forbidden("User is not an admin"), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ApiError::validation("guestCount must be at least 1"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (ApiError::Database(sqlx::Error::RowNotFound), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            (ApiError::Internal("unexpected state".into()), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        ]
    }

    #[test]
    fn test_all_variants_status_code() {
        for (error, expected_status, code) in all_error_variants() {
            assert_eq!(error.status_code(), expected_status, "状态码不匹配: {code}");
        }
    }

    #[test]
    fn test_all_variants_error_code() {
        for (error, _status, expected_code) in all_error_variants() {
            assert_eq!(error.error_code(), expected_code);
        }
    }

    #[test]
    fn test_core_errors_keep_their_category() {
        let cases: Vec<(CoreError, StatusCode)> = vec![
            (CoreError::bad_request("x"), StatusCode::BAD_REQUEST),
            (CoreError::not_found("x"), StatusCode::NOT_FOUND),
            (CoreError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (CoreError::forbidden("x"), StatusCode::FORBIDDEN),
            (CoreError::validation("x"), StatusCode::BAD_REQUEST),
            (CoreError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (core, expected) in cases {
            assert_eq!(ApiError::from(core).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_business_message_is_returned_verbatim() {
        let error: ApiError = CoreError::bad_request("You cannot cancel — this event has already ended").into();
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("读取响应体失败");
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");

        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!("BAD_REQUEST"));
        assert_eq!(body["message"], json!("You cannot cancel — this event has already ended"));
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_system_errors_hide_internal_details() {
        let system_errors = vec![
            (ApiError::Internal("pool exhausted at 10.0.0.3".into()), "10.0.0.3"),
            (ApiError::Database(sqlx::Error::PoolTimedOut), "pool timed out"),
        ];

        for (error, secret) in system_errors {
            let response = error.into_response();
            let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("读取响应体失败");
            let body: serde_json::Value = serde_json::from_slice(&body_bytes).expect("响应体不是合法 JSON");
            let message = body["message"].as_str().unwrap_or_default();

            assert_eq!(message, GENERIC_SYSTEM_MESSAGE);
            assert!(!message.contains(secret));
        }
    }
}
