//! 响应 DTO 定义

use marketplace_core::models::User;
use serde::Serialize;

use crate::auth::Session;

/// API 统一响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, "操作成功")
    }

    /// 创建成功响应（自定义消息）
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

/// 登录与刷新的响应
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user: session.user,
            token: session.tokens.access_token,
            refresh_token: session.tokens.refresh_token,
            expires_at: session.tokens.expires_at,
        }
    }
}

/// 只带提示文案的响应
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(MessageResponse {
            message: "Logged out successfully",
        }))
        .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["code"], "SUCCESS");
        assert_eq!(body["data"]["message"], "Logged out successfully");
    }

    #[test]
    fn test_custom_message() {
        let body = serde_json::to_value(ApiResponse::success_with_message(3, "Booking confirmed")).unwrap();
        assert_eq!(body["message"], "Booking confirmed");
        assert_eq!(body["data"], 3);
    }
}
