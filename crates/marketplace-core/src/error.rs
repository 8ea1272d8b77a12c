//! 领域服务错误类型
//!
//! 业务规则违例携带面向客户端的原始提示文案，由 API 层映射为 HTTP 状态码

use thiserror::Error;

/// 领域服务错误类型
#[derive(Debug, Error)]
pub enum CoreError {
    // === 业务错误 ===
    /// 请求在当前状态下不合法（400）
    #[error("{0}")]
    BadRequest(String),

    /// 资源不存在或调用方不可见（404）
    #[error("{0}")]
    NotFound(String),

    /// 调用方不拥有该资源（401，沿用既有 API 契约）
    #[error("{0}")]
    Unauthorized(String),

    /// 调用方身份有效但无权执行（403）
    #[error("{0}")]
    Forbidden(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
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

    /// 是否为系统级错误（需要记录日志并隐藏细节）
    pub fn is_system(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_messages_are_verbatim() {
        // 业务错误的 Display 直接作为响应 message，不能加前缀
        assert_eq!(
            CoreError::bad_request("Booking exceeds event capacity").to_string(),
            "Booking exceeds event capacity"
        );
        assert_eq!(
            CoreError::not_found("Event not found").to_string(),
            "Event not found"
        );
        assert_eq!(
            CoreError::unauthorized("You do not own this booking").to_string(),
            "You do not own this booking"
        );
    }

    #[test]
    fn test_is_system() {
        assert!(CoreError::Database(sqlx::Error::RowNotFound).is_system());
        assert!(CoreError::Internal("x".into()).is_system());
        assert!(!CoreError::bad_request("x").is_system());
        assert!(!CoreError::validation("x").is_system());
    }
}
