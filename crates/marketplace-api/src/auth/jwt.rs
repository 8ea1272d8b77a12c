//! JWT Token 处理
//!
//! access token 与 refresh token 使用各自的密钥签发和校验

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use marketplace_core::models::User;
use marketplace_shared::config::AuthConfig;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Token 用途
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT Claims（Token 载荷）
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// 用户 ID
    pub sub: String,
    /// 角色名
    pub role: String,
    pub role_id: i64,
    /// 账号是否启用
    pub status: bool,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, ApiError> {
        self.sub
            .parse()
            .map_err(|_| ApiError::unauthorized("Invalid token"))
    }
}

/// 一次登录或刷新签发的 Token 对
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// access token 过期时间戳
    pub expires_at: i64,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in_secs: i64,
}

impl KeyPair {
    fn new(secret: &str, expires_in_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in_secs,
        }
    }
}

/// JWT 管理器
pub struct JwtManager {
    access: KeyPair,
    refresh: KeyPair,
    issuer: String,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: KeyPair::new(&config.access_secret, config.access_expires_secs),
            refresh: KeyPair::new(&config.refresh_secret, config.refresh_expires_secs),
            issuer: config.issuer.clone(),
        }
    }

    fn keys(&self, token_type: TokenType) -> &KeyPair {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    /// 为用户签发指定用途的 Token，返回 (token, 过期时间戳)
    pub fn issue(&self, user: &User, token_type: TokenType) -> Result<(String, i64), ApiError> {
        let keys = self.keys(token_type);
        let now = Utc::now();
        let exp = now + Duration::seconds(keys.expires_in_secs);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role_name.clone(),
            role_id: user.role_id,
            status: user.is_active,
            token_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| ApiError::Internal(format!("JWT 生成失败: {}", e)))?;

        Ok((token, exp.timestamp()))
    }

    /// 同时签发 access 与 refresh token
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, ApiError> {
        let (access_token, expires_at) = self.issue(user, TokenType::Access)?;
        let (refresh_token, _) = self.issue(user, TokenType::Refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_at,
        })
    }

    fn decode_claims(&self, token: &str, token_type: TokenType) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &self.keys(token_type).decoding, &validation).ok()?;
        (data.claims.token_type == token_type).then_some(data.claims)
    }

    /// 校验 access token，refresh token 不能当作 access token 使用
    pub fn verify_access(&self, token: &str) -> Result<Claims, ApiError> {
        self.decode_claims(token, TokenType::Access)
            .ok_or_else(|| ApiError::unauthorized("Invalid token"))
    }

    /// 校验 refresh token
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, ApiError> {
        if token.trim().is_empty() {
            return Err(ApiError::bad_request("Token is missing"));
        }
        self.decode_claims(token, TokenType::Refresh)
            .ok_or_else(|| ApiError::bad_request("Invalid refresh token"))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use marketplace_shared::test_utils::TestDataGenerator;

    pub(crate) fn sample_user(id: i64, role_id: i64, role: &str) -> User {
        User {
            id,
            email: TestDataGenerator::email(),
            full_name: Some(TestDataGenerator::full_name()),
            password_hash: None,
            role_id,
            role_name: role.to_string(),
            is_active: true,
            is_deleted: false,
            latitude: None,
            longitude: None,
            profile_image_url: None,
            created_at: Utc::now(),
        }
    }

    fn manager() -> JwtManager {
        JwtManager::new(&AuthConfig::default())
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let manager = manager();
        let user = sample_user(42, 3, "restaurant");

        let (token, exp) = manager.issue(&user, TokenType::Access).unwrap();
        let claims = manager.verify_access(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, "restaurant");
        assert_eq!(claims.role_id, 3);
        assert!(claims.status);
        assert_eq!(claims.exp, exp);
        assert_eq!(claims.iss, "marketplace-api");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let manager = manager();
        let pair = manager.issue_pair(&sample_user(7, 2, "user")).unwrap();

        assert!(manager.verify_access(&pair.refresh_token).is_err());
        assert!(manager.verify_refresh(&pair.access_token).is_err());
        assert_eq!(manager.verify_refresh(&pair.refresh_token).unwrap().sub, "7");
    }

    #[test]
    fn test_token_from_other_issuer_is_rejected() {
        let other = JwtManager::new(&AuthConfig {
            issuer: "someone-else".to_string(),
            ..AuthConfig::default()
        });
        let (token, _) = other
            .issue(&sample_user(1, 2, "user"), TokenType::Access)
            .unwrap();

        assert!(manager().verify_access(&token).is_err());
    }

    #[test]
    fn test_invalid_refresh_token_messages() {
        let manager = manager();
        assert_eq!(
            manager.verify_refresh("  ").unwrap_err().to_string(),
            "Token is missing"
        );
        assert_eq!(
            manager.verify_refresh("invalid.token.here").unwrap_err().to_string(),
            "Invalid refresh token"
        );
    }
}
