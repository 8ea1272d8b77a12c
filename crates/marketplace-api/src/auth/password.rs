//! 密码与 refresh token 摘要

use base64::{Engine, engine::general_purpose::STANDARD};
use bcrypt::{DEFAULT_COST, hash, verify};
use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// bcrypt 哈希密码
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    hash(password, DEFAULT_COST).map_err(|e| ApiError::Internal(format!("密码哈希失败: {}", e)))
}

/// 比较明文密码与存储的哈希值
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    verify(password, hash).map_err(|e| ApiError::Internal(format!("密码验证失败: {}", e)))
}

/// refresh token 只以 SHA-256 摘要落库
pub fn token_digest(token: &str) -> String {
    STANDARD.encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("correct horse").unwrap();

        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("battery staple", &hashed).unwrap());
    }

    #[test]
    fn test_token_digest_is_stable() {
        assert_eq!(token_digest("abc"), token_digest("abc"));
        assert_ne!(token_digest("abc"), token_digest("abd"));
        // SHA-256 经 base64 编码后固定 44 个字符
        assert_eq!(token_digest("abc").len(), 44);
    }
}
