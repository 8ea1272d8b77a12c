//! 认证模块
//!
//! JWT 签发与校验、密码处理，以及基于 refresh token 的会话管理

mod jwt;
mod password;
mod service;

pub use jwt::{Claims, JwtManager, TokenPair, TokenType};
pub use password::{hash_password, token_digest, verify_password};
pub use service::{AuthService, Session};
