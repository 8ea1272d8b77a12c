//! 中间件模块
//!
//! 提供认证与角色守卫

mod auth;
mod role;

pub use auth::auth_middleware;
pub use role::{require_admin, require_producer};
