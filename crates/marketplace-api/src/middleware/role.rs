//! 角色守卫
//!
//! 挂在需要特定角色的路由组上，依赖 `auth_middleware` 先注入 Claims

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use marketplace_core::models::{ADMIN_ROLE_ID, is_producer_role};

use super::auth::error_response;
use crate::auth::Claims;

/// 仅允许商家角色（restaurant / producer / leisure / wellness）
pub async fn require_producer(request: Request<Body>, next: Next) -> Response {
    guard(request, next, |claims| is_producer_role(&claims.role), "User is not a producer").await
}

/// 仅允许管理员
pub async fn require_admin(request: Request<Body>, next: Next) -> Response {
    guard(request, next, |claims| claims.role_id == ADMIN_ROLE_ID, "User is not an admin").await
}

async fn guard(
    request: Request<Body>,
    next: Next,
    allowed: impl Fn(&Claims) -> bool,
    message: &str,
) -> Response {
    let Some(claims) = request.extensions().get::<Claims>() else {
        return error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token is missing in header");
    };

    if allowed(claims) {
        next.run(request).await
    } else {
        error_response(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }
}
