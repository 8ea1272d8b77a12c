//! JWT 认证中间件
//!
//! 校验 Bearer access token 并把 Claims 注入请求扩展

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;

use crate::state::AppState;

/// 无需认证的路由
const PUBLIC_PATHS: [&str; 5] = [
    "/v1/auth/login",
    "/v1/auth/refresh",
    "/admin/auth/login",
    "/health",
    "/ready",
];

/// 认证中间件
///
/// 公开路由直接放行；其余路由要求有效的 access token，停用账号返回 403
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if PUBLIC_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let Some(bearer) = request.headers().typed_get::<Authorization<Bearer>>() else {
        return error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "token is missing in header");
    };

    match state.jwt.verify_access(bearer.token()) {
        Ok(claims) if !claims.status => {
            error_response(StatusCode::FORBIDDEN, "FORBIDDEN", "Your account has been deactivated")
        }
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", &e.to_string()),
    }
}

pub(super) fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({
        "success": false,
        "code": code,
        "message": message,
        "data": null
    });

    (status, axum::Json(body)).into_response()
}
