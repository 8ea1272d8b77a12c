//! 认证相关的 HTTP 处理器
//!
//! 登录、管理员登录、刷新 Token、登出与当前用户

use axum::{Extension, Json, extract::State};
use marketplace_core::models::User;
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, LoginRequest, MessageResponse, RefreshTokenRequest, SessionResponse};
use crate::error::Result;
use crate::state::AppState;

/// 用户登录
///
/// POST /v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    req.validate()?;
    let session = state.auth.login(&req.email, &req.password, false).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

/// 管理员登录
///
/// POST /admin/auth/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    req.validate()?;
    let session = state.auth.login(&req.email, &req.password, true).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

/// 刷新 Token
///
/// POST /v1/auth/refresh
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>> {
    req.validate()?;
    let session = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(session.into())))
}

/// 登出：吊销请求体中的 refresh token
///
/// POST /v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>> {
    req.validate()?;
    state.auth.logout(claims.user_id()?, &req.refresh_token).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Logged out successfully",
    })))
}

/// 当前用户
///
/// GET /v1/auth/me
pub async fn get_current_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.auth.current_user(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(user)))
}
