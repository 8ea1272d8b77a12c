//! 意向与邀请 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use marketplace_core::models::{InterestInvite, InterestWithInvites};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    AcceptInviteRequest, ApiResponse, CreateInterestRequest, DeclineInviteRequest,
    RespondInviteRequest, SuggestTimeRequest,
};
use crate::error::Result;
use crate::state::AppState;

/// 发起意向并邀请好友
///
/// POST /app/interests
pub async fn create_interest(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateInterestRequest>,
) -> Result<Json<ApiResponse<InterestWithInvites>>> {
    req.validate()?;
    let interest = state
        .interests
        .create_interest(claims.user_id()?, req.into())
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        interest,
        "Interest created successfully",
    )))
}

/// 我发起的意向
///
/// GET /app/interests
pub async fn my_interests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<InterestWithInvites>>>> {
    let interests = state.interests.user_interests(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(interests)))
}

/// 我收到的邀请
///
/// GET /app/interests/invited
pub async fn invited_interests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<InterestWithInvites>>>> {
    let interests = state.interests.invited(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(interests)))
}

/// GET /app/interests/{id}
pub async fn interest_details(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(interest_id): Path<i64>,
) -> Result<Json<ApiResponse<InterestWithInvites>>> {
    let interest = state
        .interests
        .interest_details(claims.user_id()?, interest_id)
        .await?;
    Ok(Json(ApiResponse::success(interest)))
}

// ==================== 邀请答复 ====================

/// POST /app/interests/accept
pub async fn accept_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AcceptInviteRequest>,
) -> Result<Json<ApiResponse<InterestInvite>>> {
    let invite = state
        .interests
        .accept(claims.user_id()?, req.interest_id)
        .await?;
    Ok(Json(ApiResponse::success_with_message(invite, "Invite accepted")))
}

/// POST /app/interests/decline
pub async fn decline_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeclineInviteRequest>,
) -> Result<Json<ApiResponse<InterestInvite>>> {
    req.validate()?;
    let invite = state
        .interests
        .decline(claims.user_id()?, req.interest_id, req.reason)
        .await?;
    Ok(Json(ApiResponse::success_with_message(invite, "Invite declined")))
}

/// 对邀请提议新的时间
///
/// POST /app/interests/suggest
pub async fn suggest_new_time(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SuggestTimeRequest>,
) -> Result<Json<ApiResponse<InterestInvite>>> {
    req.validate()?;
    let invite = state
        .interests
        .suggest_new_time(
            claims.user_id()?,
            req.interest_id,
            req.slot_id,
            req.suggested_time,
            req.message,
        )
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        invite,
        "New time suggested",
    )))
}

/// PUT /app/interests/{id}/respond
pub async fn respond_invite(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(interest_id): Path<i64>,
    Json(req): Json<RespondInviteRequest>,
) -> Result<Json<ApiResponse<InterestInvite>>> {
    let invite = state
        .interests
        .respond(claims.user_id()?, interest_id, req.status)
        .await?;
    Ok(Json(ApiResponse::success(invite)))
}
