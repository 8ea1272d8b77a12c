//! 商家浏览 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use marketplace_core::service::{DaySlots, NearbyProducerPage};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, NearbyProducersQuery};
use crate::error::Result;
use crate::state::AppState;

/// 附近商家，按距离升序分页
///
/// GET /app/producers/nearby
pub async fn nearby_producers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<NearbyProducersQuery>,
) -> Result<Json<ApiResponse<NearbyProducerPage>>> {
    query.validate()?;
    let page = state
        .events
        .nearby_producers(claims.user_id()?, query.into())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// 商家每周可预约时段，按星期分组
///
/// GET /app/producers/{id}/slots，路径参数为商家账号的用户 ID
pub async fn producer_slots(
    State(state): State<AppState>,
    Path(producer_user_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<DaySlots>>>> {
    let slots = state.interests.producer_slots(producer_user_id).await?;
    Ok(Json(ApiResponse::success(slots)))
}
