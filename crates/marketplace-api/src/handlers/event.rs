//! 活动 API 处理器
//!
//! App 端浏览活动，商家端发布与维护自己的活动

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use marketplace_core::models::{Event, EventDetail, EventType};
use marketplace_core::service::{EventDeleted, ProducerEvents};
use marketplace_core::slots::{GeneratedSlot, generate_slots};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{
    ApiResponse, CreateEventRequest, EventListQuery, SlotPreviewQuery, StatusQuery,
    UpdateEventRequest,
};
use crate::error::Result;
use crate::state::AppState;

// ==================== App 端 ====================

/// 活动列表
///
/// GET /app/events
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>> {
    let events = state.events.list_events(&query.into()).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// GET /app/events/types
pub async fn event_types(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<EventType>>>> {
    let types = state.events.event_types().await?;
    Ok(Json(ApiResponse::success(types)))
}

/// 活动详情（含已预订人数）
///
/// GET /app/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<EventDetail>>> {
    let detail = state.events.get_event(claims.user_id()?, event_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// 某商家的活动
///
/// GET /app/producers/{id}/events
pub async fn events_by_producer(
    State(state): State<AppState>,
    Path(producer_id): Path<i64>,
) -> Result<Json<ApiResponse<ProducerEvents>>> {
    let events = state.events.events_by_producer(producer_id).await?;
    Ok(Json(ApiResponse::success(events)))
}

// ==================== 商家端 ====================

/// 发布活动
///
/// POST /producer/events
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<Event>>> {
    let draft = req.into_draft()?;
    let event = state.events.create_event(claims.user_id()?, draft).await?;
    Ok(Json(ApiResponse::success_with_message(event, "Event created successfully")))
}

/// 我的活动
///
/// GET /producer/events
pub async fn my_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ApiResponse<Vec<Event>>>> {
    let events = state.events.my_events(claims.user_id()?, query.status).await?;
    Ok(Json(ApiResponse::success(events)))
}

/// GET /producer/events/{id}
pub async fn get_my_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<EventDetail>>> {
    let detail = state.events.get_event(claims.user_id()?, event_id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// 部分更新活动
///
/// PUT /producer/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<Event>>> {
    let patch = req.into_patch()?;
    let event = state
        .events
        .update_event(claims.user_id()?, event_id, patch)
        .await?;
    Ok(Json(ApiResponse::success_with_message(event, "Event updated successfully")))
}

/// DELETE /producer/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<EventDeleted>>> {
    let deleted = state.events.delete_event(claims.user_id()?, event_id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}

/// 预览营业时段切分结果
///
/// GET /producer/slots/preview
pub async fn preview_slots(
    Query(query): Query<SlotPreviewQuery>,
) -> Result<Json<ApiResponse<Vec<GeneratedSlot>>>> {
    query.validate()?;
    let slots = generate_slots(&query.start, &query.end, query.hour_limit);
    Ok(Json(ApiResponse::success(slots)))
}
