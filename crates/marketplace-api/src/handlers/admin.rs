//! 管理员运维 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use marketplace_core::service::TableBookingEnvelope;
use tracing::{info, instrument};

use crate::dto::{ApiResponse, UpdateTempRequest};
use crate::error::Result;
use crate::state::AppState;
use crate::worker::SweepReport;

/// 直接改写订座的时间与状态，供联调与数据修复使用
///
/// PUT /admin/bookings/{id}/temp
#[instrument(skip(state, req))]
pub async fn update_temp(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
    Json(req): Json<UpdateTempRequest>,
) -> Result<Json<ApiResponse<TableBookingEnvelope>>> {
    let updated = state
        .table_bookings
        .update_temp(booking_id, req.start_date_time, req.end_date_time, req.status)
        .await?;
    info!(booking_id, status = %req.status.as_str(), "管理员改写订座");
    Ok(Json(ApiResponse::success(updated)))
}

/// 立即执行一轮预订状态清理
///
/// POST /admin/bookings/sweep
#[instrument(skip(state))]
pub async fn sweep_bookings(State(state): State<AppState>) -> Result<Json<ApiResponse<SweepReport>>> {
    let report = state.status_worker.run_once(Utc::now()).await?;
    Ok(Json(ApiResponse::success(report)))
}
