//! 餐厅订座 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use marketplace_core::service::{TableBookingDetail, TableBookingEnvelope, TableBookingPage};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, CancelTableBookingRequest, TableBookingsQuery, TimeZoneQuery};
use crate::error::Result;
use crate::state::AppState;

/// 未指定分栏时展示待到店的订座
const DEFAULT_TAB: &str = "scheduled";

/// 按分栏分页列出本餐厅订座
///
/// GET /producer/booking/getBookings?booking=scheduled|inProgress|completed|cancelled
pub async fn list_table_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TableBookingsQuery>,
) -> Result<Json<ApiResponse<TableBookingPage>>> {
    query.validate()?;
    let tab = query.booking.as_deref().unwrap_or(DEFAULT_TAB);
    let page = state
        .table_bookings
        .list(claims.user_id()?, tab, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /producer/booking/getBooking/{id}
pub async fn get_table_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
    Query(query): Query<TimeZoneQuery>,
) -> Result<Json<ApiResponse<TableBookingDetail>>> {
    let detail = state
        .table_bookings
        .get(claims.user_id()?, booking_id, query.time_zone.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// PUT /producer/booking/cancel/{id}
pub async fn cancel_table_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
    Json(req): Json<CancelTableBookingRequest>,
) -> Result<Json<ApiResponse<TableBookingEnvelope>>> {
    req.validate()?;
    let cancelled = state
        .table_bookings
        .cancel(claims.user_id()?, booking_id, &req.cancel_reason)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        cancelled,
        "Booking cancelled successfully",
    )))
}

/// 顾客到店签到，需要传入餐厅所在时区
///
/// PUT /producer/booking/tableCheckIn/{id}
pub async fn table_check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
    Query(query): Query<TimeZoneQuery>,
) -> Result<Json<ApiResponse<TableBookingEnvelope>>> {
    let checked_in = state
        .table_bookings
        .check_in(claims.user_id()?, booking_id, query.time_zone.as_deref())
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        checked_in,
        "Booking checked in successfully",
    )))
}
