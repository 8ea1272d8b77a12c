//! 活动预订 API 处理器

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use marketplace_core::service::{BookingCancelled, BookingCreated, BookingListItem, CheckInResult};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, BookingStatusQuery, CancelBookingRequest, CreateBookingRequest};
use crate::error::Result;
use crate::state::AppState;

/// 预订活动
///
/// POST /producer/booking/createBooking/{eventId}
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<i64>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingCreated>>> {
    req.validate()?;
    let created = state
        .event_bookings
        .create_booking(claims.user_id()?, event_id, req.guest_count, req.internal_notes)
        .await?;
    Ok(Json(ApiResponse::success_with_message(created, "Booking confirmed")))
}

/// 预订列表，`status` 缺省为 all
///
/// GET /producer/booking/getUserBookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BookingStatusQuery>,
) -> Result<Json<ApiResponse<Vec<BookingListItem>>>> {
    let bookings = state
        .event_bookings
        .list_bookings(claims.user_id()?, query.status.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// GET /producer/booking/booking/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<BookingListItem>>> {
    let booking = state
        .event_bookings
        .get_booking(booking_id, claims.user_id()?)
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

/// PUT /producer/booking/cancelBooking/{id}
pub async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
    Json(req): Json<CancelBookingRequest>,
) -> Result<Json<ApiResponse<BookingCancelled>>> {
    req.validate()?;
    let cancelled = state
        .event_bookings
        .cancel_booking(booking_id, claims.user_id()?, &req.reason)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        cancelled,
        "Booking cancelled successfully",
    )))
}

/// 商家为活动预订签到
///
/// PUT /producer/booking/checkIn/{id}
pub async fn check_in(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<i64>,
) -> Result<Json<ApiResponse<CheckInResult>>> {
    let result = state
        .event_bookings
        .check_in(booking_id, claims.user_id()?)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}
