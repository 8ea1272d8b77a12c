//! 商家洞察 API 处理器

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use marketplace_core::models::{CustomerRating, EngagedItem, ReferralBooking, UpcomingBooking};
use marketplace_core::service::{MonthlyRating, RatingBreakdown};

use crate::auth::Claims;
use crate::dto::{ApiResponse, RatingQuery, UpcomingBookingsQuery};
use crate::error::Result;
use crate::state::AppState;

/// GET /producer/insights/most-engaged
pub async fn most_engaged(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<EngagedItem>>>> {
    let items = state.insights.most_engaged_items(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// 即将到来的订座与活动预订，`from` 缺省为当前时间
///
/// GET /producer/insights/upcoming-bookings
pub async fn upcoming_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<UpcomingBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<UpcomingBooking>>>> {
    let bookings = state
        .insights
        .upcoming_bookings(claims.user_id()?, query.from)
        .await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// GET /producer/insights/referrals
pub async fn referrals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Vec<ReferralBooking>>>> {
    let bookings = state
        .insights
        .friend_referral_bookings(claims.user_id()?)
        .await?;
    Ok(Json(ApiResponse::success(bookings)))
}

/// GET /producer/insights/monthly-rating
pub async fn monthly_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<MonthlyRating>>> {
    let rating = state
        .insights
        .monthly_average_rating(claims.user_id()?)
        .await?;
    Ok(Json(ApiResponse::success(rating)))
}

/// GET /producer/insights/customers-by-rating?rating=1..5
pub async fn customers_by_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<RatingQuery>,
) -> Result<Json<ApiResponse<Vec<CustomerRating>>>> {
    let customers = state
        .insights
        .customers_by_rating(claims.user_id()?, query.rating)
        .await?;
    Ok(Json(ApiResponse::success(customers)))
}

/// 各项评分明细，尚无评分时 data 为 null
///
/// GET /producer/insights/rating-breakdown
pub async fn rating_breakdown(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Option<RatingBreakdown>>>> {
    let breakdown = state.insights.rating_breakdown(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(breakdown)))
}
