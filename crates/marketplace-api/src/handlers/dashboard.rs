//! 商家看板 API 处理器
//!
//! 所有接口都以当前登录商家为维度

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use marketplace_core::service::{
    CategoryPage, DishDropAlerts, DishRatings, EventInsights, MenuOverview, Overview, Ratings,
    Trends, UserInsights,
};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::{ApiResponse, CategoriesQuery, DishDropQuery, DishRatingsQuery, TrendsQuery};
use crate::error::Result;
use crate::state::AppState;

/// GET /producer/dashboard/overview
pub async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Overview>>> {
    let overview = state.dashboard.overview(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// 附近用户分布
///
/// GET /producer/dashboard/user-insights
pub async fn user_insights(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<UserInsights>>> {
    let insights = state.dashboard.user_insights(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(insights)))
}

/// 按日趋势，`metric` 缺省为 interests
///
/// GET /producer/dashboard/trends
pub async fn trends(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<ApiResponse<Trends>>> {
    let trends = state
        .dashboard
        .trends(claims.user_id()?, query.metric, query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::success(trends)))
}

/// GET /producer/dashboard/ratings
pub async fn ratings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<Ratings>>> {
    let ratings = state.dashboard.ratings(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(ratings)))
}

/// GET /producer/dashboard/event-insights
pub async fn event_insights(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<EventInsights>>> {
    let insights = state.dashboard.event_insights(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(insights)))
}

// ==================== 菜单 ====================

/// GET /producer/dashboard/dish-ratings
pub async fn dish_ratings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DishRatingsQuery>,
) -> Result<Json<ApiResponse<DishRatings>>> {
    let ratings = state
        .dashboard
        .dish_ratings(claims.user_id()?, query.group_by, query.category_id)
        .await?;
    Ok(Json(ApiResponse::success(ratings)))
}

/// GET /producer/dashboard/get-categories
pub async fn categories(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CategoriesQuery>,
) -> Result<Json<ApiResponse<CategoryPage>>> {
    query.validate()?;
    let page = state
        .dashboard
        .categories(claims.user_id()?, query.into())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /producer/dashboard/menu-overview
pub async fn menu_overview(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<MenuOverview>>> {
    let overview = state.dashboard.menu_overview(claims.user_id()?).await?;
    Ok(Json(ApiResponse::success(overview)))
}

/// GET /producer/dashboard/dish-drop-alerts
pub async fn dish_drop_alerts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DishDropQuery>,
) -> Result<Json<ApiResponse<DishDropAlerts>>> {
    let alerts = state
        .dashboard
        .dish_drop_alerts(claims.user_id()?, query.days)
        .await?;
    Ok(Json(ApiResponse::success(alerts)))
}
