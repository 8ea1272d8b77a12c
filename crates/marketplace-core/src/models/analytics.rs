//! 看板与洞察的聚合查询结果

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==================== 看板概览 ====================

/// 概览计数
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct OverviewCounts {
    pub profile_views: i64,
    pub interests: i64,
    /// 公开且未删除的帖子数
    pub choices_made: i64,
    /// 未删除的帖子数
    pub posts: i64,
    /// 点赞、评论、分享之和
    pub engagements: i64,
}

/// 附近用户
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct NearbyUser {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// 按日计数
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

/// 活动意向按票价的分布
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct PriceSplit {
    pub free: i64,
    pub discount: i64,
    pub full: i64,
}

/// 活动类型的意向数
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EventTypeCount {
    pub event_type: String,
    pub interest_count: i64,
}

// ==================== 评分 ====================

/// 餐厅评分各项均值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRating {
    pub service: f64,
    pub place: f64,
    pub portions: f64,
    pub ambiance: f64,
    pub overall: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 养生类评分各项均值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WellnessRating {
    pub care_quality: f64,
    pub cleanliness: f64,
    pub welcome: f64,
    pub value_for_money: f64,
    pub atmosphere: f64,
    pub staff_experience: f64,
    pub overall: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 休闲类评分各项均值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeisureRating {
    pub stage_direction: f64,
    pub actor_performance: f64,
    pub text_quality: f64,
    pub scenography: f64,
    pub overall: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 按商家类型区分的评分
#[derive(Debug, Clone, PartialEq)]
pub enum ProducerRating {
    Restaurant(RestaurantRating),
    Wellness(WellnessRating),
    Leisure(LeisureRating),
}

// ==================== 菜单 ====================

/// 分类维度的菜品评分
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CategoryRating {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// 单品维度的菜品评分
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DishRating {
    pub dish_id: i64,
    pub dish_name: Option<String>,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// 菜单分类
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub dish_count: Option<i64>,
}

/// 菜单评分覆盖情况
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct MenuCoverage {
    pub total_dishes: i64,
    pub rated_dishes: i64,
}

/// 被选择最多的菜品
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChosenDish {
    pub name: Option<String>,
    pub chosen_count: i64,
}

/// 按日平均评分
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DailyRating {
    pub day: NaiveDate,
    pub average_rating: f64,
    pub total_ratings: i64,
}

// ==================== 洞察 ====================

/// 互动度最高的内容（帖子、菜品或活动）
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EngagedItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub id: i64,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub avg_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub total_ratings: Option<i64>,
    pub engagement_score: f64,
}

/// 即将到来的预订（订座与活动预订合并）
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingBooking {
    pub id: i64,
    pub user_name: String,
    pub start_date: DateTime<Utc>,
    pub status: String,
}

/// 由好友邀请带来的预订
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReferralBooking {
    pub booking_id: i64,
    pub customer_name: Option<String>,
    pub referrer_id: i64,
    pub booked_at: DateTime<Utc>,
}

/// 给出指定评分的顾客
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRating {
    pub rating_id: i64,
    pub rating: i32,
    pub user_id: Option<i64>,
    pub user_name: String,
    pub comment: Option<String>,
    pub date: DateTime<Utc>,
}
