//! 服务层数据传输对象
//!
//! 服务的入参与返回结构，JSON 字段统一使用 camelCase

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    BookingStatus, Event, EventBookingView, EventStatus, InterestType, ProducerType, Slot,
    TableBooking, TrendMetric,
};

// ==================== 活动预订 ====================

/// 创建预订的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub message: &'static str,
    pub booking_id: i64,
    pub total_amount: Decimal,
    pub status: BookingStatus,
}

/// 预订所属活动摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedEvent {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub time_zone: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// 带操作标记的预订
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub id: i64,
    pub user_id: i64,
    pub number_of_persons: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub can_check_in: bool,
    pub can_cancel: bool,
    pub event: BookedEvent,
}

/// 预订所属商家摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingProducer {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub producer_type: ProducerType,
}

/// 预订列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListItem {
    pub booking: BookingSummary,
    pub producer: BookingProducer,
}

impl BookingListItem {
    /// 按当前时间计算操作标记
    pub fn from_view(view: EventBookingView, now: DateTime<Utc>) -> Self {
        let window = view.window();
        let can_check_in = view.status == BookingStatus::Scheduled && window.contains(now);
        let can_cancel = matches!(
            view.status,
            BookingStatus::Scheduled | BookingStatus::InProgress
        );

        Self {
            booking: BookingSummary {
                id: view.id,
                user_id: view.user_id,
                number_of_persons: view.number_of_persons,
                total_price: view.total_price,
                status: view.status,
                internal_notes: view.internal_notes,
                created_at: view.created_at,
                can_check_in,
                can_cancel,
                event: BookedEvent {
                    id: view.event_id,
                    title: view.event_title,
                    date: view.event_date,
                    start_time: view.event_start_time,
                    end_time: view.event_end_time,
                    time_zone: view.event_time_zone,
                    location: view.event_location,
                    starts_at: window.start,
                    ends_at: window.end,
                },
            },
            producer: BookingProducer {
                id: view.producer_id,
                user_id: view.producer_user_id,
                name: view.producer_name,
                producer_type: view.producer_type,
            },
        }
    }
}

/// 取消预订的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCancelled {
    pub booking_id: i64,
    pub reason: String,
    pub status: BookingStatus,
}

/// 签到时回显的活动排期
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSchedule {
    pub title: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub time_zone: String,
}

/// 签到结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub message: &'static str,
    pub booking_id: i64,
    pub status: BookingStatus,
    pub event: EventSchedule,
}

// ==================== 餐厅订座 ====================

/// 订座列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBookingItem {
    #[serde(flatten)]
    pub booking: TableBooking,
    pub can_cancel: bool,
    pub can_check_in: bool,
}

/// 订座分页结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBookingPage {
    pub bookings: Vec<TableBookingItem>,
    pub total: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// 单个订座的状态明细
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableBookingState {
    #[serde(flatten)]
    pub booking: TableBooking,
    pub scheduled: bool,
    pub in_progress: bool,
    pub completed: bool,
    pub cancelled: bool,
    pub can_cancel: bool,
    pub can_check_in: bool,
    /// 开始时间（调用方时区的本地时间）
    pub start: NaiveDateTime,
    pub current_time: NaiveDateTime,
}

/// 订座详情，找不到时 `booking` 为 null
#[derive(Debug, Clone, Serialize)]
pub struct TableBookingDetail {
    pub booking: Option<TableBookingState>,
}

/// 订座写操作的返回
#[derive(Debug, Clone, Serialize)]
pub struct TableBookingEnvelope {
    pub booking: TableBooking,
}

// ==================== 活动 ====================

/// 新建活动的输入（格式已在 HTTP 层校验）
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub event_type_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub experience_type: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub time_zone: Option<String>,
    pub price_per_guest: Decimal,
    pub max_capacity: i32,
    pub images: Vec<String>,
    pub status: EventStatus,
}

/// 某商家的活动列表
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerEvents {
    pub producer_id: i64,
    #[serde(rename = "type")]
    pub producer_type: ProducerType,
    pub total_events: usize,
    pub events: Vec<Event>,
}

/// 删除活动的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDeleted {
    pub success: bool,
    pub event_id: i64,
}

/// 附近商家分页结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyProducerPage {
    pub producers: Vec<crate::models::NearbyProducer>,
    pub total_producers: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// 附近商家查询参数
#[derive(Debug, Clone, Default)]
pub struct NearbySearch {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub radius_m: Option<f64>,
    pub producer_type: Option<ProducerType>,
}

// ==================== 意向 ====================

/// 新建意向的输入
#[derive(Debug, Clone)]
pub struct InterestDraft {
    pub interest_type: InterestType,
    pub producer_id: Option<i64>,
    pub event_id: Option<i64>,
    pub slot_id: Option<i64>,
    pub suggested_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub invited_user_ids: Vec<i64>,
}

/// 按星期分组的营业时段
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    pub day: String,
    pub slots: Vec<Slot>,
}

// ==================== 看板 ====================

/// 看板概览
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub profile_views: i64,
    pub number_of_interests: i64,
    pub choices_made: i64,
    pub conversion_rate: String,
    pub post_conversion_rate: String,
}

/// 用户分布地图摘要
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSummary {
    pub producer_name: String,
    pub city: String,
    pub country: String,
    pub nearby_user_percentage: String,
    pub total_nearby_users: usize,
    pub total_local_users: i64,
    pub radius_km: u32,
}

/// 附近用户
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyUserView {
    pub id: i64,
    pub full_name: Option<String>,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: String,
}

/// 用户分布洞察
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInsights {
    pub map_summary: MapSummary,
    pub nearby_users: Vec<NearbyUserView>,
}

/// 趋势汇总
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total: i64,
    pub last_week_total: i64,
    pub change_percent: f64,
    pub comparison_text: String,
}

/// 趋势曲线上的一点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: &'static str,
    pub value: i64,
}

/// 周趋势
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub metric: TrendMetric,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub summary: TrendSummary,
    pub series: Vec<TrendPoint>,
}

/// 单项评分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    pub label: &'static str,
    pub value: f64,
}

/// 商家评分
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratings {
    pub producer_type: ProducerType,
    pub average: f64,
    pub criteria: Vec<Criterion>,
}

/// 标签 + 数值
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValue {
    pub label: &'static str,
    pub value: i64,
}

/// 表现最好的活动类型
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub event_type: String,
    pub description: String,
}

/// 活动洞察
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInsights {
    pub price_split: Vec<LabelValue>,
    pub top_event: TopEvent,
}

/// 菜品评分行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRatingView {
    pub category_id: Option<i64>,
    pub category_name: String,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// 单品评分行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRatingView {
    pub dish_id: i64,
    pub dish_name: String,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// 菜品评分（按分类或按单品）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum DishRatings {
    #[serde(rename_all = "camelCase")]
    Category {
        total_categories: usize,
        ratings: Vec<CategoryRatingView>,
    },
    #[serde(rename_all = "camelCase")]
    Dish {
        category_id: Option<i64>,
        total_dishes: usize,
        ratings: Vec<DishRatingView>,
    },
}

/// 分类查询参数
#[derive(Debug, Clone)]
pub struct CategoryQuery {
    pub search: Option<String>,
    pub include_counts: bool,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Default for CategoryQuery {
    fn default() -> Self {
        Self {
            search: None,
            include_counts: true,
            page: None,
            limit: None,
        }
    }
}

/// 分页信息
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// 菜单分类分页结果
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub categories: Vec<crate::models::MenuCategory>,
    pub pagination: Pagination,
}

/// 菜单评分覆盖
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCoverageView {
    pub total_dishes: i64,
    pub rated_dishes: i64,
    pub not_rated_dishes: i64,
    pub rated_percentage: i64,
}

/// 被选择最多的菜品
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MostChosenDish {
    pub name: Option<String>,
    pub chosen_count: i64,
    pub time_frame: &'static str,
}

/// 菜单概览
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuOverview {
    pub menu_coverage: MenuCoverageView,
    pub most_chosen_dish: MostChosenDish,
}

/// 每日菜品评分点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRatingPoint {
    pub day: String,
    pub date: NaiveDate,
    pub average_rating: f64,
    pub total_ratings: i64,
}

/// 菜品评分下滑预警
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DishDropAlerts {
    pub time_frame: String,
    pub trend: Vec<DailyRatingPoint>,
}

// ==================== 洞察 ====================

/// 当月平均评分
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRating {
    pub month: String,
    pub average_rating: f64,
}

/// 评分明细
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingBreakdown {
    #[serde(rename = "type")]
    pub producer_type: ProducerType,
    pub overall: f64,
    pub criteria: serde_json::Value,
    pub updated_at: Option<DateTime<Utc>>,
}
