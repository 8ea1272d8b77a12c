//! 请求 DTO 定义
//!
//! 请求体与查询参数，字段统一 camelCase；格式校验在这里完成，业务规则交给服务层

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use marketplace_core::models::{
    BookingStatus, DishGrouping, EventFilter, EventPatch, EventStatus, InterestType, InviteStatus,
    ProducerType, TrendMetric,
};
use marketplace_core::service::{CategoryQuery, EventDraft, InterestDraft, NearbySearch};
use marketplace_core::time::parse_clock;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation(format!("{field} must be in YYYY-MM-DD format")))
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    parse_clock(value).ok_or_else(|| ApiError::validation(format!("{field} must be in HH:mm format")))
}

fn validate_images(images: &[String]) -> Result<(), ValidationError> {
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(ValidationError::new("empty_image").with_message("Image URL cannot be empty".into()));
    }
    Ok(())
}

// ==================== 认证 ====================

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,
}

/// 刷新与登出共用
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Token is missing"))]
    pub refresh_token: String,
}

// ==================== 活动 ====================

/// 活动列表过滤，`radius` 单位为公里
#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub status: Option<EventStatus>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius: Option<f64>,
}

impl From<EventListQuery> for EventFilter {
    fn from(query: EventListQuery) -> Self {
        Self {
            status: query.status,
            category: query.category,
            event_type: query.event_type,
            latitude: query.lat,
            longitude: query.lng,
            radius_km: query.radius,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<EventStatus>,
}

/// 附近商家查询，`radius` 单位为米
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NearbyProducersQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub keyword: Option<String>,
    #[validate(range(min = 1, max = 100000, message = "page must be between 1 and 100000"))]
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub radius: Option<f64>,
    pub producer_type: Option<ProducerType>,
}

impl From<NearbyProducersQuery> for NearbySearch {
    fn from(query: NearbyProducersQuery) -> Self {
        Self {
            latitude: query.latitude,
            longitude: query.longitude,
            keyword: query.keyword,
            page: query.page,
            limit: query.limit,
            radius_m: query.radius,
            producer_type: query.producer_type,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub event_type_id: Option<i64>,
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Experience type is required"))]
    pub experience_type: String,
    #[validate(length(min = 3, message = "Location must be at least 3 characters"))]
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub time_zone: Option<String>,
    pub price_per_guest: Decimal,
    #[validate(range(min = 1, message = "Max capacity must be at least 1"))]
    pub max_capacity: i32,
    #[serde(default)]
    #[validate(
        length(max = 9, message = "You can upload at most 9 images"),
        custom(function = "validate_images")
    )]
    pub event_images: Vec<String>,
    #[serde(default)]
    pub status: EventStatus,
}

impl CreateEventRequest {
    pub fn into_draft(self) -> Result<EventDraft, ApiError> {
        self.validate()?;
        Ok(EventDraft {
            date: parse_date("date", &self.date)?,
            start_time: parse_time("startTime", &self.start_time)?,
            end_time: parse_time("endTime", &self.end_time)?,
            event_type_id: self.event_type_id,
            title: self.title,
            description: self.description,
            experience_type: self.experience_type,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            time_zone: self.time_zone,
            price_per_guest: self.price_per_guest,
            max_capacity: self.max_capacity,
            images: self.event_images,
            status: self.status,
        })
    }
}

/// 部分更新活动，缺省字段保持不变
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 3, message = "Title must be at least 3 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Experience type is required"))]
    pub experience_type: Option<String>,
    #[validate(length(min = 3, message = "Location must be at least 3 characters"))]
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub time_zone: Option<String>,
    pub price_per_guest: Option<Decimal>,
    #[validate(range(min = 1, message = "Max capacity must be at least 1"))]
    pub max_capacity: Option<i32>,
    #[validate(
        length(max = 9, message = "You can upload at most 9 images"),
        custom(function = "validate_images")
    )]
    pub event_images: Option<Vec<String>>,
    pub status: Option<EventStatus>,
}

impl UpdateEventRequest {
    pub fn into_patch(self) -> Result<EventPatch, ApiError> {
        self.validate()?;
        Ok(EventPatch {
            date: self.date.as_deref().map(|d| parse_date("date", d)).transpose()?,
            start_time: self
                .start_time
                .as_deref()
                .map(|t| parse_time("startTime", t))
                .transpose()?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| parse_time("endTime", t))
                .transpose()?,
            title: self.title,
            description: self.description,
            experience_type: self.experience_type,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            time_zone: self.time_zone,
            price_per_guest: self.price_per_guest,
            max_capacity: self.max_capacity,
            images: self.event_images,
            status: self.status,
        })
    }
}

/// 营业时段预览
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlotPreviewQuery {
    pub start: String,
    pub end: String,
    #[serde(default = "default_hour_limit")]
    #[validate(range(min = 1, max = 24, message = "hourLimit must be between 1 and 24"))]
    pub hour_limit: u32,
}

fn default_hour_limit() -> u32 {
    1
}

// ==================== 意向 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterestRequest {
    #[serde(rename = "type")]
    pub interest_type: InterestType,
    pub producer_id: Option<i64>,
    pub event_id: Option<i64>,
    pub slot_id: Option<i64>,
    pub suggested_time: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
    #[serde(default)]
    pub invited_user_ids: Vec<i64>,
}

impl From<CreateInterestRequest> for InterestDraft {
    fn from(req: CreateInterestRequest) -> Self {
        Self {
            interest_type: req.interest_type,
            producer_id: req.producer_id,
            event_id: req.event_id,
            slot_id: req.slot_id,
            suggested_time: req.suggested_time,
            message: req.message,
            invited_user_ids: req.invited_user_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInviteRequest {
    pub interest_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeclineInviteRequest {
    pub interest_id: i64,
    #[validate(length(min = 1, max = 300, message = "Reason must be between 1 and 300 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_suggestion"))]
pub struct SuggestTimeRequest {
    pub interest_id: i64,
    pub slot_id: Option<i64>,
    pub suggested_time: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Message must be at most 500 characters"))]
    pub message: Option<String>,
}

fn validate_suggestion(req: &SuggestTimeRequest) -> Result<(), ValidationError> {
    if req.slot_id.is_none() && req.suggested_time.is_none() {
        return Err(ValidationError::new("missing_suggestion")
            .with_message("Either slotId or suggestedTime is required".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct RespondInviteRequest {
    pub status: InviteStatus,
}

// ==================== 活动预订 ====================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "guestCount must be at least 1"))]
    pub guest_count: i32,
    #[validate(length(max = 500, message = "internalNotes must be at most 500 characters"))]
    pub internal_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BookingStatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelBookingRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
}

// ==================== 餐厅订座 ====================

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TableBookingsQuery {
    /// 分栏：scheduled / inProgress / completed / cancelled
    pub booking: Option<String>,
    #[validate(range(min = 1, max = 100000, message = "page must be between 1 and 100000"))]
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeZoneQuery {
    pub time_zone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelTableBookingRequest {
    #[validate(length(min = 1, max = 500, message = "cancelReason must be between 1 and 500 characters"))]
    pub cancel_reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTempRequest {
    pub status: BookingStatus,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
}

// ==================== 看板与洞察 ====================

#[derive(Debug, Default, Deserialize)]
pub struct TrendsQuery {
    #[serde(default)]
    pub metric: TrendMetric,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRatingsQuery {
    #[serde(default)]
    pub group_by: DishGrouping,
    pub category_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoriesQuery {
    pub search: Option<String>,
    pub include_counts: Option<bool>,
    #[validate(range(min = 1, max = 100000, message = "page must be between 1 and 100000"))]
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl From<CategoriesQuery> for CategoryQuery {
    fn from(query: CategoriesQuery) -> Self {
        Self {
            search: query.search,
            include_counts: query.include_counts.unwrap_or(true),
            page: query.page,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DishDropQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingBookingsQuery {
    pub from: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct RatingQuery {
    pub rating: i32,
}
