//! 预订实体
//!
//! - `EventBooking`：用户对某个活动的预订
//! - `TableBooking`：餐厅订座，起止时间以 UTC 时间点存储

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{BookingStatus, CancelBy, ProducerType};
use crate::time::{EventWindow, resolve_zone};

/// 活动预订
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventBooking {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub number_of_persons: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    #[sqlx(default)]
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 活动预订联表视图
///
/// 预订 + 活动排期 + 活动所属商家，状态判断所需的字段一次取齐
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventBookingView {
    pub id: i64,
    pub user_id: i64,
    pub event_id: i64,
    pub number_of_persons: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    #[sqlx(default)]
    pub internal_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_start_time: NaiveTime,
    pub event_end_time: NaiveTime,
    pub event_time_zone: String,
    pub event_location: String,

    pub producer_id: i64,
    pub producer_user_id: i64,
    pub producer_name: String,
    pub producer_type: ProducerType,
}

impl EventBookingView {
    /// 所属活动的绝对时间窗口
    pub fn window(&self) -> EventWindow {
        EventWindow::resolve(
            self.event_date,
            self.event_start_time,
            self.event_end_time,
            resolve_zone(Some(&self.event_time_zone)),
        )
    }
}

/// 新建活动预订参数
#[derive(Debug, Clone)]
pub struct NewEventBooking {
    pub user_id: i64,
    pub event_id: i64,
    pub number_of_persons: i32,
    pub total_price: Decimal,
    pub internal_notes: Option<String>,
}

/// 餐厅订座
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TableBooking {
    pub id: i64,
    pub customer_id: i64,
    /// 餐厅所有者的用户 ID
    pub restaurant_id: i64,
    #[sqlx(default)]
    pub customer_name: Option<String>,
    pub guest_count: i32,
    #[sqlx(default)]
    pub special_request: Option<String>,
    pub booking_date: NaiveDate,
    #[sqlx(default)]
    pub slot_start_time: Option<NaiveTime>,
    #[sqlx(default)]
    pub slot_end_time: Option<NaiveTime>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    #[sqlx(default)]
    pub time_zone: Option<String>,
    pub status: BookingStatus,
    #[sqlx(default)]
    pub check_in_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub cancel_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub cancel_by: Option<CancelBy>,
    #[sqlx(default)]
    pub cancel_reason: Option<String>,
    pub review_added: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 订座列表分栏
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableTab {
    /// 待到店且尚未结束
    Scheduled,
    InProgress,
    /// 已结束且未被取消
    Completed,
    Cancelled,
}

impl TableTab {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "inProgress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// 订座列表分页
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;
    /// 页码上限，保证 OFFSET 不会溢出
    pub const MAX_PAGE: i64 = 100_000;

    /// 规范化分页参数：页码 1..=100000，每页 1..=100 条
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_default_limit(page, limit, Self::DEFAULT_LIMIT)
    }

    pub fn with_default_limit(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit.unwrap_or(default_limit).clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_normalization() {
        let page = Page::new(None, None);
        assert_eq!((page.page, page.limit), (1, 10));

        let page = Page::new(Some(0), Some(500));
        assert_eq!((page.page, page.limit), (1, 100));

        let page = Page::new(Some(3), Some(20));
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        for raw in [i64::MAX, Page::MAX_PAGE + 1] {
            let page = Page::new(Some(raw), Some(100));
            assert_eq!(page.page, Page::MAX_PAGE);
            assert_eq!(page.offset(), (Page::MAX_PAGE - 1) * 100);
        }

        let page = Page::new(Some(i64::MIN), Some(i64::MAX));
        assert_eq!((page.page, page.limit), (1, Page::MAX_LIMIT));
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_table_tab_parse() {
        assert_eq!(TableTab::parse("inProgress"), Some(TableTab::InProgress));
        assert_eq!(TableTab::parse("cancelled"), Some(TableTab::Cancelled));
        assert_eq!(TableTab::parse("all"), None);
        assert_eq!(TableTab::parse("InProgress"), None);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(Some(1), Some(10));
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }
}
