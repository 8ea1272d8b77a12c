//! 活动实体

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::EventStatus;
use crate::time::{EventWindow, resolve_zone};

/// 活动类型（仅休闲类商家使用）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub id: i64,
    pub name: String,
}

/// 活动
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i64,
    pub producer_id: i64,
    #[sqlx(default)]
    pub leisure_id: Option<i64>,
    #[sqlx(default)]
    pub event_type_id: Option<i64>,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    pub experience_type: String,
    pub location: String,
    #[sqlx(default)]
    pub latitude: Option<f64>,
    #[sqlx(default)]
    pub longitude: Option<f64>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub time_zone: String,
    pub price_per_guest: Decimal,
    pub max_capacity: i32,
    #[serde(rename = "eventImages")]
    #[sqlx(default)]
    pub images: Vec<String>,
    pub status: EventStatus,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// 活动所在时区（脏数据回退 UTC）
    pub fn zone(&self) -> Tz {
        resolve_zone(Some(&self.time_zone))
    }

    /// 活动的绝对时间窗口
    pub fn window(&self) -> EventWindow {
        EventWindow::resolve(self.date, self.start_time, self.end_time, self.zone())
    }
}

/// 活动详情（附带参与人数）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub total_participants: i64,
}

/// 新建活动参数（已通过校验）
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub producer_id: i64,
    pub leisure_id: Option<i64>,
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
    pub time_zone: String,
    pub price_per_guest: Decimal,
    pub max_capacity: i32,
    pub images: Vec<String>,
    pub status: EventStatus,
}

/// 活动部分更新（None 表示保持不变）
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub experience_type: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub time_zone: Option<String>,
    pub price_per_guest: Option<Decimal>,
    pub max_capacity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub status: Option<EventStatus>,
}

/// 活动列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    /// 体验类型
    pub category: Option<String>,
    /// 活动类型名称
    pub event_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
}

impl EventFilter {
    /// 经纬度与半径齐全时才启用距离过滤
    pub fn geo(&self) -> Option<(f64, f64, f64)> {
        match (self.latitude, self.longitude, self.radius_km) {
            (Some(lat), Some(lng), Some(radius)) => Some((lat, lng, radius)),
            _ => None,
        }
    }
}
