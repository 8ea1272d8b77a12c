//! 用户与商家实体

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ProducerType, is_producer_role};

/// 用户（含角色名）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password_hash: Option<String>,
    pub role_id: i64,
    pub role_name: String,
    pub is_active: bool,
    pub is_deleted: bool,
    #[sqlx(default)]
    pub latitude: Option<f64>,
    #[sqlx(default)]
    pub longitude: Option<f64>,
    #[sqlx(default)]
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 是否为商家账号
    pub fn is_producer(&self) -> bool {
        is_producer_role(&self.role_name)
    }

    /// 账号是否可用
    pub fn is_usable(&self) -> bool {
        self.is_active && !self.is_deleted
    }
}

/// 商家档案（与用户一对一）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Producer {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub producer_type: ProducerType,
    #[sqlx(default)]
    pub address: Option<String>,
    #[sqlx(default)]
    pub city: Option<String>,
    #[sqlx(default)]
    pub country: Option<String>,
    #[sqlx(default)]
    pub latitude: Option<f64>,
    #[sqlx(default)]
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// 附近商家（带距离）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NearbyProducer {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub producer_type: ProducerType,
    pub latitude: f64,
    pub longitude: f64,
    #[sqlx(default)]
    pub address: Option<String>,
    #[sqlx(default)]
    pub profile_image: Option<String>,
    /// 距离（米）
    pub distance: f64,
    #[sqlx(skip)]
    pub eta_in_minutes: i64,
}

/// 商家的每周营业时段
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: i64,
    pub user_id: i64,
    /// 星期名（Monday..Sunday）
    pub day: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// 附近商家查询条件
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// 搜索半径（米）
    pub radius_m: f64,
    pub keyword: Option<String>,
    pub producer_type: Option<ProducerType>,
    pub limit: i64,
    pub offset: i64,
}
