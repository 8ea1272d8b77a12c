//! 意向与邀请实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{InterestStatus, InterestType, InviteStatus};

/// 意向
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub interest_type: InterestType,
    #[sqlx(default)]
    pub producer_id: Option<i64>,
    #[sqlx(default)]
    pub event_id: Option<i64>,
    #[sqlx(default)]
    pub slot_id: Option<i64>,
    #[sqlx(default)]
    pub suggested_time: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub message: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
}

/// 邀请
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterestInvite {
    pub id: i64,
    pub interest_id: i64,
    pub invited_user_id: i64,
    pub status: InviteStatus,
    #[sqlx(default)]
    pub decline_reason: Option<String>,
    #[sqlx(default)]
    pub suggested_slot_id: Option<i64>,
    #[sqlx(default)]
    pub suggested_time: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub suggested_message: Option<String>,
    #[sqlx(default)]
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// 意向及其邀请列表
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestWithInvites {
    #[serde(flatten)]
    pub interest: Interest,
    pub invites: Vec<InterestInvite>,
}

/// 新建意向参数
#[derive(Debug, Clone)]
pub struct NewInterest {
    pub user_id: i64,
    pub interest_type: InterestType,
    pub producer_id: Option<i64>,
    pub event_id: Option<i64>,
    pub slot_id: Option<i64>,
    pub suggested_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

/// 受邀人对邀请的答复
#[derive(Debug, Clone, Default)]
pub struct InviteResponse {
    pub status: InviteStatus,
    pub decline_reason: Option<String>,
    pub suggested_slot_id: Option<i64>,
    pub suggested_time: Option<DateTime<Utc>>,
    pub suggested_message: Option<String>,
}
