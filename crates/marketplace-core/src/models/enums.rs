//! 领域枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化，
//! 序列化拼写与既有客户端保持一致。

use serde::{Deserialize, Serialize};

/// 可视为商家的角色名称
pub const PRODUCER_ROLES: [&str; 4] = ["restaurant", "producer", "leisure", "wellness"];

/// 管理员角色 ID
pub const ADMIN_ROLE_ID: i64 = 1;

/// 角色名称是否属于商家
pub fn is_producer_role(role: &str) -> bool {
    PRODUCER_ROLES.contains(&role)
}

/// 预订状态
///
/// 活动预订与餐厅订座共用：scheduled → inProgress → completed，
/// scheduled/inProgress 可被取消
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "camelCase")]
#[sqlx(type_name = "varchar", rename_all = "camelCase")]
pub enum BookingStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// 解析查询参数中的状态名
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(Self::Scheduled),
            "inProgress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// 是否处于终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 取消方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum CancelBy {
    /// 顾客本人
    Customer,
    /// 餐厅
    Restaurant,
    /// 系统或管理员（超时自动取消）
    Admin,
}

/// 商家类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ProducerType {
    #[default]
    Restaurant,
    Leisure,
    Wellness,
}

impl ProducerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restaurant => "restaurant",
            Self::Leisure => "leisure",
            Self::Wellness => "wellness",
        }
    }

    /// 首字母大写的展示名
    pub fn label(&self) -> &'static str {
        match self {
            Self::Restaurant => "Restaurant",
            Self::Leisure => "Leisure",
            Self::Wellness => "Wellness",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "restaurant" => Some(Self::Restaurant),
            "leisure" => Some(Self::Leisure),
            "wellness" => Some(Self::Wellness),
            _ => None,
        }
    }

    /// 可以发布活动的商家类型
    pub fn can_host_events(&self) -> bool {
        matches!(self, Self::Restaurant | Self::Leisure)
    }
}

/// 活动状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Inactive,
    Draft,
    Cancelled,
}

/// 意向类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum InterestType {
    /// 对商家的意向（可附带时段）
    Producer,
    /// 对某个活动的意向
    Event,
}

/// 意向整体状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum InterestStatus {
    #[default]
    Pending,
    /// 所有受邀人都已接受
    Confirmed,
    /// 所有受邀人都已拒绝
    Declined,
}

/// 邀请状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
pub enum InviteStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    /// 受邀人提议了新的时间
    SuggestedNewTime,
}

impl InviteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::SuggestedNewTime => "suggested_new_time",
        }
    }
}

impl std::fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 趋势指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendMetric {
    #[default]
    Interests,
    Choices,
    ChoicesMade,
}

impl TrendMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interests => "interests",
            Self::Choices => "choices",
            Self::ChoicesMade => "choicesMade",
        }
    }
}

/// 菜品评分聚合维度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DishGrouping {
    #[default]
    Category,
    Dish,
}
