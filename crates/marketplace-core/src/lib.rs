//! 市场预订核心库
//!
//! 包含领域模型、仓储、业务服务以及时区与时段计算。
//!
//! ## 模块
//!
//! - `models`：商家、活动、预订、意向与看板聚合实体
//! - `repository`：基于 PostgreSQL 的仓储实现与 trait 抽象
//! - `service`：活动预订、餐厅订座、活动、意向、看板与洞察服务
//! - `time`：活动时间窗口与时区换算
//! - `slots`：营业时段切分

pub mod error;
pub mod models;
pub mod repository;
pub mod service;
pub mod slots;
pub mod time;

pub use error::{CoreError, Result};
