//! HTTP 请求处理器模块
//!
//! 处理器只负责提取参数和组装响应，业务规则都在 `marketplace_core::service` 中

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod event;
pub mod event_booking;
pub mod health;
pub mod insights;
pub mod interest;
pub mod producer;
pub mod table_booking;
