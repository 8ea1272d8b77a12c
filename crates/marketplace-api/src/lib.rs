//! 市场预订 API 服务
//!
//! 面向 App 用户、商家与管理员的 REST API。
//!
//! ## 核心功能
//!
//! - **认证**：邮箱密码登录，access/refresh 双 Token，refresh token 轮换与吊销
//! - **活动预订**：下单、取消、签到，活动结束后自动完成
//! - **餐厅订座**：分栏列表、取消、到店签到、超时自动取消
//! - **活动与意向**：活动发布、附近商家、邀请好友并答复
//! - **看板与洞察**：商家维度的统计分析
//!
//! ## 模块结构
//!
//! - `auth`: JWT 与密码处理、登录服务
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `middleware`: 认证与角色中间件
//! - `routes`: 路由配置
//! - `state`: 应用状态
//! - `worker`: 后台预订状态推进

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod worker;

pub use dto::ApiResponse;
pub use error::{ApiError, Result};
pub use state::AppState;
