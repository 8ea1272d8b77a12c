//! 服务层
//!
//! 实现预订、活动、意向与看板的业务规则，通过仓储 trait 访问数据。
//!
//! ## 模块结构
//!
//! - `dto`: 服务输入输出对象
//! - `event_booking_service`: 活动预订（下单、取消、签到、自动完成）
//! - `table_booking_service`: 餐厅订座（分栏列表、取消、签到、过期清理）
//! - `event_service`: 活动管理与附近商家搜索
//! - `interest_service`: 意向与邀请
//! - `dashboard_service`: 商家看板
//! - `insights_service`: 商家洞察

pub mod dashboard_service;
pub mod dto;
pub mod event_booking_service;
pub mod event_service;
pub mod insights_service;
pub mod interest_service;
pub mod table_booking_service;

pub use dashboard_service::{DashboardService, NEARBY_RADIUS_KM};
pub use dto::*;
pub use event_booking_service::EventBookingService;
pub use event_service::{DEFAULT_NEARBY_RADIUS_M, EventService};
pub use insights_service::InsightsService;
pub use interest_service::InterestService;
pub use table_booking_service::{SweepCounts, TableBookingService};
