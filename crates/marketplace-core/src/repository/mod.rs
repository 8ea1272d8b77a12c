//! 数据库仓储层
//!
//! 封装全部 SQL，服务层通过 trait 依赖这里的实现。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据存取，不包含业务规则
//! - 状态变更一律是带期望状态的条件更新
//! - 后台批量扫描使用 `FOR UPDATE SKIP LOCKED`

mod analytics_repo;
mod event_booking_repo;
mod event_repo;
mod geo;
mod interest_repo;
mod producer_repo;
mod table_booking_repo;
mod traits;
mod user_repo;
mod zone;

pub use analytics_repo::AnalyticsRepository;
pub use event_booking_repo::EventBookingRepository;
pub use event_repo::EventRepository;
pub use geo::EARTH_RADIUS_KM;
pub use interest_repo::InterestRepository;
pub use producer_repo::ProducerRepository;
pub use table_booking_repo::{SYSTEM_CANCEL_REASON, TableBookingRepository};
pub use traits::*;
pub use user_repo::UserRepository;
