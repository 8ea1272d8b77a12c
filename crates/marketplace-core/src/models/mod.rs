//! 领域模型
//!
//! 包含商家、活动、预订、意向以及看板聚合结果的实体定义

pub mod analytics;
pub mod booking;
pub mod enums;
pub mod event;
pub mod interest;
pub mod user;

pub use analytics::{
    CategoryRating, ChosenDish, CustomerRating, DailyCount, DailyRating, DishRating,
    EngagedItem, EventTypeCount, LeisureRating, MenuCategory, MenuCoverage, NearbyUser,
    OverviewCounts, PriceSplit, ProducerRating, ReferralBooking, RestaurantRating,
    UpcomingBooking, WellnessRating,
};
pub use booking::{EventBooking, EventBookingView, NewEventBooking, Page, TableBooking, TableTab};
pub use enums::{
    ADMIN_ROLE_ID, BookingStatus, CancelBy, DishGrouping, EventStatus, InterestStatus,
    InterestType, InviteStatus, PRODUCER_ROLES, ProducerType, TrendMetric, is_producer_role,
};
pub use event::{Event, EventDetail, EventFilter, EventPatch, EventType, NewEvent};
pub use interest::{Interest, InterestInvite, InterestWithInvites, InviteResponse, NewInterest};
pub use user::{NearbyProducer, NearbyQuery, Producer, Slot, User};
