//! 仓储 Trait 定义
//!
//! 服务层只依赖这里的抽象，测试时由 mockall 生成的 Mock 替换

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::Result;
use crate::models::{
    BookingStatus, CategoryRating, ChosenDish, CustomerRating, DailyCount, DailyRating,
    DishRating, EngagedItem, Event, EventBooking, EventBookingView, EventFilter, EventPatch,
    EventStatus, EventType, EventTypeCount, Interest, InterestInvite, InterestStatus,
    InviteResponse, MenuCategory, MenuCoverage, NearbyProducer, NearbyQuery, NearbyUser, NewEvent,
    NewEventBooking, NewInterest, OverviewCounts, Page, PriceSplit, Producer, ProducerRating,
    ProducerType, ReferralBooking, Slot, TableBooking, TableTab, UpcomingBooking, User,
};

/// 用户仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    /// 过滤出真实存在的用户 ID
    async fn existing_ids(&self, ids: &[i64]) -> Result<Vec<i64>>;

    // 刷新令牌（存摘要）
    async fn add_refresh_token(&self, user_id: i64, digest: &str) -> Result<()>;
    /// 旧令牌存在时原子替换，返回是否替换成功
    async fn rotate_refresh_token(&self, user_id: i64, old: &str, new: &str) -> Result<bool>;
    async fn remove_refresh_token(&self, user_id: i64, digest: &str) -> Result<()>;
}

/// 商家仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProducerRepositoryTrait: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Producer>>;
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Producer>>;
    async fn find_leisure_profile_id(&self, producer_id: i64) -> Result<Option<i64>>;

    // 营业时段
    async fn list_slots(&self, user_id: i64) -> Result<Vec<Slot>>;
    async fn find_slot(&self, slot_id: i64) -> Result<Option<Slot>>;

    // 附近商家
    async fn count_nearby(&self, query: &NearbyQuery) -> Result<i64>;
    async fn list_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyProducer>>;
}

/// 活动仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn list_event_types(&self) -> Result<Vec<EventType>>;
    async fn find_event_type(&self, id: i64) -> Result<Option<EventType>>;

    /// 按 ID 查询（包含已软删除的活动）
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;
    /// 查询某商家名下未删除的活动
    async fn find_owned(&self, id: i64, producer_id: i64) -> Result<Option<Event>>;
    async fn list_by_producer(
        &self,
        producer_id: i64,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>>;
    async fn list_by_leisure(&self, leisure_id: i64) -> Result<Vec<Event>>;
    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>>;

    async fn create(&self, event: &NewEvent) -> Result<Event>;
    async fn update(&self, id: i64, patch: &EventPatch) -> Result<Option<Event>>;
    async fn soft_delete(&self, id: i64) -> Result<bool>;

    /// 未取消预订的人数合计
    async fn booked_guests(&self, event_id: i64) -> Result<i64>;
}

/// 活动预订仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventBookingRepositoryTrait: Send + Sync {
    async fn create(&self, booking: &NewEventBooking) -> Result<EventBooking>;
    async fn find_view(&self, id: i64) -> Result<Option<EventBookingView>>;
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<EventBookingView>>;
    /// 商家名下所有活动的预订
    async fn list_for_producer_owner(&self, owner_user_id: i64) -> Result<Vec<EventBookingView>>;

    /// 条件更新状态，仅当当前状态为 `from` 时生效
    async fn transition(&self, id: i64, from: BookingStatus, to: BookingStatus) -> Result<bool>;
    /// 取消 scheduled 状态的预订并记录原因
    async fn cancel(&self, id: i64, reason: &str) -> Result<bool>;
    /// 将活动已结束的 inProgress 预订批量置为 completed
    async fn complete_ended(&self, now: DateTime<Utc>, batch_size: i64) -> Result<u64>;
}

/// 餐厅订座仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableBookingRepositoryTrait: Send + Sync {
    async fn find_for_restaurant(&self, restaurant_id: i64, id: i64) -> Result<Option<TableBooking>>;

    async fn count_tab(&self, restaurant_id: i64, tab: TableTab, now: DateTime<Utc>) -> Result<i64>;
    async fn list_tab(
        &self,
        restaurant_id: i64,
        tab: TableTab,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<TableBooking>>;

    /// 餐厅取消（仅 scheduled）
    async fn cancel(
        &self,
        restaurant_id: i64,
        id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>>;
    /// 到店签到（仅 scheduled）
    async fn check_in(
        &self,
        restaurant_id: i64,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>>;
    async fn update_temp(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Result<Option<TableBooking>>;

    /// 超时未处理的 scheduled 订座自动取消，`restaurant_id` 为空时处理全部餐厅
    async fn cancel_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64>;
    /// 已结束的 inProgress 订座置为 completed
    async fn complete_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64>;
}

/// 意向与邀请仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterestRepositoryTrait: Send + Sync {
    async fn create(&self, interest: &NewInterest) -> Result<Interest>;
    async fn add_invites(&self, interest_id: i64, user_ids: &[i64]) -> Result<Vec<InterestInvite>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Interest>>;
    async fn find_for_user(&self, user_id: i64, id: i64) -> Result<Option<Interest>>;
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Interest>>;
    async fn list_invited(&self, user_id: i64) -> Result<Vec<Interest>>;
    async fn set_status(&self, id: i64, status: InterestStatus) -> Result<()>;

    // 邀请
    async fn invites_for(&self, interest_ids: &[i64]) -> Result<Vec<InterestInvite>>;
    async fn find_invite(&self, interest_id: i64, user_id: i64) -> Result<Option<InterestInvite>>;
    async fn update_invite(
        &self,
        invite_id: i64,
        response: &InviteResponse,
    ) -> Result<InterestInvite>;
}

/// 看板与洞察聚合查询接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepositoryTrait: Send + Sync {
    // 概览与用户分布
    async fn overview_counts(&self, producer_id: i64) -> Result<OverviewCounts>;
    async fn count_located_users(&self) -> Result<i64>;
    async fn nearby_users(&self, latitude: f64, longitude: f64, radius_km: f64)
    -> Result<Vec<NearbyUser>>;

    // 趋势（日期为 UTC 自然日，闭区间）
    async fn daily_interests(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>>;
    async fn daily_accepted_invites(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>>;

    // 评分
    async fn producer_rating(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
    ) -> Result<Option<ProducerRating>>;
    async fn average_overall_between(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<f64>>;

    // 活动
    async fn event_price_split(&self, producer_id: i64) -> Result<PriceSplit>;
    async fn top_event_types(&self, producer_id: i64, limit: i64) -> Result<Vec<EventTypeCount>>;

    // 菜单
    async fn category_ratings(&self, producer_id: i64) -> Result<Vec<CategoryRating>>;
    async fn dish_ratings(&self, producer_id: i64, category_id: Option<i64>)
    -> Result<Vec<DishRating>>;
    async fn count_categories(&self, producer_id: i64, search: Option<String>) -> Result<i64>;
    async fn list_categories(
        &self,
        producer_id: i64,
        search: Option<String>,
        include_counts: bool,
        page: Page,
    ) -> Result<Vec<MenuCategory>>;
    async fn menu_coverage(&self, producer_id: i64) -> Result<MenuCoverage>;
    async fn most_chosen_dish(&self, producer_id: i64) -> Result<Option<ChosenDish>>;
    async fn daily_dish_ratings(
        &self,
        producer_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyRating>>;

    // 洞察
    async fn top_posts(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>>;
    async fn top_dishes(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>>;
    async fn top_events(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>>;
    async fn upcoming_table_bookings(
        &self,
        producer_id: i64,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>>;
    async fn upcoming_event_bookings(
        &self,
        producer_id: i64,
        from: NaiveDate,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>>;
    async fn table_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>>;
    async fn event_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>>;
    async fn customers_by_rating(
        &self,
        producer_id: i64,
        rating: i32,
        limit: i64,
    ) -> Result<Vec<CustomerRating>>;
}
