//! 商家洞察服务
//!
//! 互动排行、即将到来的预订、好友推荐、月度评分与评分明细。

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use tracing::instrument;

use crate::error::{CoreError, Result};
use crate::models::{
    CustomerRating, EngagedItem, Producer, ProducerRating, ReferralBooking, UpcomingBooking,
};
use crate::repository::{AnalyticsRepositoryTrait, ProducerRepositoryTrait};
use crate::service::dashboard_service::round1;
use crate::service::dto::{MonthlyRating, RatingBreakdown};

const TOP_PER_KIND: i64 = 5;
const MOST_ENGAGED_LIMIT: usize = 10;
/// 合并前每一侧先多取一些
const SIDE_FETCH_LIMIT: i64 = 50;
const MERGED_LIMIT: usize = 20;
const CUSTOMER_LIMIT: i64 = 50;

/// 商家洞察服务
pub struct InsightsService<P, A>
where
    P: ProducerRepositoryTrait,
    A: AnalyticsRepositoryTrait,
{
    producers: Arc<P>,
    analytics: Arc<A>,
}

impl<P, A> InsightsService<P, A>
where
    P: ProducerRepositoryTrait,
    A: AnalyticsRepositoryTrait,
{
    pub fn new(producers: Arc<P>, analytics: Arc<A>) -> Self {
        Self {
            producers,
            analytics,
        }
    }

    async fn find_producer(&self, user_id: i64) -> Result<Option<Producer>> {
        self.producers.find_by_user_id(user_id).await
    }

    async fn producer(&self, user_id: i64) -> Result<Producer> {
        self.find_producer(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Producer not found."))
    }

    /// 帖子、菜品、活动三类各取前 5，合并后按互动分取前 10
    #[instrument(skip(self))]
    pub async fn most_engaged_items(&self, user_id: i64) -> Result<Vec<EngagedItem>> {
        let producer = self.producer(user_id).await?;

        let (posts, dishes, events) = tokio::try_join!(
            self.analytics.top_posts(producer.id, TOP_PER_KIND),
            self.analytics.top_dishes(producer.id, TOP_PER_KIND),
            self.analytics.top_events(producer.id, TOP_PER_KIND),
        )?;

        let mut items: Vec<EngagedItem> = posts.into_iter().chain(dishes).chain(events).collect();
        if items.is_empty() {
            return Err(CoreError::not_found(
                "No engagement data found for this producer",
            ));
        }

        items.sort_by(|a, b| {
            b.engagement_score
                .partial_cmp(&a.engagement_score)
                .unwrap_or(Ordering::Equal)
        });
        items.truncate(MOST_ENGAGED_LIMIT);
        Ok(items)
    }

    /// 从指定时间（默认当前）起的订座与活动预订，按开始时间升序
    #[instrument(skip(self))]
    pub async fn upcoming_bookings(
        &self,
        user_id: i64,
        from: Option<DateTime<Utc>>,
    ) -> Result<Vec<UpcomingBooking>> {
        let producer = self.producer(user_id).await?;
        let from = from.unwrap_or_else(Utc::now);

        let (tables, events) = tokio::try_join!(
            self.analytics
                .upcoming_table_bookings(producer.id, from, SIDE_FETCH_LIMIT),
            self.analytics
                .upcoming_event_bookings(producer.id, from.date_naive(), SIDE_FETCH_LIMIT),
        )?;

        let mut bookings: Vec<UpcomingBooking> = tables.into_iter().chain(events).collect();
        bookings.sort_by_key(|b| b.start_date);
        bookings.truncate(MERGED_LIMIT);
        Ok(bookings)
    }

    /// 好友推荐带来的预订，按下单时间倒序
    #[instrument(skip(self))]
    pub async fn friend_referral_bookings(&self, user_id: i64) -> Result<Vec<ReferralBooking>> {
        let producer = self.producer(user_id).await?;

        let (tables, events) = tokio::try_join!(
            self.analytics.table_referrals(producer.id, SIDE_FETCH_LIMIT),
            self.analytics.event_referrals(producer.id, SIDE_FETCH_LIMIT),
        )?;

        let mut bookings: Vec<ReferralBooking> = tables.into_iter().chain(events).collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        bookings.truncate(MERGED_LIMIT);
        Ok(bookings)
    }

    /// 当月平均总评分，没有评分时为 0
    #[instrument(skip(self))]
    pub async fn monthly_average_rating(&self, user_id: i64) -> Result<MonthlyRating> {
        let producer = self
            .find_producer(user_id)
            .await?
            .ok_or_else(|| CoreError::bad_request("Producer not found"))?;

        let (from, to) = month_bounds(Utc::now().date_naive());
        let average = self
            .analytics
            .average_overall_between(
                producer.id,
                producer.producer_type,
                from.and_time(NaiveTime::MIN).and_utc(),
                to.and_time(NaiveTime::MIN).and_utc(),
            )
            .await?
            .filter(|avg| avg.is_finite())
            .map_or(0.0, round1);

        Ok(MonthlyRating {
            month: from.format("%Y-%m").to_string(),
            average_rating: average,
        })
    }

    /// 给出指定星级的最近 50 位顾客
    #[instrument(skip(self))]
    pub async fn customers_by_rating(
        &self,
        user_id: i64,
        rating: i32,
    ) -> Result<Vec<CustomerRating>> {
        if !(1..=5).contains(&rating) {
            return Err(CoreError::bad_request("Rating must be between 1 and 5"));
        }
        let producer = self.producer(user_id).await?;

        self.analytics
            .customers_by_rating(producer.id, rating, CUSTOMER_LIMIT)
            .await
    }

    /// 按商家类型返回各项评分，没有评分时返回 None
    #[instrument(skip(self))]
    pub async fn rating_breakdown(&self, user_id: i64) -> Result<Option<RatingBreakdown>> {
        let producer = self
            .find_producer(user_id)
            .await?
            .ok_or_else(|| CoreError::bad_request("Producer not found"))?;

        let Some(rating) = self
            .analytics
            .producer_rating(producer.id, producer.producer_type)
            .await?
        else {
            return Ok(None);
        };

        let (overall, criteria, updated_at) = match rating {
            ProducerRating::Restaurant(r) => (
                r.overall,
                json!({
                    "service": r.service,
                    "place": r.place,
                    "portions": r.portions,
                    "ambiance": r.ambiance,
                }),
                r.updated_at,
            ),
            ProducerRating::Wellness(r) => (
                r.overall,
                json!({
                    "careQuality": r.care_quality,
                    "cleanliness": r.cleanliness,
                    "welcome": r.welcome,
                    "valueForMoney": r.value_for_money,
                    "atmosphere": r.atmosphere,
                    "staffExperience": r.staff_experience,
                }),
                r.updated_at,
            ),
            ProducerRating::Leisure(r) => (
                r.overall,
                json!({
                    "stageDirection": r.stage_direction,
                    "actorPerformance": r.actor_performance,
                    "textQuality": r.text_quality,
                    "scenography": r.scenography,
                }),
                r.updated_at,
            ),
        };

        Ok(Some(RatingBreakdown {
            producer_type: producer.producer_type,
            overall,
            criteria,
            updated_at,
        }))
    }
}

/// 当月第一天与下月第一天（左闭右开）
fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = today.with_day(1).unwrap_or(today);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    (first, next)
}
