//! 活动预订仓储
//!
//! 所有状态变更都是带 `WHERE status = <期望状态>` 的条件更新，
//! 并发读者不会重复执行同一次转换，也不会把已取消的预订改回去。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::EventBookingRepositoryTrait;
use super::zone::event_local_to_utc;
use crate::error::Result;
use crate::models::{BookingStatus, EventBooking, EventBookingView, NewEventBooking};

const VIEW_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.event_id, b.number_of_persons, b.total_price, b.status,
           b.internal_notes, b.created_at, b.updated_at,
           e.title AS event_title, e.date AS event_date,
           e.start_time AS event_start_time, e.end_time AS event_end_time,
           e.time_zone AS event_time_zone, e.location AS event_location,
           p.id AS producer_id, p.user_id AS producer_user_id,
           p.name AS producer_name, p.producer_type
    FROM event_bookings b
    JOIN events e ON e.id = b.event_id
    JOIN producers p ON p.id = e.producer_id
"#;

/// 活动在其时区内的结束时间点（跨夜活动结束于次日）
const EVENT_END_LOCAL_SQL: &str =
    "(CASE WHEN e.end_time <= e.start_time THEN e.date + 1 ELSE e.date END) + e.end_time";

/// 活动预订仓储
pub struct EventBookingRepository {
    pool: PgPool,
}

impl EventBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    pub async fn find_view(&self, id: i64) -> Result<Option<EventBookingView>> {
        let sql = format!("{VIEW_SELECT} WHERE b.id = $1");
        let view = sqlx::query_as::<_, EventBookingView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<EventBookingView>> {
        let sql = format!("{VIEW_SELECT} WHERE b.user_id = $1 ORDER BY b.created_at DESC");
        let views = sqlx::query_as::<_, EventBookingView>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    pub async fn list_for_producer_owner(
        &self,
        owner_user_id: i64,
    ) -> Result<Vec<EventBookingView>> {
        let sql = format!("{VIEW_SELECT} WHERE p.user_id = $1 ORDER BY b.created_at DESC");
        let views = sqlx::query_as::<_, EventBookingView>(&sql)
            .bind(owner_user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(views)
    }

    // ==================== 写入操作 ====================

    pub async fn create(&self, booking: &NewEventBooking) -> Result<EventBooking> {
        let created = sqlx::query_as::<_, EventBooking>(
            r#"
            INSERT INTO event_bookings
                (user_id, event_id, number_of_persons, total_price, status, internal_notes,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'scheduled', $5, NOW(), NOW())
            RETURNING id, user_id, event_id, number_of_persons, total_price, status,
                      internal_notes, created_at, updated_at
            "#,
        )
        .bind(booking.user_id)
        .bind(booking.event_id)
        .bind(booking.number_of_persons)
        .bind(booking.total_price)
        .bind(&booking.internal_notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn transition(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE event_bookings
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn cancel(&self, id: i64, reason: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE event_bookings
            SET status = 'cancelled', internal_notes = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'scheduled'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 活动已结束的 inProgress 预订置为 completed
    ///
    /// 使用 `FOR UPDATE SKIP LOCKED` 分批锁定，多实例并行扫描时互不重复
    pub async fn complete_ended(&self, now: DateTime<Utc>, batch_size: i64) -> Result<u64> {
        let event_end = event_local_to_utc(EVENT_END_LOCAL_SQL);
        let sql = format!(
            r#"
            WITH due AS (
                SELECT b.id
                FROM event_bookings b
                JOIN events e ON e.id = b.event_id
                WHERE b.status = 'inProgress'
                  AND {event_end} <= $1
                ORDER BY b.id
                LIMIT $2
                FOR UPDATE OF b SKIP LOCKED
            )
            UPDATE event_bookings
            SET status = 'completed', updated_at = NOW()
            FROM due
            WHERE event_bookings.id = due.id AND event_bookings.status = 'inProgress'
            "#
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(batch_size)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl EventBookingRepositoryTrait for EventBookingRepository {
    async fn create(&self, booking: &NewEventBooking) -> Result<EventBooking> {
        self.create(booking).await
    }

    async fn find_view(&self, id: i64) -> Result<Option<EventBookingView>> {
        self.find_view(id).await
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<EventBookingView>> {
        self.list_for_user(user_id).await
    }

    async fn list_for_producer_owner(&self, owner_user_id: i64) -> Result<Vec<EventBookingView>> {
        self.list_for_producer_owner(owner_user_id).await
    }

    async fn transition(&self, id: i64, from: BookingStatus, to: BookingStatus) -> Result<bool> {
        self.transition(id, from, to).await
    }

    async fn cancel(&self, id: i64, reason: &str) -> Result<bool> {
        self.cancel(id, reason).await
    }

    async fn complete_ended(&self, now: DateTime<Utc>, batch_size: i64) -> Result<u64> {
        self.complete_ended(now, batch_size).await
    }
}
