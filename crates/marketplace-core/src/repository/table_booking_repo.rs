//! 餐厅订座仓储
//!
//! 订座起止时间以 UTC 时间点存储，超时判断直接与当前时间比较

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::TableBookingRepositoryTrait;
use crate::error::Result;
use crate::models::{BookingStatus, Page, TableBooking, TableTab};

const BOOKING_COLUMNS: &str = r#"
    id, customer_id, restaurant_id, customer_name, guest_count, special_request,
    booking_date, slot_start_time, slot_end_time, start_date_time, end_date_time,
    time_zone, status, check_in_at, cancel_at, cancel_by, cancel_reason, review_added,
    created_at, updated_at
"#;

/// 系统自动取消时写入的原因
pub const SYSTEM_CANCEL_REASON: &str =
    "Cancelled by system because its overdue and no action was taken";

/// 分栏的过滤条件与排序（$2 为当前时间）
fn tab_clause(tab: TableTab) -> (&'static str, &'static str) {
    match tab {
        TableTab::Scheduled => (
            "status = 'scheduled' AND end_date_time > $2",
            "start_date_time ASC",
        ),
        TableTab::InProgress => ("status = 'inProgress' AND $2::timestamptz IS NOT NULL", "id DESC"),
        TableTab::Completed => (
            "end_date_time < $2 AND status NOT IN ('cancelled', 'scheduled')",
            "id DESC",
        ),
        TableTab::Cancelled => ("status = 'cancelled' AND $2::timestamptz IS NOT NULL", "id DESC"),
    }
}

/// 餐厅订座仓储
pub struct TableBookingRepository {
    pool: PgPool,
}

impl TableBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    pub async fn find_for_restaurant(
        &self,
        restaurant_id: i64,
        id: i64,
    ) -> Result<Option<TableBooking>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE id = $1 AND restaurant_id = $2 AND is_deleted = false"
        );
        let booking = sqlx::query_as::<_, TableBooking>(&sql)
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn count_tab(
        &self,
        restaurant_id: i64,
        tab: TableTab,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let (filter, _) = tab_clause(tab);
        let sql = format!(
            "SELECT COUNT(*) FROM bookings \
             WHERE restaurant_id = $1 AND is_deleted = false AND {filter}"
        );
        let (total,): (i64,) = sqlx::query_as(&sql)
            .bind(restaurant_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    pub async fn list_tab(
        &self,
        restaurant_id: i64,
        tab: TableTab,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<TableBooking>> {
        let (filter, order) = tab_clause(tab);
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE restaurant_id = $1 AND is_deleted = false AND {filter} \
             ORDER BY {order} LIMIT $3 OFFSET $4"
        );
        let bookings = sqlx::query_as::<_, TableBooking>(&sql)
            .bind(restaurant_id)
            .bind(now)
            .bind(page.limit)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    // ==================== 状态变更 ====================

    pub async fn cancel(
        &self,
        restaurant_id: i64,
        id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET status = 'cancelled', cancel_by = 'restaurant', cancel_reason = $3,
                cancel_at = $4, updated_at = NOW()
            WHERE id = $1 AND restaurant_id = $2 AND status = 'scheduled'
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let booking = sqlx::query_as::<_, TableBooking>(&sql)
            .bind(id)
            .bind(restaurant_id)
            .bind(reason)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn check_in(
        &self,
        restaurant_id: i64,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET status = 'inProgress', check_in_at = $3, updated_at = NOW()
            WHERE id = $1 AND restaurant_id = $2 AND status = 'scheduled'
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let booking = sqlx::query_as::<_, TableBooking>(&sql)
            .bind(id)
            .bind(restaurant_id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// 直接改写起止时间与状态（测试辅助）
    pub async fn update_temp(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Result<Option<TableBooking>> {
        let sql = format!(
            r#"
            UPDATE bookings
            SET start_date_time = $2, end_date_time = $3, status = $4, updated_at = NOW()
            WHERE id = $1 AND is_deleted = false
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let booking = sqlx::query_as::<_, TableBooking>(&sql)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    // ==================== 批量扫描 ====================

    pub async fn cancel_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            WITH due AS (
                SELECT id FROM bookings
                WHERE status = 'scheduled' AND is_deleted = false
                  AND end_date_time < $1
                  AND ($2::bigint IS NULL OR restaurant_id = $2)
                ORDER BY id
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            UPDATE bookings
            SET status = 'cancelled', cancel_by = 'admin', cancel_reason = $4,
                cancel_at = $1, updated_at = NOW()
            FROM due
            WHERE bookings.id = due.id AND bookings.status = 'scheduled'
            "#,
        )
        .bind(now)
        .bind(restaurant_id)
        .bind(batch_size)
        .bind(SYSTEM_CANCEL_REASON)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn complete_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            WITH due AS (
                SELECT id FROM bookings
                WHERE status = 'inProgress' AND is_deleted = false
                  AND end_date_time < $1
                  AND ($2::bigint IS NULL OR restaurant_id = $2)
                ORDER BY id
                LIMIT $3
                FOR UPDATE SKIP LOCKED
            )
            UPDATE bookings
            SET status = 'completed', updated_at = NOW()
            FROM due
            WHERE bookings.id = due.id AND bookings.status = 'inProgress'
            "#,
        )
        .bind(now)
        .bind(restaurant_id)
        .bind(batch_size)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TableBookingRepositoryTrait for TableBookingRepository {
    async fn find_for_restaurant(&self, restaurant_id: i64, id: i64) -> Result<Option<TableBooking>> {
        self.find_for_restaurant(restaurant_id, id).await
    }

    async fn count_tab(&self, restaurant_id: i64, tab: TableTab, now: DateTime<Utc>) -> Result<i64> {
        self.count_tab(restaurant_id, tab, now).await
    }

    async fn list_tab(
        &self,
        restaurant_id: i64,
        tab: TableTab,
        now: DateTime<Utc>,
        page: Page,
    ) -> Result<Vec<TableBooking>> {
        self.list_tab(restaurant_id, tab, now, page).await
    }

    async fn cancel(
        &self,
        restaurant_id: i64,
        id: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>> {
        self.cancel(restaurant_id, id, reason, now).await
    }

    async fn check_in(
        &self,
        restaurant_id: i64,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<TableBooking>> {
        self.check_in(restaurant_id, id, now).await
    }

    async fn update_temp(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Result<Option<TableBooking>> {
        self.update_temp(id, start, end, status).await
    }

    async fn cancel_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        self.cancel_overdue(restaurant_id, now, batch_size).await
    }

    async fn complete_overdue(
        &self,
        restaurant_id: Option<i64>,
        now: DateTime<Utc>,
        batch_size: i64,
    ) -> Result<u64> {
        self.complete_overdue(restaurant_id, now, batch_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_clauses() {
        let (filter, order) = tab_clause(TableTab::Scheduled);
        assert!(filter.contains("end_date_time > $2"));
        assert_eq!(order, "start_date_time ASC");

        let (filter, _) = tab_clause(TableTab::Completed);
        assert!(filter.contains("NOT IN ('cancelled', 'scheduled')"));

        // 除待到店外，其余分栏按创建顺序倒序
        for tab in [TableTab::InProgress, TableTab::Completed, TableTab::Cancelled] {
            assert_eq!(tab_clause(tab).1, "id DESC", "{tab:?}");
        }

        // 每个分栏都引用 $2，绑定参数个数保持一致
        for tab in [
            TableTab::Scheduled,
            TableTab::InProgress,
            TableTab::Completed,
            TableTab::Cancelled,
        ] {
            assert!(tab_clause(tab).0.contains("$2"));
        }
    }
}
