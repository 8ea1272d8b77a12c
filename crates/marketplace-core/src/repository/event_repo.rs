//! 活动仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::geo::haversine_km;
use super::traits::EventRepositoryTrait;
use crate::error::Result;
use crate::models::{Event, EventFilter, EventPatch, EventStatus, EventType, NewEvent};

const EVENT_COLUMNS: &str = r#"
    e.id, e.producer_id, e.leisure_id, e.event_type_id, e.title, e.description,
    e.experience_type, e.location, e.latitude, e.longitude, e.date, e.start_time,
    e.end_time, e.time_zone, e.price_per_guest, e.max_capacity, e.images, e.status,
    e.is_active, e.is_deleted, e.created_at, e.updated_at
"#;

/// 活动仓储
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 活动类型 ====================

    pub async fn list_event_types(&self) -> Result<Vec<EventType>> {
        let types =
            sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(types)
    }

    pub async fn find_event_type(&self, id: i64) -> Result<Option<EventType>> {
        let event_type =
            sqlx::query_as::<_, EventType>("SELECT id, name FROM event_types WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(event_type)
    }

    // ==================== 查询操作 ====================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    pub async fn find_owned(&self, id: i64, producer_id: i64) -> Result<Option<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.id = $1 AND e.producer_id = $2 AND e.is_deleted = false"
        );
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(producer_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    pub async fn list_by_producer(
        &self,
        producer_id: i64,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.producer_id = $1 AND e.is_deleted = false \
               AND ($2::varchar IS NULL OR e.status = $2) \
             ORDER BY e.date DESC, e.start_time DESC"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(producer_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    pub async fn list_by_leisure(&self, leisure_id: i64) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events e \
             WHERE e.leisure_id = $1 AND e.is_deleted = false \
             ORDER BY e.date DESC, e.start_time DESC"
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(leisure_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// 按条件列出活动
    ///
    /// 经纬度和半径三者齐全时才按距离过滤
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let distance = haversine_km("e.latitude", "e.longitude", "$4", "$5");
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events e
            LEFT JOIN event_types t ON t.id = e.event_type_id
            WHERE e.is_deleted = false
              AND ($1::varchar IS NULL OR e.status = $1)
              AND ($2::text IS NULL OR e.experience_type = $2)
              AND ($3::text IS NULL OR t.name = $3)
              AND ($6::float8 IS NULL OR (
                    e.latitude IS NOT NULL AND e.longitude IS NOT NULL
                    AND {distance} <= $6))
            ORDER BY e.date ASC, e.start_time ASC
            "#
        );

        let geo = filter.geo();
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(filter.status)
            .bind(filter.category.as_deref())
            .bind(filter.event_type.as_deref())
            .bind(geo.map(|(lat, _, _)| lat))
            .bind(geo.map(|(_, lng, _)| lng))
            .bind(geo.map(|(_, _, radius)| radius))
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    /// 未取消预订的人数合计
    pub async fn booked_guests(&self, event_id: i64) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(number_of_persons), 0)::bigint
            FROM event_bookings
            WHERE event_id = $1 AND status <> 'cancelled'
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // ==================== 写入操作 ====================

    pub async fn create(&self, event: &NewEvent) -> Result<Event> {
        let sql = format!(
            r#"
            INSERT INTO events AS e (
                producer_id, leisure_id, event_type_id, title, description, experience_type,
                location, latitude, longitude, date, start_time, end_time, time_zone,
                price_per_guest, max_capacity, images, status, is_active, is_deleted,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    true, false, NOW(), NOW())
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let created = sqlx::query_as::<_, Event>(&sql)
            .bind(event.producer_id)
            .bind(event.leisure_id)
            .bind(event.event_type_id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.experience_type)
            .bind(&event.location)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(event.date)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(&event.time_zone)
            .bind(event.price_per_guest)
            .bind(event.max_capacity)
            .bind(&event.images)
            .bind(event.status)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// 部分更新，未提供的字段保持原值
    pub async fn update(&self, id: i64, patch: &EventPatch) -> Result<Option<Event>> {
        let sql = format!(
            r#"
            UPDATE events AS e SET
                title = COALESCE($2, e.title),
                description = COALESCE($3, e.description),
                experience_type = COALESCE($4, e.experience_type),
                location = COALESCE($5, e.location),
                latitude = COALESCE($6, e.latitude),
                longitude = COALESCE($7, e.longitude),
                date = COALESCE($8, e.date),
                start_time = COALESCE($9, e.start_time),
                end_time = COALESCE($10, e.end_time),
                time_zone = COALESCE($11, e.time_zone),
                price_per_guest = COALESCE($12, e.price_per_guest),
                max_capacity = COALESCE($13, e.max_capacity),
                images = COALESCE($14, e.images),
                status = COALESCE($15, e.status),
                updated_at = NOW()
            WHERE e.id = $1 AND e.is_deleted = false
            RETURNING {EVENT_COLUMNS}
            "#
        );
        let updated = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(&patch.experience_type)
            .bind(&patch.location)
            .bind(patch.latitude)
            .bind(patch.longitude)
            .bind(patch.date)
            .bind(patch.start_time)
            .bind(patch.end_time)
            .bind(&patch.time_zone)
            .bind(patch.price_per_guest)
            .bind(patch.max_capacity)
            .bind(&patch.images)
            .bind(patch.status)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    pub async fn soft_delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE events SET is_deleted = true, updated_at = NOW() \
             WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn list_event_types(&self) -> Result<Vec<EventType>> {
        self.list_event_types().await
    }

    async fn find_event_type(&self, id: i64) -> Result<Option<EventType>> {
        self.find_event_type(id).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        self.find_by_id(id).await
    }

    async fn find_owned(&self, id: i64, producer_id: i64) -> Result<Option<Event>> {
        self.find_owned(id, producer_id).await
    }

    async fn list_by_producer(
        &self,
        producer_id: i64,
        status: Option<EventStatus>,
    ) -> Result<Vec<Event>> {
        self.list_by_producer(producer_id, status).await
    }

    async fn list_by_leisure(&self, leisure_id: i64) -> Result<Vec<Event>> {
        self.list_by_leisure(leisure_id).await
    }

    async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.list(filter).await
    }

    async fn create(&self, event: &NewEvent) -> Result<Event> {
        self.create(event).await
    }

    async fn update(&self, id: i64, patch: &EventPatch) -> Result<Option<Event>> {
        self.update(id, patch).await
    }

    async fn soft_delete(&self, id: i64) -> Result<bool> {
        self.soft_delete(id).await
    }

    async fn booked_guests(&self, event_id: i64) -> Result<i64> {
        self.booked_guests(event_id).await
    }
}
