//! 商家仓储
//!
//! 商家档案、休闲类档案、营业时段以及附近商家检索

use async_trait::async_trait;
use sqlx::PgPool;

use super::geo::haversine_km;
use super::traits::ProducerRepositoryTrait;
use crate::error::Result;
use crate::models::{NearbyProducer, NearbyQuery, Producer, Slot};

const PRODUCER_COLUMNS: &str = r#"
    id, user_id, name, producer_type, address, city, country,
    latitude, longitude, is_active, is_deleted, created_at
"#;

/// 商家仓储
pub struct ProducerRepository {
    pool: PgPool,
}

impl ProducerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 商家档案 ====================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Producer>> {
        let sql = format!("SELECT {PRODUCER_COLUMNS} FROM producers WHERE id = $1");
        let producer = sqlx::query_as::<_, Producer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(producer)
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Producer>> {
        let sql = format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE user_id = $1 AND is_deleted = false"
        );
        let producer = sqlx::query_as::<_, Producer>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(producer)
    }

    pub async fn find_leisure_profile_id(&self, producer_id: i64) -> Result<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM leisure_profiles WHERE producer_id = $1")
                .bind(producer_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(id,)| id))
    }

    // ==================== 营业时段 ====================

    pub async fn list_slots(&self, user_id: i64) -> Result<Vec<Slot>> {
        let slots = sqlx::query_as::<_, Slot>(
            r#"
            SELECT id, user_id, day, start_time, end_time
            FROM slots
            WHERE user_id = $1
            ORDER BY start_time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slots)
    }

    pub async fn find_slot(&self, slot_id: i64) -> Result<Option<Slot>> {
        let slot = sqlx::query_as::<_, Slot>(
            "SELECT id, user_id, day, start_time, end_time FROM slots WHERE id = $1",
        )
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(slot)
    }

    // ==================== 附近商家 ====================

    /// 附近商家子查询：$1 纬度、$2 经度、$3 关键字、$4 类型、$5 半径（米）
    fn nearby_source() -> String {
        let distance_m = format!(
            "{} * 1000",
            haversine_km("p.latitude", "p.longitude", "$1", "$2")
        );
        format!(
            r#"
            SELECT p.id, p.name, p.producer_type, p.latitude, p.longitude, p.address,
                   u.profile_image_url AS profile_image,
                   {distance_m} AS distance
            FROM producers p
            JOIN users u ON u.id = p.user_id
            WHERE p.is_active = true AND p.is_deleted = false
              AND u.is_active = true AND u.is_deleted = false
              AND p.latitude IS NOT NULL AND p.longitude IS NOT NULL
              AND ($3::text IS NULL OR p.name ILIKE '%' || $3 || '%')
              AND ($4::varchar IS NULL OR p.producer_type = $4)
            "#
        )
    }

    pub async fn count_nearby(&self, query: &NearbyQuery) -> Result<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM ({}) nearby WHERE distance <= $5",
            Self::nearby_source()
        );
        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(query.latitude)
            .bind(query.longitude)
            .bind(query.keyword.as_deref())
            .bind(query.producer_type)
            .bind(query.radius_m)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn list_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyProducer>> {
        let sql = format!(
            "SELECT * FROM ({}) nearby WHERE distance <= $5 \
             ORDER BY distance ASC LIMIT $6 OFFSET $7",
            Self::nearby_source()
        );
        let producers = sqlx::query_as::<_, NearbyProducer>(&sql)
            .bind(query.latitude)
            .bind(query.longitude)
            .bind(query.keyword.as_deref())
            .bind(query.producer_type)
            .bind(query.radius_m)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(producers)
    }
}

#[async_trait]
impl ProducerRepositoryTrait for ProducerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Producer>> {
        self.find_by_id(id).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Producer>> {
        self.find_by_user_id(user_id).await
    }

    async fn find_leisure_profile_id(&self, producer_id: i64) -> Result<Option<i64>> {
        self.find_leisure_profile_id(producer_id).await
    }

    async fn list_slots(&self, user_id: i64) -> Result<Vec<Slot>> {
        self.list_slots(user_id).await
    }

    async fn find_slot(&self, slot_id: i64) -> Result<Option<Slot>> {
        self.find_slot(slot_id).await
    }

    async fn count_nearby(&self, query: &NearbyQuery) -> Result<i64> {
        self.count_nearby(query).await
    }

    async fn list_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyProducer>> {
        self.list_nearby(query).await
    }
}
