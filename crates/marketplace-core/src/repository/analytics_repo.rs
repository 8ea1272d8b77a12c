//! 看板与洞察聚合查询
//!
//! 只读仓储，全部为聚合 SQL；业务上的取整、格式化在服务层完成

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use super::geo::haversine_km;
use super::traits::AnalyticsRepositoryTrait;
use super::zone::event_local_to_utc;
use crate::error::Result;
use crate::models::{
    CategoryRating, ChosenDish, CustomerRating, DailyCount, DailyRating, DishRating, EngagedItem,
    EventTypeCount, LeisureRating, MenuCategory, MenuCoverage, NearbyUser, OverviewCounts, Page,
    PriceSplit, ProducerRating, ProducerType, ReferralBooking, RestaurantRating, UpcomingBooking,
    WellnessRating,
};

/// 各商家类型对应的评分表
fn rating_table(producer_type: ProducerType) -> &'static str {
    match producer_type {
        ProducerType::Restaurant => "restaurant_ratings",
        ProducerType::Wellness => "wellness_ratings",
        ProducerType::Leisure => "leisure_ratings",
    }
}

/// 看板聚合仓储
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 概览与用户分布 ====================

    pub async fn overview_counts(&self, producer_id: i64) -> Result<OverviewCounts> {
        let counts = sqlx::query_as::<_, OverviewCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM profile_view_logs WHERE producer_id = $1) AS profile_views,
                (SELECT COUNT(*) FROM interests WHERE producer_id = $1) AS interests,
                (SELECT COUNT(*) FROM posts
                    WHERE producer_id = $1 AND is_deleted = false AND status = 'public')
                    AS choices_made,
                (SELECT COUNT(*) FROM posts WHERE producer_id = $1 AND is_deleted = false)
                    AS posts,
                (SELECT COALESCE(SUM(COALESCE(likes_count, 0) + COALESCE(comment_count, 0)
                                     + COALESCE(share_count, 0)), 0)::bigint
                    FROM posts WHERE producer_id = $1 AND is_deleted = false) AS engagements
            "#,
        )
        .bind(producer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }

    pub async fn count_located_users(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM users WHERE latitude IS NOT NULL AND longitude IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    pub async fn nearby_users(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<NearbyUser>> {
        let distance = haversine_km("u.latitude", "u.longitude", "$1", "$2");
        let sql = format!(
            r#"
            SELECT * FROM (
                SELECT u.id, u.full_name, u.email, u.latitude, u.longitude,
                       {distance} AS distance_km
                FROM users u
                WHERE u.latitude IS NOT NULL AND u.longitude IS NOT NULL
            ) located
            WHERE distance_km <= $3
            ORDER BY distance_km ASC
            "#
        );
        let users = sqlx::query_as::<_, NearbyUser>(&sql)
            .bind(latitude)
            .bind(longitude)
            .bind(radius_km)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    // ==================== 趋势 ====================

    pub async fn daily_interests(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM interests
            WHERE producer_id = $1
              AND (created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(producer_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn daily_accepted_invites(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>> {
        let rows = sqlx::query_as::<_, DailyCount>(
            r#"
            SELECT (inv.created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM interest_invites inv
            JOIN interests i ON i.id = inv.interest_id
            WHERE i.producer_id = $1 AND inv.status = 'accepted'
              AND (inv.created_at AT TIME ZONE 'UTC')::date BETWEEN $2 AND $3
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(producer_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ==================== 评分 ====================

    /// 商家评分各项均值，没有任何评分记录时返回 None
    pub async fn producer_rating(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
    ) -> Result<Option<ProducerRating>> {
        let rating = match producer_type {
            ProducerType::Restaurant => sqlx::query_as::<_, RestaurantRating>(
                r#"
                SELECT AVG(service)::float8 AS service, AVG(place)::float8 AS place,
                       AVG(portions)::float8 AS portions, AVG(ambiance)::float8 AS ambiance,
                       AVG(overall)::float8 AS overall, MAX(updated_at) AS updated_at
                FROM restaurant_ratings
                WHERE producer_id = $1
                HAVING COUNT(*) > 0
                "#,
            )
            .bind(producer_id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProducerRating::Restaurant),

            ProducerType::Wellness => sqlx::query_as::<_, WellnessRating>(
                r#"
                SELECT AVG(care_quality)::float8 AS care_quality,
                       AVG(cleanliness)::float8 AS cleanliness,
                       AVG(welcome)::float8 AS welcome,
                       AVG(value_for_money)::float8 AS value_for_money,
                       AVG(atmosphere)::float8 AS atmosphere,
                       AVG(staff_experience)::float8 AS staff_experience,
                       AVG(overall)::float8 AS overall, MAX(updated_at) AS updated_at
                FROM wellness_ratings
                WHERE producer_id = $1
                HAVING COUNT(*) > 0
                "#,
            )
            .bind(producer_id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProducerRating::Wellness),

            ProducerType::Leisure => sqlx::query_as::<_, LeisureRating>(
                r#"
                SELECT AVG(stage_direction)::float8 AS stage_direction,
                       AVG(actor_performance)::float8 AS actor_performance,
                       AVG(text_quality)::float8 AS text_quality,
                       AVG(scenography)::float8 AS scenography,
                       AVG(overall)::float8 AS overall, MAX(updated_at) AS updated_at
                FROM leisure_ratings
                WHERE producer_id = $1
                HAVING COUNT(*) > 0
                "#,
            )
            .bind(producer_id)
            .fetch_optional(&self.pool)
            .await?
            .map(ProducerRating::Leisure),
        };

        Ok(rating)
    }

    /// 区间 [from, to) 内的综合评分均值
    pub async fn average_overall_between(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let sql = format!(
            "SELECT AVG(overall)::float8 FROM {} \
             WHERE producer_id = $1 AND created_at >= $2 AND created_at < $3",
            rating_table(producer_type)
        );
        let (average,): (Option<f64>,) = sqlx::query_as(&sql)
            .bind(producer_id)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await?;

        Ok(average)
    }

    // ==================== 活动 ====================

    pub async fn event_price_split(&self, producer_id: i64) -> Result<PriceSplit> {
        let split = sqlx::query_as::<_, PriceSplit>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN e.price_per_guest = 0 THEN 1 ELSE 0 END), 0)::bigint
                    AS free,
                COALESCE(SUM(CASE WHEN e.price_per_guest > 0 AND e.price_per_guest <= 50
                                  THEN 1 ELSE 0 END), 0)::bigint AS discount,
                COALESCE(SUM(CASE WHEN e.price_per_guest > 50 THEN 1 ELSE 0 END), 0)::bigint
                    AS full
            FROM interests i
            JOIN events e ON e.id = i.event_id
            WHERE i.producer_id = $1
            "#,
        )
        .bind(producer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(split)
    }

    pub async fn top_event_types(&self, producer_id: i64, limit: i64) -> Result<Vec<EventTypeCount>> {
        let rows = sqlx::query_as::<_, EventTypeCount>(
            r#"
            SELECT t.name AS event_type, COUNT(i.id) AS interest_count
            FROM interests i
            JOIN events e ON e.id = i.event_id
            JOIN event_types t ON t.id = e.event_type_id
            WHERE i.producer_id = $1
            GROUP BY t.name
            ORDER BY interest_count DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ==================== 菜单 ====================

    pub async fn category_ratings(&self, producer_id: i64) -> Result<Vec<CategoryRating>> {
        let rows = sqlx::query_as::<_, CategoryRating>(
            r#"
            SELECT c.id AS category_id, c.name AS category_name,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.id) AS total_ratings
            FROM dish_ratings r
            JOIN menu_dishes d ON d.id = r.dish_id
            JOIN menu_categories c ON c.id = d.menu_category_id
            WHERE c.producer_id = $1
            GROUP BY c.id, c.name
            ORDER BY average_rating DESC
            "#,
        )
        .bind(producer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn dish_ratings(
        &self,
        producer_id: i64,
        category_id: Option<i64>,
    ) -> Result<Vec<DishRating>> {
        let rows = sqlx::query_as::<_, DishRating>(
            r#"
            SELECT d.id AS dish_id, d.name AS dish_name,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.id) AS total_ratings
            FROM dish_ratings r
            JOIN menu_dishes d ON d.id = r.dish_id
            JOIN menu_categories c ON c.id = d.menu_category_id
            WHERE c.producer_id = $1
              AND ($2::bigint IS NULL OR c.id = $2)
            GROUP BY d.id, d.name
            ORDER BY average_rating DESC
            "#,
        )
        .bind(producer_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_categories(&self, producer_id: i64, search: Option<String>) -> Result<i64> {
        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM menu_categories
            WHERE producer_id = $1
              AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
            "#,
        )
        .bind(producer_id)
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    pub async fn list_categories(
        &self,
        producer_id: i64,
        search: Option<String>,
        include_counts: bool,
        page: Page,
    ) -> Result<Vec<MenuCategory>> {
        let rows = sqlx::query_as::<_, MenuCategory>(
            r#"
            SELECT c.id, c.name,
                   CASE WHEN $3 THEN
                       (SELECT COUNT(*) FROM menu_dishes d WHERE d.menu_category_id = c.id)
                   END AS dish_count
            FROM menu_categories c
            WHERE c.producer_id = $1
              AND ($2::text IS NULL OR c.name ILIKE '%' || $2 || '%')
            ORDER BY c.name ASC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(producer_id)
        .bind(search)
        .bind(include_counts)
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn menu_coverage(&self, producer_id: i64) -> Result<MenuCoverage> {
        let coverage = sqlx::query_as::<_, MenuCoverage>(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT d.id)
                    FROM menu_dishes d
                    JOIN menu_categories c ON c.id = d.menu_category_id
                    WHERE c.producer_id = $1) AS total_dishes,
                (SELECT COUNT(DISTINCT r.dish_id)
                    FROM dish_ratings r
                    JOIN menu_dishes d ON d.id = r.dish_id
                    JOIN menu_categories c ON c.id = d.menu_category_id
                    WHERE c.producer_id = $1) AS rated_dishes
            "#,
        )
        .bind(producer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(coverage)
    }

    /// 评分次数最多的菜品
    pub async fn most_chosen_dish(&self, producer_id: i64) -> Result<Option<ChosenDish>> {
        let dish = sqlx::query_as::<_, ChosenDish>(
            r#"
            SELECT d.name, COUNT(r.id) AS chosen_count
            FROM dish_ratings r
            JOIN menu_dishes d ON d.id = r.dish_id
            JOIN menu_categories c ON c.id = d.menu_category_id
            WHERE c.producer_id = $1
            GROUP BY d.id, d.name
            ORDER BY chosen_count DESC
            LIMIT 1
            "#,
        )
        .bind(producer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(dish)
    }

    pub async fn daily_dish_ratings(
        &self,
        producer_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyRating>> {
        let rows = sqlx::query_as::<_, DailyRating>(
            r#"
            SELECT (r.created_at AT TIME ZONE 'UTC')::date AS day,
                   ROUND(AVG(r.rating)::numeric, 1)::float8 AS average_rating,
                   COUNT(r.id) AS total_ratings
            FROM dish_ratings r
            JOIN menu_dishes d ON d.id = r.dish_id
            JOIN menu_categories c ON c.id = d.menu_category_id
            WHERE c.producer_id = $1 AND r.created_at >= $2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(producer_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ==================== 洞察 ====================

    pub async fn top_posts(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        let rows = sqlx::query_as::<_, EngagedItem>(
            r#"
            SELECT 'post' AS item_type, p.id, p.description AS title,
                   NULL::float8 AS avg_rating, NULL::bigint AS total_ratings,
                   (COALESCE(s.total_likes, 0) + COALESCE(s.total_shares, 0)
                    + COALESCE(s.total_comments, 0) + COALESCE(s.total_ratings, 0))::float8
                       AS engagement_score
            FROM posts p
            JOIN post_statistics s ON s.post_id = p.id
            WHERE p.producer_id = $1 AND p.is_deleted = false
            ORDER BY engagement_score DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn top_dishes(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        let rows = sqlx::query_as::<_, EngagedItem>(
            r#"
            SELECT 'dish' AS item_type, d.id, d.name AS title,
                   AVG(r.rating)::float8 AS avg_rating, COUNT(r.id) AS total_ratings,
                   (COUNT(r.id) * AVG(r.rating))::float8 AS engagement_score
            FROM dish_ratings r
            JOIN menu_dishes d ON d.id = r.dish_id
            JOIN menu_categories c ON c.id = d.menu_category_id
            WHERE c.producer_id = $1
            GROUP BY d.id, d.name
            ORDER BY engagement_score DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn top_events(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        let rows = sqlx::query_as::<_, EngagedItem>(
            r#"
            SELECT 'event' AS item_type, e.id, e.title,
                   AVG(r.rating)::float8 AS avg_rating, COUNT(r.id) AS total_ratings,
                   (COUNT(r.id) * AVG(r.rating))::float8 AS engagement_score
            FROM event_ratings r
            JOIN events e ON e.id = r.event_id
            WHERE e.producer_id = $1 AND e.is_deleted = false
            GROUP BY e.id, e.title
            ORDER BY engagement_score DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn upcoming_table_bookings(
        &self,
        producer_id: i64,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>> {
        let rows = sqlx::query_as::<_, UpcomingBooking>(
            r#"
            SELECT b.id, COALESCE(u.full_name, b.customer_name, 'Unknown') AS user_name,
                   b.start_date_time AS start_date, b.status
            FROM bookings b
            JOIN producers p ON p.user_id = b.restaurant_id
            LEFT JOIN users u ON u.id = b.customer_id
            WHERE p.id = $1 AND b.is_deleted = false AND b.status <> 'cancelled'
              AND (b.start_date_time >= $2 OR b.booking_date >= ($2 AT TIME ZONE 'UTC')::date)
            ORDER BY b.start_date_time ASC
            LIMIT $3
            "#,
        )
        .bind(producer_id)
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn upcoming_event_bookings(
        &self,
        producer_id: i64,
        from: NaiveDate,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>> {
        let start_date = event_local_to_utc("e.date + e.start_time");
        let sql = format!(
            r#"
            SELECT eb.id, COALESCE(u.full_name, 'Unknown') AS user_name,
                   {start_date} AS start_date,
                   eb.status
            FROM event_bookings eb
            JOIN events e ON e.id = eb.event_id
            LEFT JOIN users u ON u.id = eb.user_id
            WHERE e.producer_id = $1 AND e.date >= $2 AND eb.status <> 'cancelled'
            ORDER BY start_date ASC
            LIMIT $3
            "#
        );
        let rows = sqlx::query_as::<_, UpcomingBooking>(&sql)
        .bind(producer_id)
        .bind(from)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 由好友邀请带来的订座：顾客接受过该商家意向的邀请，且邀请早于下单
    pub async fn table_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>> {
        let rows = sqlx::query_as::<_, ReferralBooking>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (b.id)
                       b.id AS booking_id, COALESCE(u.full_name, b.customer_name) AS customer_name,
                       i.user_id AS referrer_id, b.created_at AS booked_at
                FROM bookings b
                JOIN producers p ON p.user_id = b.restaurant_id
                JOIN interests i ON i.producer_id = p.id
                JOIN interest_invites inv
                     ON inv.interest_id = i.id AND inv.invited_user_id = b.customer_id
                LEFT JOIN users u ON u.id = b.customer_id
                WHERE p.id = $1 AND b.is_deleted = false
                  AND inv.status = 'accepted'
                  AND i.user_id <> b.customer_id
                  AND inv.created_at <= b.created_at
                ORDER BY b.id, inv.created_at DESC
            ) referred
            ORDER BY booked_at DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn event_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>> {
        let rows = sqlx::query_as::<_, ReferralBooking>(
            r#"
            SELECT * FROM (
                SELECT DISTINCT ON (eb.id)
                       eb.id AS booking_id, u.full_name AS customer_name,
                       i.user_id AS referrer_id, eb.created_at AS booked_at
                FROM event_bookings eb
                JOIN events e ON e.id = eb.event_id
                JOIN interests i ON i.event_id = e.id
                JOIN interest_invites inv
                     ON inv.interest_id = i.id AND inv.invited_user_id = eb.user_id
                LEFT JOIN users u ON u.id = eb.user_id
                WHERE e.producer_id = $1
                  AND inv.status = 'accepted'
                  AND i.user_id <> eb.user_id
                  AND inv.created_at <= eb.created_at
                ORDER BY eb.id, inv.created_at DESC
            ) referred
            ORDER BY booked_at DESC
            LIMIT $2
            "#,
        )
        .bind(producer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// 订座与活动预订评价中给出指定分数的顾客
    pub async fn customers_by_rating(
        &self,
        producer_id: i64,
        rating: i32,
        limit: i64,
    ) -> Result<Vec<CustomerRating>> {
        let rows = sqlx::query_as::<_, CustomerRating>(
            r#"
            SELECT * FROM (
                SELECT r.id AS rating_id, r.rating, b.customer_id AS user_id,
                       COALESCE(u.full_name, b.customer_name, 'Unknown') AS user_name,
                       r.comment, r.created_at AS date
                FROM reviews r
                JOIN bookings b ON b.id = r.booking_id
                JOIN producers p ON p.user_id = b.restaurant_id
                LEFT JOIN users u ON u.id = b.customer_id
                WHERE p.id = $1 AND r.rating = $2
                UNION ALL
                SELECT r.id AS rating_id, r.rating, eb.user_id,
                       COALESCE(u.full_name, 'Unknown') AS user_name,
                       r.comment, r.created_at AS date
                FROM reviews r
                JOIN event_bookings eb ON eb.id = r.event_booking_id
                JOIN events e ON e.id = eb.event_id
                LEFT JOIN users u ON u.id = eb.user_id
                WHERE e.producer_id = $1 AND r.rating = $2
            ) rated
            ORDER BY date DESC
            LIMIT $3
            "#,
        )
        .bind(producer_id)
        .bind(rating)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl AnalyticsRepositoryTrait for AnalyticsRepository {
    async fn overview_counts(&self, producer_id: i64) -> Result<OverviewCounts> {
        self.overview_counts(producer_id).await
    }

    async fn count_located_users(&self) -> Result<i64> {
        self.count_located_users().await
    }

    async fn nearby_users(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<NearbyUser>> {
        self.nearby_users(latitude, longitude, radius_km).await
    }

    async fn daily_interests(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>> {
        self.daily_interests(producer_id, from, to).await
    }

    async fn daily_accepted_invites(
        &self,
        producer_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyCount>> {
        self.daily_accepted_invites(producer_id, from, to).await
    }

    async fn producer_rating(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
    ) -> Result<Option<ProducerRating>> {
        self.producer_rating(producer_id, producer_type).await
    }

    async fn average_overall_between(
        &self,
        producer_id: i64,
        producer_type: ProducerType,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        self.average_overall_between(producer_id, producer_type, from, to)
            .await
    }

    async fn event_price_split(&self, producer_id: i64) -> Result<PriceSplit> {
        self.event_price_split(producer_id).await
    }

    async fn top_event_types(&self, producer_id: i64, limit: i64) -> Result<Vec<EventTypeCount>> {
        self.top_event_types(producer_id, limit).await
    }

    async fn category_ratings(&self, producer_id: i64) -> Result<Vec<CategoryRating>> {
        self.category_ratings(producer_id).await
    }

    async fn dish_ratings(
        &self,
        producer_id: i64,
        category_id: Option<i64>,
    ) -> Result<Vec<DishRating>> {
        self.dish_ratings(producer_id, category_id).await
    }

    async fn count_categories(&self, producer_id: i64, search: Option<String>) -> Result<i64> {
        self.count_categories(producer_id, search).await
    }

    async fn list_categories(
        &self,
        producer_id: i64,
        search: Option<String>,
        include_counts: bool,
        page: Page,
    ) -> Result<Vec<MenuCategory>> {
        self.list_categories(producer_id, search, include_counts, page)
            .await
    }

    async fn menu_coverage(&self, producer_id: i64) -> Result<MenuCoverage> {
        self.menu_coverage(producer_id).await
    }

    async fn most_chosen_dish(&self, producer_id: i64) -> Result<Option<ChosenDish>> {
        self.most_chosen_dish(producer_id).await
    }

    async fn daily_dish_ratings(
        &self,
        producer_id: i64,
        since: DateTime<Utc>,
    ) -> Result<Vec<DailyRating>> {
        self.daily_dish_ratings(producer_id, since).await
    }

    async fn top_posts(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        self.top_posts(producer_id, limit).await
    }

    async fn top_dishes(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        self.top_dishes(producer_id, limit).await
    }

    async fn top_events(&self, producer_id: i64, limit: i64) -> Result<Vec<EngagedItem>> {
        self.top_events(producer_id, limit).await
    }

    async fn upcoming_table_bookings(
        &self,
        producer_id: i64,
        from: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>> {
        self.upcoming_table_bookings(producer_id, from, limit).await
    }

    async fn upcoming_event_bookings(
        &self,
        producer_id: i64,
        from: NaiveDate,
        limit: i64,
    ) -> Result<Vec<UpcomingBooking>> {
        self.upcoming_event_bookings(producer_id, from, limit).await
    }

    async fn table_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>> {
        self.table_referrals(producer_id, limit).await
    }

    async fn event_referrals(&self, producer_id: i64, limit: i64) -> Result<Vec<ReferralBooking>> {
        self.event_referrals(producer_id, limit).await
    }

    async fn customers_by_rating(
        &self,
        producer_id: i64,
        rating: i32,
        limit: i64,
    ) -> Result<Vec<CustomerRating>> {
        self.customers_by_rating(producer_id, rating, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_table_per_type() {
        assert_eq!(rating_table(ProducerType::Restaurant), "restaurant_ratings");
        assert_eq!(rating_table(ProducerType::Wellness), "wellness_ratings");
        assert_eq!(rating_table(ProducerType::Leisure), "leisure_ratings");
    }
}
