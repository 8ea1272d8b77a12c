//! 商家看板服务
//!
//! 所有查询都先由调用方的用户 ID 解析出商家档案，再做聚合统计。
//! 百分比与平均值的格式化规则与既有前端约定保持一致。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use tracing::instrument;

use crate::error::{CoreError, Result};
use crate::models::{
    DailyCount, DishGrouping, Page, Producer, ProducerRating, TrendMetric,
};
use crate::repository::{AnalyticsRepositoryTrait, ProducerRepositoryTrait};
use crate::service::dto::{
    CategoryPage, CategoryQuery, CategoryRatingView, Criterion, DailyRatingPoint,
    DishDropAlerts, DishRatingView, DishRatings, EventInsights, LabelValue, MapSummary,
    MenuCoverageView, MenuOverview, MostChosenDish, NearbyUserView, Overview, Pagination,
    Ratings, TopEvent, TrendPoint, TrendSummary, Trends, UserInsights,
};

/// 「附近用户」的半径（公里）
pub const NEARBY_RADIUS_KM: u32 = 20;

const SERIES_DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const DEFAULT_CATEGORY_LIMIT: i64 = 20;
const DEFAULT_ALERT_DAYS: u32 = 7;
const MAX_ALERT_DAYS: u32 = 90;

/// 保留一位小数
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 分母为 0 时输出 "0%"，否则保留一位小数
fn ratio_text(numerator: f64, denominator: f64) -> String {
    if denominator == 0.0 {
        "0%".to_string()
    } else {
        format!("{:.1}%", numerator / denominator)
    }
}

/// 商家看板服务
pub struct DashboardService<P, A>
where
    P: ProducerRepositoryTrait,
    A: AnalyticsRepositoryTrait,
{
    producers: Arc<P>,
    analytics: Arc<A>,
}

impl<P, A> DashboardService<P, A>
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

    async fn producer(&self, user_id: i64) -> Result<Producer> {
        self.producers
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Producer not found."))
    }

    /// 概览：浏览量、意向数、选择数与转化率
    #[instrument(skip(self))]
    pub async fn overview(&self, user_id: i64) -> Result<Overview> {
        let producer = self.producer(user_id).await?;
        let counts = self.analytics.overview_counts(producer.id).await?;

        Ok(Overview {
            profile_views: counts.profile_views,
            number_of_interests: counts.interests,
            choices_made: counts.choices_made,
            conversion_rate: ratio_text(
                counts.choices_made as f64 * 100.0,
                counts.interests as f64,
            ),
            post_conversion_rate: ratio_text(counts.engagements as f64, counts.posts as f64),
        })
    }

    /// 商家周边的用户分布
    #[instrument(skip(self))]
    pub async fn user_insights(&self, user_id: i64) -> Result<UserInsights> {
        let producer = self.producer(user_id).await?;
        let (Some(latitude), Some(longitude)) = (producer.latitude, producer.longitude) else {
            return Err(CoreError::not_found("Producer location not found."));
        };

        let total_local_users = self.analytics.count_located_users().await?;
        let nearby = self
            .analytics
            .nearby_users(latitude, longitude, f64::from(NEARBY_RADIUS_KM))
            .await?;

        let nearby_user_percentage = if total_local_users == 0 {
            "0%".to_string()
        } else {
            format!(
                "{:.1}%",
                nearby.len() as f64 / total_local_users as f64 * 100.0
            )
        };

        Ok(UserInsights {
            map_summary: MapSummary {
                producer_name: producer.name,
                city: producer.city.unwrap_or_else(|| "N/A".to_string()),
                country: producer.country.unwrap_or_else(|| "N/A".to_string()),
                nearby_user_percentage,
                total_nearby_users: nearby.len(),
                total_local_users,
                radius_km: NEARBY_RADIUS_KM,
            },
            nearby_users: nearby
                .into_iter()
                .map(|u| NearbyUserView {
                    id: u.id,
                    full_name: u.full_name,
                    email: u.email,
                    latitude: u.latitude,
                    longitude: u.longitude,
                    distance_km: format!("{:.2}", u.distance_km),
                })
                .collect(),
        })
    }

    /// 本周与上周的趋势对比
    #[instrument(skip(self))]
    pub async fn trends(
        &self,
        user_id: i64,
        metric: TrendMetric,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Trends> {
        let producer = self.producer(user_id).await?;

        let end = to.unwrap_or_else(|| Utc::now().date_naive());
        let start = from.unwrap_or(end - Duration::days(6));
        if start > end {
            return Err(CoreError::validation("from must not be after to"));
        }
        let last_start = start - Duration::days(7);
        let last_end = start - Duration::days(1);

        let (current, previous) = match metric {
            TrendMetric::Interests | TrendMetric::Choices => (
                self.analytics.daily_interests(producer.id, start, end).await?,
                self.analytics
                    .daily_interests(producer.id, last_start, last_end)
                    .await?,
            ),
            TrendMetric::ChoicesMade => (
                self.analytics
                    .daily_accepted_invites(producer.id, start, end)
                    .await?,
                self.analytics
                    .daily_accepted_invites(producer.id, last_start, last_end)
                    .await?,
            ),
        };

        let total: i64 = current.iter().map(|d| d.count).sum();
        let last_week_total: i64 = previous.iter().map(|d| d.count).sum();
        let change_percent = change_percent(total, last_week_total);

        Ok(Trends {
            metric,
            from: start,
            to: end,
            summary: TrendSummary {
                total,
                last_week_total,
                change_percent,
                comparison_text: comparison_text(metric, change_percent),
            },
            series: weekday_series(&current),
        })
    }

    /// 按商家类型展示的评分
    #[instrument(skip(self))]
    pub async fn ratings(&self, user_id: i64) -> Result<Ratings> {
        let producer = self.producer(user_id).await?;
        let rating = self
            .analytics
            .producer_rating(producer.id, producer.producer_type)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(format!(
                    "{} ratings not found.",
                    producer.producer_type.label()
                ))
            })?;

        let (average, criteria) = match rating {
            ProducerRating::Restaurant(r) => (
                r.overall,
                vec![
                    ("Service", r.service),
                    ("Place", r.place),
                    ("Portions", r.portions),
                    ("Ambiance", r.ambiance),
                ],
            ),
            ProducerRating::Wellness(r) => (
                r.overall,
                vec![
                    ("Cleanliness", r.cleanliness),
                    ("Staff Expertise", r.staff_experience),
                    ("Ambiance", r.atmosphere),
                    ("Value for Money", r.value_for_money),
                ],
            ),
            ProducerRating::Leisure(r) => (
                r.overall,
                vec![
                    ("Stage Direction", r.stage_direction),
                    ("Actor Performance", r.actor_performance),
                    ("Scenography", r.scenography),
                ],
            ),
        };

        Ok(Ratings {
            producer_type: producer.producer_type,
            average: round1(average),
            criteria: criteria
                .into_iter()
                .map(|(label, value)| Criterion {
                    label,
                    value: round1(value),
                })
                .collect(),
        })
    }

    /// 活动意向的票价分布与表现最好的活动类型
    #[instrument(skip(self))]
    pub async fn event_insights(&self, user_id: i64) -> Result<EventInsights> {
        let producer = self.producer(user_id).await?;
        let split = self.analytics.event_price_split(producer.id).await?;
        let top = self.analytics.top_event_types(producer.id, 2).await?;

        let top_event = match top.as_slice() {
            [] => TopEvent {
                event_type: "N/A".to_string(),
                description: "No data available".to_string(),
            },
            [only] => TopEvent {
                event_type: only.event_type.clone(),
                description: format!("{} is performing best", only.event_type),
            },
            [first, second, ..] => {
                let multiplier = if second.interest_count == 0 {
                    "—".to_string()
                } else {
                    format!(
                        "{:.1}",
                        first.interest_count as f64 / second.interest_count as f64
                    )
                };
                TopEvent {
                    event_type: first.event_type.clone(),
                    description: format!(
                        "{} = {}x more Choices than {}",
                        first.event_type, multiplier, second.event_type
                    ),
                }
            }
        };

        Ok(EventInsights {
            price_split: vec![
                LabelValue {
                    label: "Free",
                    value: split.free,
                },
                LabelValue {
                    label: "Discount",
                    value: split.discount,
                },
                LabelValue {
                    label: "Full Price",
                    value: split.full,
                },
            ],
            top_event,
        })
    }

    /// 菜品评分，按分类或按单品聚合
    #[instrument(skip(self))]
    pub async fn dish_ratings(
        &self,
        user_id: i64,
        grouping: DishGrouping,
        category_id: Option<i64>,
    ) -> Result<DishRatings> {
        let producer = self.producer(user_id).await?;

        match grouping {
            DishGrouping::Category => {
                let ratings: Vec<CategoryRatingView> = self
                    .analytics
                    .category_ratings(producer.id)
                    .await?
                    .into_iter()
                    .map(|r| CategoryRatingView {
                        category_id: r.category_id,
                        category_name: r
                            .category_name
                            .unwrap_or_else(|| "Uncategorized".to_string()),
                        average_rating: round1(r.average_rating),
                        total_ratings: r.total_ratings,
                    })
                    .collect();
                Ok(DishRatings::Category {
                    total_categories: ratings.len(),
                    ratings,
                })
            }
            DishGrouping::Dish => {
                let ratings: Vec<DishRatingView> = self
                    .analytics
                    .dish_ratings(producer.id, category_id)
                    .await?
                    .into_iter()
                    .map(|r| DishRatingView {
                        dish_id: r.dish_id,
                        dish_name: r.dish_name.unwrap_or_else(|| "Unnamed Dish".to_string()),
                        average_rating: round1(r.average_rating),
                        total_ratings: r.total_ratings,
                    })
                    .collect();
                Ok(DishRatings::Dish {
                    category_id,
                    total_dishes: ratings.len(),
                    ratings,
                })
            }
        }
    }

    /// 菜单分类分页
    #[instrument(skip(self, query))]
    pub async fn categories(&self, user_id: i64, query: CategoryQuery) -> Result<CategoryPage> {
        let producer = self.producer(user_id).await?;
        let page = Page::with_default_limit(query.page, query.limit, DEFAULT_CATEGORY_LIMIT);
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let total = self
            .analytics
            .count_categories(producer.id, search.clone())
            .await?;
        let categories = self
            .analytics
            .list_categories(producer.id, search, query.include_counts, page)
            .await?;

        Ok(CategoryPage {
            categories,
            pagination: Pagination {
                total,
                page: page.page,
                limit: page.limit,
                total_pages: page.total_pages(total),
            },
        })
    }

    /// 菜单评分覆盖率与被选最多的菜品
    #[instrument(skip(self))]
    pub async fn menu_overview(&self, user_id: i64) -> Result<MenuOverview> {
        let producer = self.producer(user_id).await?;
        let coverage = self.analytics.menu_coverage(producer.id).await?;
        let chosen = self.analytics.most_chosen_dish(producer.id).await?;

        let rated_percentage = if coverage.total_dishes == 0 {
            0
        } else {
            (coverage.rated_dishes as f64 / coverage.total_dishes as f64 * 100.0).round() as i64
        };

        Ok(MenuOverview {
            menu_coverage: MenuCoverageView {
                total_dishes: coverage.total_dishes,
                rated_dishes: coverage.rated_dishes,
                not_rated_dishes: coverage.total_dishes - coverage.rated_dishes,
                rated_percentage,
            },
            most_chosen_dish: MostChosenDish {
                name: chosen.as_ref().and_then(|c| c.name.clone()),
                chosen_count: chosen.map_or(0, |c| c.chosen_count),
                time_frame: "this week",
            },
        })
    }

    /// 最近若干天的每日菜品评分，缺失的日期补零
    #[instrument(skip(self))]
    pub async fn dish_drop_alerts(&self, user_id: i64, days: Option<u32>) -> Result<DishDropAlerts> {
        let days = days.unwrap_or(DEFAULT_ALERT_DAYS);
        if !(1..=MAX_ALERT_DAYS).contains(&days) {
            return Err(CoreError::validation("days must be between 1 and 90"));
        }

        let producer = self.producer(user_id).await?;
        let start = Utc::now().date_naive() - Duration::days(i64::from(days) - 1);
        let since = start.and_time(NaiveTime::MIN).and_utc();

        let by_day: HashMap<NaiveDate, (f64, i64)> = self
            .analytics
            .daily_dish_ratings(producer.id, since)
            .await?
            .into_iter()
            .map(|r| (r.day, (r.average_rating, r.total_ratings)))
            .collect();

        let trend = (0..days)
            .map(|i| {
                let date = start + Duration::days(i64::from(i));
                let (average, total) = by_day.get(&date).copied().unwrap_or((0.0, 0));
                DailyRatingPoint {
                    day: format!("Day {}", i + 1),
                    date,
                    average_rating: round1(average),
                    total_ratings: total,
                }
            })
            .collect();

        Ok(DishDropAlerts {
            time_frame: format!("last {days} days"),
            trend,
        })
    }
}

fn change_percent(current: i64, last: i64) -> f64 {
    if last == 0 {
        if current > 0 { 100.0 } else { 0.0 }
    } else {
        round1((current - last) as f64 / last as f64 * 100.0)
    }
}

fn comparison_text(metric: TrendMetric, change: f64) -> String {
    if change >= 0.0 {
        format!(
            "Your {} increased by {:.1}% this week.",
            metric.as_str(),
            change
        )
    } else {
        format!(
            "Your {} decreased by {:.1}% this week.",
            metric.as_str(),
            change.abs()
        )
    }
}

/// 按星期汇总，周一在前
fn weekday_series(days: &[DailyCount]) -> Vec<TrendPoint> {
    let mut totals = [0i64; 7];
    for d in days {
        totals[d.day.weekday().num_days_from_monday() as usize] += d.count;
    }
    SERIES_DAYS
        .iter()
        .zip(totals)
        .map(|(day, value)| TrendPoint { day, value })
        .collect()
}
