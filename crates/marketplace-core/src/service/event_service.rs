//! 活动服务
//!
//! 商家发布与维护活动，用户浏览活动与附近商家

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::{CoreError, Result};
use crate::models::{
    Event, EventDetail, EventFilter, EventPatch, EventStatus, EventType, NearbyQuery, NewEvent,
    Page, Producer, ProducerType,
};
use crate::repository::{EventRepositoryTrait, ProducerRepositoryTrait, UserRepositoryTrait};
use crate::service::dto::{
    EventDeleted, EventDraft, NearbyProducerPage, NearbySearch, ProducerEvents,
};
use crate::time::parse_zone;

/// 附近商家默认搜索半径（米）
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 10_000.0;

/// 估算到达时间使用的平均车速（km/h）
const AVERAGE_SPEED_KMH: f64 = 30.0;

const MAX_IMAGES: usize = 9;
const MAX_DESCRIPTION: usize = 1000;

/// 只有这两类商家的账号只能看到自己的活动
const SCOPED_ROLES: [&str; 2] = ["restaurant", "leisure"];

/// 活动服务
pub struct EventService<U, P, E>
where
    U: UserRepositoryTrait,
    P: ProducerRepositoryTrait,
    E: EventRepositoryTrait,
{
    users: Arc<U>,
    producers: Arc<P>,
    events: Arc<E>,
}

impl<U, P, E> EventService<U, P, E>
where
    U: UserRepositoryTrait,
    P: ProducerRepositoryTrait,
    E: EventRepositoryTrait,
{
    pub fn new(users: Arc<U>, producers: Arc<P>, events: Arc<E>) -> Self {
        Self {
            users,
            producers,
            events,
        }
    }

    async fn producer_of(&self, user_id: i64) -> Result<Producer> {
        self.producers
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Producer not found"))
    }

    pub async fn event_types(&self) -> Result<Vec<EventType>> {
        self.events.list_event_types().await
    }

    /// 发布活动
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_event(&self, user_id: i64, draft: EventDraft) -> Result<Event> {
        let producer = self.producer_of(user_id).await?;
        if !producer.producer_type.can_host_events() {
            return Err(CoreError::bad_request(
                "Only leisure and restaurant producers can create events",
            ));
        }

        let mut leisure_id = None;
        if producer.producer_type == ProducerType::Leisure {
            let event_type_id = draft.event_type_id.ok_or_else(|| {
                CoreError::bad_request("Event type is required for Leisure events")
            })?;
            leisure_id = Some(
                self.producers
                    .find_leisure_profile_id(producer.id)
                    .await?
                    .ok_or_else(|| {
                        CoreError::not_found("Leisure record not found for this producer")
                    })?,
            );
            if self.events.find_event_type(event_type_id).await?.is_none() {
                return Err(CoreError::not_found("Invalid Event Type provided"));
            }
        }

        let time_zone = normalize_zone(draft.time_zone.as_deref())?;
        validate_fields(&FieldCheck {
            title: Some(&draft.title),
            description: draft.description.as_deref(),
            location: Some(&draft.location),
            price_per_guest: Some(draft.price_per_guest),
            max_capacity: Some(draft.max_capacity),
            images: Some(&draft.images),
        })?;

        let event = self
            .events
            .create(&NewEvent {
                producer_id: producer.id,
                leisure_id,
                event_type_id: draft.event_type_id,
                title: draft.title,
                description: draft.description,
                experience_type: draft.experience_type,
                location: draft.location,
                latitude: draft.latitude,
                longitude: draft.longitude,
                date: draft.date,
                start_time: draft.start_time,
                end_time: draft.end_time,
                time_zone,
                price_per_guest: draft.price_per_guest,
                max_capacity: draft.max_capacity,
                images: draft.images,
                status: draft.status,
            })
            .await?;

        info!(event_id = event.id, producer_id = producer.id, "活动已创建");
        Ok(event)
    }

    /// 当前商家的活动
    pub async fn my_events(&self, user_id: i64, status: Option<EventStatus>) -> Result<Vec<Event>> {
        let producer = self.producer_of(user_id).await?;
        self.events.list_by_producer(producer.id, status).await
    }

    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.events.list(filter).await
    }

    /// 活动详情
    ///
    /// 餐厅与休闲类商家只能查看自己的活动
    #[instrument(skip(self))]
    pub async fn get_event(&self, user_id: i64, event_id: i64) -> Result<EventDetail> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        let event = if SCOPED_ROLES.contains(&user.role_name.as_str()) {
            let producer = self.producer_of(user.id).await?;
            self.events.find_owned(event_id, producer.id).await?
        } else {
            self.events
                .find_by_id(event_id)
                .await?
                .filter(|e| !e.is_deleted)
        }
        .ok_or_else(|| CoreError::not_found("Event not found"))?;

        let total_participants = self.events.booked_guests(event.id).await?;
        Ok(EventDetail {
            event,
            total_participants,
        })
    }

    /// 某商家对外展示的活动
    #[instrument(skip(self))]
    pub async fn events_by_producer(&self, producer_id: i64) -> Result<ProducerEvents> {
        let producer = self
            .producers
            .find_by_id(producer_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Producer not found."))?;

        let events = match producer.producer_type {
            ProducerType::Restaurant => self.events.list_by_producer(producer.id, None).await?,
            ProducerType::Leisure => {
                let leisure_id = self
                    .producers
                    .find_leisure_profile_id(producer.id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Leisure profile not found."))?;
                self.events.list_by_leisure(leisure_id).await?
            }
            ProducerType::Wellness => Vec::new(),
        };

        Ok(ProducerEvents {
            producer_id: producer.id,
            producer_type: producer.producer_type,
            total_events: events.len(),
            events,
        })
    }

    /// 部分更新活动
    #[instrument(skip(self, patch))]
    pub async fn update_event(
        &self,
        user_id: i64,
        event_id: i64,
        mut patch: EventPatch,
    ) -> Result<Event> {
        let producer = self.producer_of(user_id).await?;
        self.events
            .find_owned(event_id, producer.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Event not found"))?;

        if let Some(zone) = patch.time_zone.take() {
            patch.time_zone = Some(normalize_zone(Some(&zone))?);
        }
        validate_fields(&FieldCheck {
            title: patch.title.as_deref(),
            description: patch.description.as_deref(),
            location: patch.location.as_deref(),
            price_per_guest: patch.price_per_guest,
            max_capacity: patch.max_capacity,
            images: patch.images.as_deref(),
        })?;

        let event = self
            .events
            .update(event_id, &patch)
            .await?
            .ok_or_else(|| CoreError::not_found("Event not found"))?;

        info!(event_id, producer_id = producer.id, "活动已更新");
        Ok(event)
    }

    /// 软删除活动
    #[instrument(skip(self))]
    pub async fn delete_event(&self, user_id: i64, event_id: i64) -> Result<EventDeleted> {
        let producer = self.producer_of(user_id).await?;
        self.events
            .find_owned(event_id, producer.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Event not found"))?;

        if !self.events.soft_delete(event_id).await? {
            return Err(CoreError::not_found("Event not found"));
        }

        info!(event_id, producer_id = producer.id, "活动已删除");
        Ok(EventDeleted {
            success: true,
            event_id,
        })
    }

    /// 附近商家，按距离升序分页
    #[instrument(skip(self, search))]
    pub async fn nearby_producers(
        &self,
        user_id: i64,
        search: NearbySearch,
    ) -> Result<NearbyProducerPage> {
        let (Some(latitude), Some(longitude)) = (search.latitude, search.longitude) else {
            return Err(CoreError::bad_request("Latitude and Longitude are required."));
        };

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        let page = Page::new(search.page, search.limit);
        let query = NearbyQuery {
            latitude,
            longitude,
            radius_m: search.radius_m.unwrap_or(DEFAULT_NEARBY_RADIUS_M),
            keyword: search
                .keyword
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            producer_type: search.producer_type,
            limit: page.limit,
            offset: page.offset(),
        };

        let total = self.producers.count_nearby(&query).await?;
        let mut producers = self.producers.list_nearby(&query).await?;
        for producer in &mut producers {
            producer.eta_in_minutes = eta_minutes(producer.distance);
        }

        Ok(NearbyProducerPage {
            producers,
            total_producers: total,
            current_page: page.page,
            total_pages: page.total_pages(total),
        })
    }
}

/// 按平均车速估算到达分钟数
fn eta_minutes(distance_m: f64) -> i64 {
    (distance_m / 1000.0 / AVERAGE_SPEED_KMH * 60.0).round() as i64
}

/// 空白时区回退 UTC，其余必须是合法的 IANA 名称
fn normalize_zone(zone: Option<&str>) -> Result<String> {
    match zone.map(str::trim).filter(|z| !z.is_empty()) {
        None => Ok("UTC".to_string()),
        Some(zone) => {
            parse_zone(zone)?;
            Ok(zone.to_string())
        }
    }
}

/// 待校验的字段，None 表示本次不涉及
struct FieldCheck<'a> {
    title: Option<&'a str>,
    description: Option<&'a str>,
    location: Option<&'a str>,
    price_per_guest: Option<Decimal>,
    max_capacity: Option<i32>,
    images: Option<&'a [String]>,
}

fn validate_fields(check: &FieldCheck<'_>) -> Result<()> {
    if check.title.is_some_and(|t| t.trim().chars().count() < 3) {
        return Err(CoreError::validation("title must be at least 3 characters"));
    }
    if check
        .description
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION)
    {
        return Err(CoreError::validation(
            "description must be at most 1000 characters",
        ));
    }
    if check.location.is_some_and(|l| l.trim().chars().count() < 3) {
        return Err(CoreError::validation(
            "location must be at least 3 characters",
        ));
    }
    if check.price_per_guest.is_some_and(|p| p < Decimal::ZERO) {
        return Err(CoreError::validation("pricePerGuest must not be negative"));
    }
    if check.max_capacity.is_some_and(|c| c < 1) {
        return Err(CoreError::validation("maxCapacity must be at least 1"));
    }
    if let Some(images) = check.images {
        if images.len() > MAX_IMAGES {
            return Err(CoreError::validation("at most 9 images are allowed"));
        }
        if images.iter().any(|i| i.trim().is_empty()) {
            return Err(CoreError::validation("image urls must not be empty"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NearbyProducer, User};
    use crate::repository::{
        MockEventRepositoryTrait, MockProducerRepositoryTrait, MockUserRepositoryTrait,
    };
    use chrono::{NaiveDate, NaiveTime, Utc};
    use marketplace_shared::test_utils::TestDataGenerator;

    const OWNER: i64 = 3;
    const PRODUCER_ID: i64 = 30;

    fn create_test_producer(producer_type: ProducerType) -> Producer {
        Producer {
            id: PRODUCER_ID,
            user_id: OWNER,
            name: "Chez Nous".to_string(),
            producer_type,
            address: None,
            city: Some("Lyon".to_string()),
            country: Some("France".to_string()),
            latitude: Some(45.76),
            longitude: Some(4.83),
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    fn create_test_user(role: &str) -> User {
        User {
            id: OWNER,
            email: TestDataGenerator::email(),
            full_name: Some(TestDataGenerator::full_name()),
            password_hash: None,
            role_id: 2,
            role_name: role.to_string(),
            is_active: true,
            is_deleted: false,
            latitude: None,
            longitude: None,
            profile_image_url: None,
            created_at: Utc::now(),
        }
    }

    fn create_test_draft() -> EventDraft {
        EventDraft {
            event_type_id: Some(2),
            title: "Wine tasting".to_string(),
            description: Some(TestDataGenerator::sentence()),
            experience_type: "food".to_string(),
            location: "Cellar".to_string(),
            latitude: None,
            longitude: None,
            date: TestDataGenerator::date_in(7),
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            time_zone: None,
            price_per_guest: Decimal::new(30, 0),
            max_capacity: 20,
            images: vec!["https://img.example.com/1.png".to_string()],
            status: EventStatus::Active,
        }
    }

    fn create_test_event(id: i64, new: &NewEvent) -> Event {
        Event {
            id,
            producer_id: new.producer_id,
            leisure_id: new.leisure_id,
            event_type_id: new.event_type_id,
            title: new.title.clone(),
            description: new.description.clone(),
            experience_type: new.experience_type.clone(),
            location: new.location.clone(),
            latitude: new.latitude,
            longitude: new.longitude,
            date: new.date,
            start_time: new.start_time,
            end_time: new.end_time,
            time_zone: new.time_zone.clone(),
            price_per_guest: new.price_per_guest,
            max_capacity: new.max_capacity,
            images: new.images.clone(),
            status: new.status,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_event(id: i64) -> Event {
        let new = NewEvent {
            producer_id: PRODUCER_ID,
            leisure_id: None,
            event_type_id: None,
            title: "Brunch".to_string(),
            description: None,
            experience_type: "food".to_string(),
            location: "Terrace".to_string(),
            latitude: None,
            longitude: None,
            date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            time_zone: "UTC".to_string(),
            price_per_guest: Decimal::ZERO,
            max_capacity: 10,
            images: vec![],
            status: EventStatus::Active,
        };
        create_test_event(id, &new)
    }

    fn producers_with(producer_type: ProducerType) -> MockProducerRepositoryTrait {
        let mut producers = MockProducerRepositoryTrait::new();
        producers
            .expect_find_by_user_id()
            .returning(move |_| Ok(Some(create_test_producer(producer_type))));
        producers
            .expect_find_by_id()
            .returning(move |_| Ok(Some(create_test_producer(producer_type))));
        producers
    }

    fn service(
        users: MockUserRepositoryTrait,
        producers: MockProducerRepositoryTrait,
        events: MockEventRepositoryTrait,
    ) -> EventService<MockUserRepositoryTrait, MockProducerRepositoryTrait, MockEventRepositoryTrait>
    {
        EventService::new(Arc::new(users), Arc::new(producers), Arc::new(events))
    }

    // ==================== 发布 ====================

    #[tokio::test]
    async fn test_restaurant_creates_event_with_utc_default() {
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_event_type().times(0);
        events
            .expect_create()
            .withf(|e| e.time_zone == "UTC" && e.leisure_id.is_none() && e.producer_id == PRODUCER_ID)
            .times(1)
            .returning(|e| Ok(create_test_event(1, e)));

        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        let event = svc.create_event(OWNER, create_test_draft()).await.unwrap();
        assert_eq!(event.time_zone, "UTC");
    }

    #[tokio::test]
    async fn test_leisure_event_links_profile() {
        let mut producers = producers_with(ProducerType::Leisure);
        producers
            .expect_find_leisure_profile_id()
            .returning(|_| Ok(Some(77)));
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_event_type().returning(|id| {
            Ok(Some(EventType {
                id,
                name: "Theatre".to_string(),
            }))
        });
        events
            .expect_create()
            .withf(|e| e.leisure_id == Some(77) && e.time_zone == "Europe/Paris")
            .returning(|e| Ok(create_test_event(2, e)));

        let svc = service(MockUserRepositoryTrait::new(), producers, events);
        let mut draft = create_test_draft();
        draft.time_zone = Some(" Europe/Paris ".to_string());
        assert!(svc.create_event(OWNER, draft).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_event_rejections() {
        // 健康类商家不能发布活动
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Wellness),
            MockEventRepositoryTrait::new(),
        );
        let err = svc.create_event(OWNER, create_test_draft()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only leisure and restaurant producers can create events"
        );

        // 休闲类缺少活动类型
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Leisure),
            MockEventRepositoryTrait::new(),
        );
        let mut draft = create_test_draft();
        draft.event_type_id = None;
        let err = svc.create_event(OWNER, draft).await.unwrap_err();
        assert_eq!(err.to_string(), "Event type is required for Leisure events");

        // 休闲档案缺失
        let mut producers = producers_with(ProducerType::Leisure);
        producers
            .expect_find_leisure_profile_id()
            .returning(|_| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers,
            MockEventRepositoryTrait::new(),
        );
        let err = svc.create_event(OWNER, create_test_draft()).await.unwrap_err();
        assert_eq!(err.to_string(), "Leisure record not found for this producer");

        // 活动类型不存在
        let mut producers = producers_with(ProducerType::Leisure);
        producers
            .expect_find_leisure_profile_id()
            .returning(|_| Ok(Some(1)));
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_event_type().returning(|_| Ok(None));
        let svc = service(MockUserRepositoryTrait::new(), producers, events);
        let err = svc.create_event(OWNER, create_test_draft()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid Event Type provided");
    }

    #[tokio::test]
    async fn test_create_event_missing_producer() {
        let mut producers = MockProducerRepositoryTrait::new();
        producers.expect_find_by_user_id().returning(|_| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers,
            MockEventRepositoryTrait::new(),
        );
        let err = svc.create_event(OWNER, create_test_draft()).await.unwrap_err();
        assert_eq!(err.to_string(), "Producer not found");
    }

    #[tokio::test]
    async fn test_create_event_invalid_zone() {
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            MockEventRepositoryTrait::new(),
        );
        let mut draft = create_test_draft();
        draft.time_zone = Some("Atlantis/Capital".to_string());
        let err = svc.create_event(OWNER, draft).await.unwrap_err();
        assert!(matches!(err, CoreError::BadRequest(_)));
    }

    #[test]
    fn test_field_validation() {
        let long = "x".repeat(1001);
        let ten_images: Vec<String> = (0..10).map(|i| format!("img{i}")).collect();
        let blank_image = vec![" ".to_string()];
        assert!(validate_fields(&empty_check()).is_ok());

        let cases = [
            FieldCheck { title: Some("ab"), ..empty_check() },
            FieldCheck { description: Some(&long), ..empty_check() },
            FieldCheck { location: Some("x"), ..empty_check() },
            FieldCheck { price_per_guest: Some(Decimal::new(-1, 0)), ..empty_check() },
            FieldCheck { max_capacity: Some(0), ..empty_check() },
            FieldCheck { images: Some(&ten_images), ..empty_check() },
            FieldCheck { images: Some(&blank_image), ..empty_check() },
        ];
        for check in cases {
            let err = validate_fields(&check).unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
    }

    fn empty_check() -> FieldCheck<'static> {
        FieldCheck {
            title: None,
            description: None,
            location: None,
            price_per_guest: None,
            max_capacity: None,
            images: None,
        }
    }

    // ==================== 查询 ====================

    #[tokio::test]
    async fn test_get_event_scoping() {
        // 普通用户可以看到任何未删除的活动
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_user("user"))));
        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_find_by_id()
            .returning(|id| Ok(Some(sample_event(id))));
        events.expect_find_owned().times(0);
        events.expect_booked_guests().returning(|_| Ok(4));

        let svc = service(users, MockProducerRepositoryTrait::new(), events);
        let detail = svc.get_event(OWNER, 9).await.unwrap();
        assert_eq!(detail.total_participants, 4);

        // 餐厅只能看到自己的活动
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_user("restaurant"))));
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_by_id().times(0);
        events
            .expect_find_owned()
            .withf(|id, producer| *id == 9 && *producer == PRODUCER_ID)
            .returning(|_, _| Ok(None));

        let svc = service(users, producers_with(ProducerType::Restaurant), events);
        let err = svc.get_event(OWNER, 9).await.unwrap_err();
        assert_eq!(err.to_string(), "Event not found");
    }

    #[tokio::test]
    async fn test_deleted_event_is_hidden() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_user("user"))));
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_by_id().returning(|id| {
            let mut event = sample_event(id);
            event.is_deleted = true;
            Ok(Some(event))
        });

        let svc = service(users, MockProducerRepositoryTrait::new(), events);
        assert!(matches!(
            svc.get_event(OWNER, 1).await.unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_events_by_producer_per_type() {
        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_list_by_producer()
            .withf(|id, status| *id == PRODUCER_ID && status.is_none())
            .returning(|_, _| Ok(vec![sample_event(1), sample_event(2)]));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        let result = svc.events_by_producer(PRODUCER_ID).await.unwrap();
        assert_eq!(result.total_events, 2);
        assert_eq!(result.producer_type, ProducerType::Restaurant);

        let mut producers = producers_with(ProducerType::Leisure);
        producers
            .expect_find_leisure_profile_id()
            .returning(|_| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers,
            MockEventRepositoryTrait::new(),
        );
        let err = svc.events_by_producer(PRODUCER_ID).await.unwrap_err();
        assert_eq!(err.to_string(), "Leisure profile not found.");

        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Wellness),
            MockEventRepositoryTrait::new(),
        );
        let result = svc.events_by_producer(PRODUCER_ID).await.unwrap();
        assert_eq!(result.total_events, 0);
    }

    // ==================== 修改与删除 ====================

    #[tokio::test]
    async fn test_update_event_validates_patch() {
        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_find_owned()
            .returning(|id, _| Ok(Some(sample_event(id))));
        events.expect_update().times(0);

        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        let patch = EventPatch {
            max_capacity: Some(0),
            ..Default::default()
        };
        let err = svc.update_event(OWNER, 1, patch).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_event_applies_patch() {
        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_find_owned()
            .returning(|id, _| Ok(Some(sample_event(id))));
        events
            .expect_update()
            .withf(|_, patch| patch.title.as_deref() == Some("Late brunch"))
            .returning(|id, patch| {
                let mut event = sample_event(id);
                event.title = patch.title.clone().unwrap_or_default();
                Ok(Some(event))
            });

        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        let patch = EventPatch {
            title: Some("Late brunch".to_string()),
            ..Default::default()
        };
        let event = svc.update_event(OWNER, 1, patch).await.unwrap();
        assert_eq!(event.title, "Late brunch");
    }

    #[tokio::test]
    async fn test_delete_event_requires_ownership() {
        let mut events = MockEventRepositoryTrait::new();
        events.expect_find_owned().returning(|_, _| Ok(None));
        events.expect_soft_delete().times(0);
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        assert!(svc.delete_event(OWNER, 5).await.is_err());

        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_find_owned()
            .returning(|id, _| Ok(Some(sample_event(id))));
        events.expect_soft_delete().times(1).returning(|_| Ok(true));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers_with(ProducerType::Restaurant),
            events,
        );
        let deleted = svc.delete_event(OWNER, 5).await.unwrap();
        assert!(deleted.success);
        assert_eq!(deleted.event_id, 5);
    }

    // ==================== 附近商家 ====================

    #[tokio::test]
    async fn test_nearby_requires_coordinates() {
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            MockEventRepositoryTrait::new(),
        );
        let search = NearbySearch {
            latitude: Some(48.85),
            ..Default::default()
        };
        let err = svc.nearby_producers(OWNER, search).await.unwrap_err();
        assert_eq!(err.to_string(), "Latitude and Longitude are required.");
    }

    #[tokio::test]
    async fn test_nearby_paginates_and_estimates_eta() {
        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_user("user"))));

        let mut producers = MockProducerRepositoryTrait::new();
        producers
            .expect_count_nearby()
            .withf(|q| q.radius_m == DEFAULT_NEARBY_RADIUS_M && q.keyword.as_deref() == Some("bar"))
            .returning(|_| Ok(25));
        producers
            .expect_list_nearby()
            .withf(|q| q.limit == 10 && q.offset == 10)
            .returning(|_| {
                Ok(vec![NearbyProducer {
                    id: 1,
                    name: "Bar du Coin".to_string(),
                    producer_type: ProducerType::Restaurant,
                    latitude: 48.86,
                    longitude: 2.35,
                    address: None,
                    profile_image: None,
                    distance: 7_500.0,
                    eta_in_minutes: 0,
                }])
            });

        let svc = service(users, producers, MockEventRepositoryTrait::new());
        let search = NearbySearch {
            latitude: Some(48.85),
            longitude: Some(2.35),
            keyword: Some(" bar ".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let page = svc.nearby_producers(OWNER, search).await.unwrap();

        assert_eq!(page.total_producers, 25);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        // 7.5 km / 30 km/h = 15 分钟
        assert_eq!(page.producers[0].eta_in_minutes, 15);
    }

    #[test]
    fn test_eta_rounding() {
        assert_eq!(eta_minutes(0.0), 0);
        assert_eq!(eta_minutes(1_000.0), 2);
        assert_eq!(eta_minutes(1_500.0), 3);
    }
}
