//! 意向与邀请服务
//!
//! 用户对商家或活动表达意向并邀请好友，受邀人可以接受、拒绝或提议新时间。
//! 全部受邀人接受后意向变为 Confirmed，全部拒绝后变为 Declined。

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::error::{CoreError, Result};
use crate::models::{
    Interest, InterestInvite, InterestStatus, InterestType, InterestWithInvites, InviteResponse,
    InviteStatus, NewInterest, Slot,
};
use crate::repository::{
    EventRepositoryTrait, InterestRepositoryTrait, ProducerRepositoryTrait, UserRepositoryTrait,
};
use crate::service::dto::{DaySlots, InterestDraft};

const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const MAX_DECLINE_REASON: usize = 300;

/// 意向服务
pub struct InterestService<U, P, E, I>
where
    U: UserRepositoryTrait,
    P: ProducerRepositoryTrait,
    E: EventRepositoryTrait,
    I: InterestRepositoryTrait,
{
    users: Arc<U>,
    producers: Arc<P>,
    events: Arc<E>,
    interests: Arc<I>,
}

impl<U, P, E, I> InterestService<U, P, E, I>
where
    U: UserRepositoryTrait,
    P: ProducerRepositoryTrait,
    E: EventRepositoryTrait,
    I: InterestRepositoryTrait,
{
    pub fn new(users: Arc<U>, producers: Arc<P>, events: Arc<E>, interests: Arc<I>) -> Self {
        Self {
            users,
            producers,
            events,
            interests,
        }
    }

    // ==================== 意向 ====================

    /// 创建意向并发出邀请
    #[instrument(skip(self, draft), fields(interest_type = ?draft.interest_type))]
    pub async fn create_interest(
        &self,
        user_id: i64,
        draft: InterestDraft,
    ) -> Result<InterestWithInvites> {
        let new_interest = match draft.interest_type {
            InterestType::Producer => {
                let producer_id = draft.producer_id.ok_or_else(|| {
                    CoreError::bad_request("producerId is required for Producer type")
                })?;
                let producer = self
                    .producers
                    .find_by_id(producer_id)
                    .await?
                    .ok_or_else(|| CoreError::not_found("Producer not found"))?;

                let suggested_time = match draft.slot_id {
                    Some(slot_id) => {
                        let slot = self
                            .producers
                            .find_slot(slot_id)
                            .await?
                            .ok_or_else(|| CoreError::not_found("Slot not found"))?;
                        Some(slot_instant(&slot, draft.suggested_time.unwrap_or_else(Utc::now)))
                    }
                    None => draft.suggested_time,
                };

                NewInterest {
                    user_id,
                    interest_type: InterestType::Producer,
                    producer_id: Some(producer.id),
                    event_id: None,
                    slot_id: draft.slot_id,
                    suggested_time,
                    message: draft.message,
                }
            }
            InterestType::Event => {
                let event_id = draft
                    .event_id
                    .ok_or_else(|| CoreError::bad_request("eventId is required for Event type"))?;
                let event = self
                    .events
                    .find_by_id(event_id)
                    .await?
                    .filter(|e| !e.is_deleted)
                    .ok_or_else(|| CoreError::not_found("Event not found"))?;

                NewInterest {
                    user_id,
                    interest_type: InterestType::Event,
                    producer_id: None,
                    event_id: Some(event.id),
                    slot_id: None,
                    suggested_time: draft.suggested_time,
                    message: draft.message,
                }
            }
        };

        let interest = self.interests.create(&new_interest).await?;

        // 去重并排除创建者本人，只邀请真实存在的用户
        let candidates: Vec<i64> = draft
            .invited_user_ids
            .into_iter()
            .filter(|id| *id != user_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let invitees = if candidates.is_empty() {
            Vec::new()
        } else {
            self.users.existing_ids(&candidates).await?
        };
        let invites = self.interests.add_invites(interest.id, &invitees).await?;

        info!(
            interest_id = interest.id,
            user_id,
            invites = invites.len(),
            "意向已创建"
        );
        Ok(InterestWithInvites { interest, invites })
    }

    /// 当前用户创建的意向
    pub async fn user_interests(&self, user_id: i64) -> Result<Vec<InterestWithInvites>> {
        let interests = self.interests.list_by_user(user_id).await?;
        self.attach_invites(interests).await
    }

    /// 当前用户被邀请参与的意向
    pub async fn invited(&self, user_id: i64) -> Result<Vec<InterestWithInvites>> {
        let interests = self.interests.list_invited(user_id).await?;
        self.attach_invites(interests).await
    }

    pub async fn interest_details(
        &self,
        user_id: i64,
        interest_id: i64,
    ) -> Result<InterestWithInvites> {
        let interest = self
            .interests
            .find_for_user(user_id, interest_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Interest not found"))?;
        let invites = self.interests.invites_for(&[interest.id]).await?;
        Ok(InterestWithInvites { interest, invites })
    }

    /// 商家营业时段，按周一到周日分组
    pub async fn producer_slots(&self, producer_user_id: i64) -> Result<Vec<DaySlots>> {
        let slots = self.producers.list_slots(producer_user_id).await?;
        Ok(group_by_weekday(slots))
    }

    // ==================== 邀请答复 ====================

    /// 接受邀请
    #[instrument(skip(self))]
    pub async fn accept(&self, user_id: i64, interest_id: i64) -> Result<InterestInvite> {
        let invite = self.invite_for(user_id, interest_id).await?;
        if invite.status != InviteStatus::Pending {
            return Err(CoreError::bad_request(format!(
                "You cannot accept an invite that is already {}.",
                invite.status
            )));
        }

        let updated = self
            .interests
            .update_invite(
                invite.id,
                &InviteResponse {
                    status: InviteStatus::Accepted,
                    ..Default::default()
                },
            )
            .await?;

        self.settle_interest(interest_id, InviteStatus::Accepted, InterestStatus::Confirmed)
            .await?;
        info!(interest_id, user_id, "邀请已接受");
        Ok(updated)
    }

    /// 拒绝邀请
    #[instrument(skip(self, reason))]
    pub async fn decline(
        &self,
        user_id: i64,
        interest_id: i64,
        reason: Option<String>,
    ) -> Result<InterestInvite> {
        if let Some(reason) = &reason {
            let len = reason.trim().chars().count();
            if len == 0 || len > MAX_DECLINE_REASON {
                return Err(CoreError::validation(
                    "reason must be between 1 and 300 characters",
                ));
            }
        }

        let invite = self.invite_for(user_id, interest_id).await?;
        if matches!(invite.status, InviteStatus::Accepted | InviteStatus::Declined) {
            return Err(CoreError::bad_request(format!(
                "You cannot decline an invite that is already {}.",
                invite.status
            )));
        }

        let updated = self
            .interests
            .update_invite(
                invite.id,
                &InviteResponse {
                    status: InviteStatus::Declined,
                    decline_reason: reason,
                    ..Default::default()
                },
            )
            .await?;

        self.settle_interest(interest_id, InviteStatus::Declined, InterestStatus::Declined)
            .await?;
        info!(interest_id, user_id, "邀请已拒绝");
        Ok(updated)
    }

    /// 受邀人提议新的时间
    #[instrument(skip(self, message))]
    pub async fn suggest_new_time(
        &self,
        user_id: i64,
        interest_id: i64,
        slot_id: Option<i64>,
        suggested_time: Option<DateTime<Utc>>,
        message: Option<String>,
    ) -> Result<InterestInvite> {
        if slot_id.is_none() && suggested_time.is_none() {
            return Err(CoreError::validation(
                "Either slotId or suggestedTime is required",
            ));
        }

        let invite = self.invite_for(user_id, interest_id).await?;
        let not_linked = || CoreError::bad_request("This interest is not linked to a valid producer.");
        let producer_id = self
            .interests
            .find_by_id(interest_id)
            .await?
            .and_then(|i| i.producer_id)
            .ok_or_else(not_linked)?;
        let producer = self
            .producers
            .find_by_id(producer_id)
            .await?
            .ok_or_else(not_linked)?;

        if matches!(invite.status, InviteStatus::Accepted | InviteStatus::Declined) {
            return Err(CoreError::bad_request(format!(
                "You cannot suggest a new time for an invite that is already {}.",
                invite.status
            )));
        }

        if let Some(slot_id) = slot_id {
            let belongs = self
                .producers
                .find_slot(slot_id)
                .await?
                .is_some_and(|slot| slot.user_id == producer.user_id);
            if !belongs {
                return Err(CoreError::bad_request(
                    "Invalid slot: slot does not belong to this producer.",
                ));
            }
        }

        let updated = self
            .interests
            .update_invite(
                invite.id,
                &InviteResponse {
                    status: InviteStatus::SuggestedNewTime,
                    decline_reason: None,
                    suggested_slot_id: slot_id,
                    suggested_time,
                    suggested_message: message,
                },
            )
            .await?;

        info!(interest_id, user_id, "受邀人提议了新时间");
        Ok(updated)
    }

    /// 直接设置邀请状态，保留已有的答复内容
    #[instrument(skip(self))]
    pub async fn respond(
        &self,
        user_id: i64,
        interest_id: i64,
        status: InviteStatus,
    ) -> Result<InterestInvite> {
        let invite = self
            .interests
            .find_invite(interest_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Invite not found"))?;

        self.interests
            .update_invite(
                invite.id,
                &InviteResponse {
                    status,
                    decline_reason: invite.decline_reason,
                    suggested_slot_id: invite.suggested_slot_id,
                    suggested_time: invite.suggested_time,
                    suggested_message: invite.suggested_message,
                },
            )
            .await
    }

    // ==================== 内部辅助 ====================

    async fn invite_for(&self, user_id: i64, interest_id: i64) -> Result<InterestInvite> {
        self.interests
            .find_invite(interest_id, user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Invite not found for this user."))
    }

    /// 所有邀请都处于 `all` 状态时，把意向置为 `outcome`
    async fn settle_interest(
        &self,
        interest_id: i64,
        all: InviteStatus,
        outcome: InterestStatus,
    ) -> Result<()> {
        let invites = self.interests.invites_for(&[interest_id]).await?;
        if !invites.is_empty() && invites.iter().all(|i| i.status == all) {
            self.interests.set_status(interest_id, outcome).await?;
            info!(interest_id, status = ?outcome, "意向状态已更新");
        }
        Ok(())
    }

    async fn attach_invites(&self, interests: Vec<Interest>) -> Result<Vec<InterestWithInvites>> {
        let ids: Vec<i64> = interests.iter().map(|i| i.id).collect();
        let mut by_interest: HashMap<i64, Vec<InterestInvite>> = HashMap::new();
        for invite in self.interests.invites_for(&ids).await? {
            by_interest.entry(invite.interest_id).or_default().push(invite);
        }

        Ok(interests
            .into_iter()
            .map(|interest| {
                let invites = by_interest.remove(&interest.id).unwrap_or_default();
                InterestWithInvites { interest, invites }
            })
            .collect())
    }
}

/// 时段开始时间落在 `base` 的 UTC 日期上
fn slot_instant(slot: &Slot, base: DateTime<Utc>) -> DateTime<Utc> {
    base.date_naive().and_time(slot.start_time).and_utc()
}

/// 按星期分组，周一在前，组内按开始时间排序
fn group_by_weekday(mut slots: Vec<Slot>) -> Vec<DaySlots> {
    let rank = |day: &str| {
        WEEK_DAYS
            .iter()
            .position(|d| *d == day)
            .unwrap_or(WEEK_DAYS.len())
    };
    slots.sort_by(|a, b| {
        rank(&a.day)
            .cmp(&rank(&b.day))
            .then(a.start_time.cmp(&b.start_time))
    });

    let mut groups: Vec<DaySlots> = Vec::new();
    for slot in slots {
        match groups.last_mut() {
            Some(group) if group.day == slot.day => group.slots.push(slot),
            _ => groups.push(DaySlots {
                day: slot.day.clone(),
                slots: vec![slot],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Producer, ProducerType};
    use crate::repository::{
        MockEventRepositoryTrait, MockInterestRepositoryTrait, MockProducerRepositoryTrait,
        MockUserRepositoryTrait,
    };
    use chrono::{NaiveTime, TimeZone};
    use marketplace_shared::test_utils::TestDataGenerator;

    const CREATOR: i64 = 1;
    const GUEST: i64 = 2;
    const PRODUCER_ID: i64 = 50;
    const PRODUCER_OWNER: i64 = 500;

    fn create_test_producer() -> Producer {
        Producer {
            id: PRODUCER_ID,
            user_id: PRODUCER_OWNER,
            name: "Spa Zen".to_string(),
            producer_type: ProducerType::Wellness,
            address: None,
            city: None,
            country: None,
            latitude: None,
            longitude: None,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    fn create_test_slot(id: i64, user_id: i64, day: &str, hour: u32) -> Slot {
        Slot {
            id,
            user_id,
            day: day.to_string(),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
        }
    }

    fn create_test_interest(id: i64, producer_id: Option<i64>) -> Interest {
        Interest {
            id,
            user_id: CREATOR,
            interest_type: if producer_id.is_some() {
                InterestType::Producer
            } else {
                InterestType::Event
            },
            producer_id,
            event_id: None,
            slot_id: None,
            suggested_time: None,
            message: Some(TestDataGenerator::sentence()),
            status: InterestStatus::Pending,
            created_at: Utc::now(),
        }
    }

    fn create_test_invite(id: i64, interest_id: i64, user: i64, status: InviteStatus) -> InterestInvite {
        InterestInvite {
            id,
            interest_id,
            invited_user_id: user,
            status,
            decline_reason: None,
            suggested_slot_id: None,
            suggested_time: None,
            suggested_message: None,
            responded_at: None,
            created_at: Utc::now(),
        }
    }

    fn echo_update(interests: &mut MockInterestRepositoryTrait) {
        interests.expect_update_invite().returning(|id, response| {
            let mut invite = create_test_invite(id, 10, GUEST, response.status);
            invite.decline_reason = response.decline_reason.clone();
            invite.suggested_slot_id = response.suggested_slot_id;
            invite.suggested_time = response.suggested_time;
            invite.suggested_message = response.suggested_message.clone();
            invite.responded_at = Some(Utc::now());
            Ok(invite)
        });
    }

    fn service(
        users: MockUserRepositoryTrait,
        producers: MockProducerRepositoryTrait,
        interests: MockInterestRepositoryTrait,
    ) -> InterestService<
        MockUserRepositoryTrait,
        MockProducerRepositoryTrait,
        MockEventRepositoryTrait,
        MockInterestRepositoryTrait,
    > {
        InterestService::new(
            Arc::new(users),
            Arc::new(producers),
            Arc::new(MockEventRepositoryTrait::new()),
            Arc::new(interests),
        )
    }

    fn producer_draft() -> InterestDraft {
        InterestDraft {
            interest_type: InterestType::Producer,
            producer_id: Some(PRODUCER_ID),
            event_id: None,
            slot_id: None,
            suggested_time: None,
            message: None,
            invited_user_ids: vec![],
        }
    }

    // ==================== 创建 ====================

    #[tokio::test]
    async fn test_create_producer_interest_with_slot_and_invites() {
        let mut producers = MockProducerRepositoryTrait::new();
        producers
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_producer())));
        producers
            .expect_find_slot()
            .returning(|id| Ok(Some(create_test_slot(id, PRODUCER_OWNER, "Friday", 14))));

        let base = Utc.with_ymd_and_hms(2030, 3, 8, 9, 45, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2030, 3, 8, 14, 0, 0).unwrap();

        let mut users = MockUserRepositoryTrait::new();
        users
            .expect_existing_ids()
            .withf(|ids| ids == [2, 3, 4])
            .times(1)
            .returning(|_| Ok(vec![2, 3]));

        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_create()
            .withf(move |i| i.suggested_time == Some(expected) && i.slot_id == Some(9))
            .returning(|i| {
                let mut interest = create_test_interest(10, i.producer_id);
                interest.suggested_time = i.suggested_time;
                Ok(interest)
            });
        interests
            .expect_add_invites()
            .withf(|interest, ids| *interest == 10 && ids == [2, 3])
            .returning(|interest, ids| {
                Ok(ids
                    .iter()
                    .enumerate()
                    .map(|(n, id)| create_test_invite(n as i64, interest, *id, InviteStatus::Pending))
                    .collect())
            });

        let svc = service(users, producers, interests);
        let mut draft = producer_draft();
        draft.slot_id = Some(9);
        draft.suggested_time = Some(base);
        // 重复 ID 与创建者本人都会被剔除
        draft.invited_user_ids = vec![3, CREATOR, 2, 3, 4];

        let created = svc.create_interest(CREATOR, draft).await.unwrap();
        assert_eq!(created.interest.suggested_time, Some(expected));
        assert_eq!(created.invites.len(), 2);
    }

    #[tokio::test]
    async fn test_create_interest_rejections() {
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            MockInterestRepositoryTrait::new(),
        );
        let mut draft = producer_draft();
        draft.producer_id = None;
        let err = svc.create_interest(CREATOR, draft).await.unwrap_err();
        assert_eq!(err.to_string(), "producerId is required for Producer type");

        let draft = InterestDraft {
            interest_type: InterestType::Event,
            ..producer_draft()
        };
        let err = svc.create_interest(CREATOR, draft).await.unwrap_err();
        assert_eq!(err.to_string(), "eventId is required for Event type");

        let mut producers = MockProducerRepositoryTrait::new();
        producers
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_producer())));
        producers.expect_find_slot().returning(|_| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            producers,
            MockInterestRepositoryTrait::new(),
        );
        let mut draft = producer_draft();
        draft.slot_id = Some(1);
        let err = svc.create_interest(CREATOR, draft).await.unwrap_err();
        assert_eq!(err.to_string(), "Slot not found");
    }

    // ==================== 答复 ====================

    #[tokio::test]
    async fn test_accept_confirms_when_everyone_accepted() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_find_invite()
            .returning(|interest, user| Ok(Some(create_test_invite(7, interest, user, InviteStatus::Pending))));
        echo_update(&mut interests);
        interests.expect_invites_for().returning(|_| {
            Ok(vec![
                create_test_invite(7, 10, GUEST, InviteStatus::Accepted),
                create_test_invite(8, 10, 3, InviteStatus::Accepted),
            ])
        });
        interests
            .expect_set_status()
            .withf(|id, status| *id == 10 && *status == InterestStatus::Confirmed)
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let invite = svc.accept(GUEST, 10).await.unwrap();
        assert_eq!(invite.status, InviteStatus::Accepted);
    }

    #[tokio::test]
    async fn test_accept_keeps_pending_interest_until_all_accept() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_find_invite()
            .returning(|interest, user| Ok(Some(create_test_invite(7, interest, user, InviteStatus::Pending))));
        echo_update(&mut interests);
        interests.expect_invites_for().returning(|_| {
            Ok(vec![
                create_test_invite(7, 10, GUEST, InviteStatus::Accepted),
                create_test_invite(8, 10, 3, InviteStatus::Pending),
            ])
        });
        interests.expect_set_status().times(0);

        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        assert!(svc.accept(GUEST, 10).await.is_ok());
    }

    #[tokio::test]
    async fn test_answer_rules_per_status() {
        let cases = [
            (InviteStatus::Accepted, "accept", "You cannot accept an invite that is already accepted."),
            (
                InviteStatus::SuggestedNewTime,
                "accept",
                "You cannot accept an invite that is already suggested_new_time.",
            ),
            (InviteStatus::Declined, "decline", "You cannot decline an invite that is already declined."),
            (InviteStatus::Accepted, "decline", "You cannot decline an invite that is already accepted."),
        ];

        for (status, action, expected) in cases {
            let mut interests = MockInterestRepositoryTrait::new();
            interests
                .expect_find_invite()
                .returning(move |interest, user| Ok(Some(create_test_invite(7, interest, user, status))));
            interests.expect_update_invite().times(0);

            let svc = service(
                MockUserRepositoryTrait::new(),
                MockProducerRepositoryTrait::new(),
                interests,
            );
            let err = match action {
                "accept" => svc.accept(GUEST, 10).await.unwrap_err(),
                _ => svc.decline(GUEST, 10, None).await.unwrap_err(),
            };
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn test_missing_invite() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests.expect_find_invite().returning(|_, _| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let err = svc.accept(GUEST, 10).await.unwrap_err();
        assert_eq!(err.to_string(), "Invite not found for this user.");
        let err = svc
            .respond(GUEST, 10, InviteStatus::Accepted)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invite not found");
    }

    #[tokio::test]
    async fn test_decline_marks_interest_declined() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_find_invite()
            .returning(|interest, user| {
                Ok(Some(create_test_invite(7, interest, user, InviteStatus::SuggestedNewTime)))
            });
        echo_update(&mut interests);
        interests
            .expect_invites_for()
            .returning(|_| Ok(vec![create_test_invite(7, 10, GUEST, InviteStatus::Declined)]));
        interests
            .expect_set_status()
            .withf(|_, status| *status == InterestStatus::Declined)
            .times(1)
            .returning(|_, _| Ok(()));

        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let invite = svc
            .decline(GUEST, 10, Some("busy that week".to_string()))
            .await
            .unwrap();
        assert_eq!(invite.decline_reason.as_deref(), Some("busy that week"));
    }

    #[tokio::test]
    async fn test_decline_reason_length() {
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            MockInterestRepositoryTrait::new(),
        );
        for reason in ["   ".to_string(), "x".repeat(301)] {
            let err = svc.decline(GUEST, 10, Some(reason)).await.unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
    }

    // ==================== 提议新时间 ====================

    fn suggest_fixture(
        invite_status: InviteStatus,
        producer_id: Option<i64>,
        slot_owner: i64,
    ) -> (MockProducerRepositoryTrait, MockInterestRepositoryTrait) {
        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_find_invite()
            .returning(move |interest, user| Ok(Some(create_test_invite(7, interest, user, invite_status))));
        interests
            .expect_find_by_id()
            .returning(move |id| Ok(Some(create_test_interest(id, producer_id))));
        echo_update(&mut interests);

        let mut producers = MockProducerRepositoryTrait::new();
        producers
            .expect_find_by_id()
            .returning(|_| Ok(Some(create_test_producer())));
        producers
            .expect_find_slot()
            .returning(move |id| Ok(Some(create_test_slot(id, slot_owner, "Monday", 10))));
        (producers, interests)
    }

    #[tokio::test]
    async fn test_suggest_new_time_success() {
        let (producers, interests) =
            suggest_fixture(InviteStatus::Pending, Some(PRODUCER_ID), PRODUCER_OWNER);
        let svc = service(MockUserRepositoryTrait::new(), producers, interests);

        let invite = svc
            .suggest_new_time(GUEST, 10, Some(4), None, Some("later?".to_string()))
            .await
            .unwrap();
        assert_eq!(invite.status, InviteStatus::SuggestedNewTime);
        assert_eq!(invite.suggested_slot_id, Some(4));
        assert!(invite.responded_at.is_some());
    }

    #[tokio::test]
    async fn test_suggest_new_time_rejections() {
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            MockInterestRepositoryTrait::new(),
        );
        let err = svc.suggest_new_time(GUEST, 10, None, None, None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let (producers, interests) = suggest_fixture(InviteStatus::Pending, None, PRODUCER_OWNER);
        let svc = service(MockUserRepositoryTrait::new(), producers, interests);
        let err = svc
            .suggest_new_time(GUEST, 10, Some(4), None, None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "This interest is not linked to a valid producer.");

        let (producers, interests) =
            suggest_fixture(InviteStatus::Declined, Some(PRODUCER_ID), PRODUCER_OWNER);
        let svc = service(MockUserRepositoryTrait::new(), producers, interests);
        let err = svc
            .suggest_new_time(GUEST, 10, None, Some(Utc::now()), None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "You cannot suggest a new time for an invite that is already declined."
        );

        let (producers, interests) =
            suggest_fixture(InviteStatus::Pending, Some(PRODUCER_ID), 999);
        let svc = service(MockUserRepositoryTrait::new(), producers, interests);
        let err = svc
            .suggest_new_time(GUEST, 10, Some(4), None, None)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid slot: slot does not belong to this producer."
        );
    }

    // ==================== 查询 ====================

    #[tokio::test]
    async fn test_user_interests_attach_invites() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests
            .expect_list_by_user()
            .returning(|_| Ok(vec![create_test_interest(11, None), create_test_interest(10, None)]));
        interests
            .expect_invites_for()
            .withf(|ids| ids == [11, 10])
            .returning(|_| {
                Ok(vec![
                    create_test_invite(1, 10, GUEST, InviteStatus::Pending),
                    create_test_invite(2, 10, 3, InviteStatus::Accepted),
                ])
            });

        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let list = svc.user_interests(CREATOR).await.unwrap();
        assert_eq!(list[0].interest.id, 11);
        assert!(list[0].invites.is_empty());
        assert_eq!(list[1].invites.len(), 2);
    }

    #[tokio::test]
    async fn test_interest_details_scoped_to_creator() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests.expect_find_for_user().returning(|_, _| Ok(None));
        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let err = svc.interest_details(GUEST, 10).await.unwrap_err();
        assert_eq!(err.to_string(), "Interest not found");
    }

    #[tokio::test]
    async fn test_respond_preserves_suggestion() {
        let mut interests = MockInterestRepositoryTrait::new();
        interests.expect_find_invite().returning(|interest, user| {
            let mut invite = create_test_invite(7, interest, user, InviteStatus::SuggestedNewTime);
            invite.suggested_slot_id = Some(3);
            Ok(Some(invite))
        });
        interests
            .expect_update_invite()
            .withf(|_, r| r.status == InviteStatus::Pending && r.suggested_slot_id == Some(3))
            .times(1)
            .returning(|id, r| Ok(create_test_invite(id, 10, GUEST, r.status)));

        let svc = service(
            MockUserRepositoryTrait::new(),
            MockProducerRepositoryTrait::new(),
            interests,
        );
        let invite = svc.respond(GUEST, 10, InviteStatus::Pending).await.unwrap();
        assert_eq!(invite.status, InviteStatus::Pending);
    }

    #[test]
    fn test_group_by_weekday_orders_days() {
        let slots = vec![
            create_test_slot(1, PRODUCER_OWNER, "Sunday", 9),
            create_test_slot(2, PRODUCER_OWNER, "Monday", 14),
            create_test_slot(3, PRODUCER_OWNER, "Monday", 9),
            create_test_slot(4, PRODUCER_OWNER, "Wednesday", 11),
        ];
        let groups = group_by_weekday(slots);

        let days: Vec<&str> = groups.iter().map(|g| g.day.as_str()).collect();
        assert_eq!(days, ["Monday", "Wednesday", "Sunday"]);
        let monday: Vec<i64> = groups[0].slots.iter().map(|s| s.id).collect();
        assert_eq!(monday, [3, 2]);
    }
}
