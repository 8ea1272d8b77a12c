//! 活动预订服务
//!
//! 负责活动预订的创建、查询、取消与签到。
//!
//! ## 状态流转
//!
//! - scheduled → inProgress：仅能通过签到，且必须处于活动时间窗口内
//! - inProgress → completed：活动结束后自动完成（读路径内联 + 后台 worker）
//! - scheduled → cancelled：预订人在活动结束前取消
//!
//! 所有时间判断都按活动自身的时区换算成 UTC 后进行。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use marketplace_shared::observability::metrics;

use crate::error::{CoreError, Result};
use crate::models::{BookingStatus, NewEventBooking};
use crate::repository::{
    EventBookingRepositoryTrait, EventRepositoryTrait, UserRepositoryTrait,
};
use crate::service::dto::{
    BookingCancelled, BookingCreated, BookingListItem, CheckInResult, EventSchedule,
};

const KIND: &str = "event";

/// 读路径内联批量完成的单批上限
const INLINE_SWEEP_BATCH: i64 = 500;

/// 条件更新未命中（并发下状态已被改变）时的提示
const STATUS_CHANGED: &str = "Booking status has changed, please refresh and try again";

/// 活动预订服务
pub struct EventBookingService<U, E, B>
where
    U: UserRepositoryTrait,
    E: EventRepositoryTrait,
    B: EventBookingRepositoryTrait,
{
    users: Arc<U>,
    events: Arc<E>,
    bookings: Arc<B>,
}

impl<U, E, B> EventBookingService<U, E, B>
where
    U: UserRepositoryTrait,
    E: EventRepositoryTrait,
    B: EventBookingRepositoryTrait,
{
    pub fn new(users: Arc<U>, events: Arc<E>, bookings: Arc<B>) -> Self {
        Self {
            users,
            events,
            bookings,
        }
    }

    /// 创建活动预订
    ///
    /// 依次检查：活动存在、已启用、尚未结束、容量足够
    #[instrument(skip(self, internal_notes))]
    pub async fn create_booking(
        &self,
        user_id: i64,
        event_id: i64,
        guest_count: i32,
        internal_notes: Option<String>,
    ) -> Result<BookingCreated> {
        if guest_count < 1 {
            return Err(CoreError::validation("numberOfPersons must be at least 1"));
        }

        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .filter(|e| !e.is_deleted)
            .ok_or_else(|| CoreError::not_found("Event not found"))?;

        if !event.is_active {
            return Err(CoreError::bad_request("This event is not active."));
        }

        let now = Utc::now();
        if event.window().has_ended(now) {
            return Err(CoreError::bad_request(
                "This event has already ended. Booking is not allowed.",
            ));
        }

        if event.max_capacity > 0 {
            let booked = self.events.booked_guests(event.id).await?;
            if booked + i64::from(guest_count) > i64::from(event.max_capacity) {
                return Err(CoreError::bad_request("Booking exceeds event capacity"));
            }
        }

        let total_price = Decimal::from(guest_count) * event.price_per_guest;
        let booking = self
            .bookings
            .create(&NewEventBooking {
                user_id,
                event_id: event.id,
                number_of_persons: guest_count,
                total_price,
                internal_notes,
            })
            .await?;

        metrics::record_booking_created(KIND);
        info!(booking_id = booking.id, event_id, user_id, "活动预订已创建");

        Ok(BookingCreated {
            message: "Booking confirmed",
            booking_id: booking.id,
            total_amount: booking.total_price,
            status: booking.status,
        })
    }

    /// 列出预订
    ///
    /// 商家看到自己名下活动的全部预订，普通用户只看到自己的预订。
    /// 返回前先把已结束的 inProgress 预订置为 completed。
    #[instrument(skip(self))]
    pub async fn list_bookings(
        &self,
        user_id: i64,
        status_filter: Option<&str>,
    ) -> Result<Vec<BookingListItem>> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        let now = Utc::now();
        self.complete_overdue(now, INLINE_SWEEP_BATCH).await?;

        let views = if user.is_producer() {
            self.bookings.list_for_producer_owner(user.id).await?
        } else {
            self.bookings.list_for_user(user.id).await?
        };

        // 未知过滤值按 all 处理
        let wanted = status_filter.and_then(BookingStatus::parse);

        let mut items = Vec::with_capacity(views.len());
        for mut view in views {
            if view.status == BookingStatus::InProgress
                && view.window().has_ended(now)
                && self
                    .bookings
                    .transition(view.id, BookingStatus::InProgress, BookingStatus::Completed)
                    .await?
            {
                metrics::record_booking_transition(KIND, "inProgress", "completed", 1);
                view.status = BookingStatus::Completed;
            }

            if wanted.is_none_or(|status| status == view.status) {
                items.push(BookingListItem::from_view(view, now));
            }
        }

        Ok(items)
    }

    /// 查询单个预订（仅预订人可见）
    #[instrument(skip(self))]
    pub async fn get_booking(&self, booking_id: i64, user_id: i64) -> Result<BookingListItem> {
        let view = self
            .bookings
            .find_view(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking not found"))?;

        if view.user_id != user_id {
            return Err(CoreError::unauthorized(
                "You do not have access to this booking",
            ));
        }

        Ok(BookingListItem::from_view(view, Utc::now()))
    }

    /// 预订人取消预订
    #[instrument(skip(self, reason))]
    pub async fn cancel_booking(
        &self,
        booking_id: i64,
        user_id: i64,
        reason: &str,
    ) -> Result<BookingCancelled> {
        let view = self
            .bookings
            .find_view(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking not found"))?;

        if view.user_id != user_id {
            return Err(CoreError::unauthorized("You do not own this booking"));
        }

        match view.status {
            BookingStatus::Cancelled => {
                return Err(CoreError::bad_request("Booking is already cancelled"));
            }
            BookingStatus::Completed => {
                return Err(CoreError::bad_request(
                    "Completed bookings cannot be cancelled",
                ));
            }
            BookingStatus::InProgress => {
                return Err(CoreError::bad_request(
                    "You cannot cancel an ongoing event booking",
                ));
            }
            BookingStatus::Scheduled => {}
        }

        if view.window().has_ended(Utc::now()) {
            return Err(CoreError::bad_request(
                "You cannot cancel — this event has already ended",
            ));
        }

        if !self.bookings.cancel(view.id, reason).await? {
            warn!(booking_id, "取消预订时状态已被并发修改");
            return Err(CoreError::bad_request(STATUS_CHANGED));
        }

        metrics::record_booking_transition(KIND, "scheduled", "cancelled", 1);
        info!(booking_id, user_id, "活动预订已取消");

        Ok(BookingCancelled {
            booking_id: view.id,
            reason: reason.to_string(),
            status: BookingStatus::Cancelled,
        })
    }

    /// 签到
    ///
    /// 预订人和活动所属商家都可以签到，只能在活动时间窗口内进行
    #[instrument(skip(self))]
    pub async fn check_in(&self, booking_id: i64, user_id: i64) -> Result<CheckInResult> {
        let view = self
            .bookings
            .find_view(booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Booking not found"))?;

        let is_customer = view.user_id == user_id;
        let is_producer = view.producer_user_id == user_id;
        if !is_customer && !is_producer {
            return Err(CoreError::unauthorized(
                "You are not authorized to check in this booking",
            ));
        }

        match view.status {
            BookingStatus::Cancelled => {
                return Err(CoreError::bad_request(
                    "You cannot check in for a cancelled booking",
                ));
            }
            BookingStatus::Completed => {
                return Err(CoreError::bad_request("This event is already completed"));
            }
            BookingStatus::Scheduled | BookingStatus::InProgress => {}
        }

        let window = view.window();
        let now = Utc::now();
        if window.not_started(now) {
            return Err(CoreError::bad_request(
                "You cannot check in before the event starts",
            ));
        }
        if now > window.end {
            return Err(CoreError::bad_request(
                "You cannot check in after the event has ended",
            ));
        }

        // 已签到的重复请求直接返回成功
        if view.status == BookingStatus::Scheduled {
            let moved = self
                .bookings
                .transition(view.id, BookingStatus::Scheduled, BookingStatus::InProgress)
                .await?;
            if !moved {
                warn!(booking_id, "签到时状态已被并发修改");
                return Err(CoreError::bad_request(STATUS_CHANGED));
            }
            metrics::record_booking_transition(KIND, "scheduled", "inProgress", 1);
            info!(booking_id, user_id, by_producer = !is_customer, "活动预订已签到");
        }

        Ok(CheckInResult {
            message: if is_customer {
                "User check-in successful"
            } else {
                "Producer check-in successful"
            },
            booking_id: view.id,
            status: BookingStatus::InProgress,
            event: EventSchedule {
                title: view.event_title,
                date: view.event_date,
                start_time: view.event_start_time,
                end_time: view.event_end_time,
                time_zone: view.event_time_zone,
            },
        })
    }

    /// 批量完成活动已结束的 inProgress 预订，返回影响行数
    pub async fn complete_overdue(&self, now: DateTime<Utc>, batch_size: i64) -> Result<u64> {
        let completed = self.bookings.complete_ended(now, batch_size).await?;
        if completed > 0 {
            metrics::record_booking_transition(KIND, "inProgress", "completed", completed);
            info!(completed, "已自动完成结束的活动预订");
        }
        Ok(completed)
    }
}
