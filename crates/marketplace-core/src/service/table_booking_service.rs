//! 餐厅订座服务
//!
//! 餐厅查看、取消、签到自己的订座。调用方角色必须是 `restaurant`，
//! 订座的 `restaurant_id` 即餐厅所有者的用户 ID。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use marketplace_shared::observability::metrics;

use crate::error::{CoreError, Result};
use crate::models::{BookingStatus, Page, TableBooking, TableTab, User};
use crate::repository::{TableBookingRepositoryTrait, UserRepositoryTrait};
use crate::service::dto::{
    TableBookingDetail, TableBookingEnvelope, TableBookingItem, TableBookingPage,
    TableBookingState,
};
use crate::time::{local_now, resolve_zone};

const KIND: &str = "table";
const RESTAURANT_ROLE: &str = "restaurant";

/// 列表请求内联扫描的单批上限
const INLINE_SWEEP_BATCH: i64 = 500;

/// 一次超时扫描的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepCounts {
    pub cancelled: u64,
    pub completed: u64,
}

/// 餐厅订座服务
pub struct TableBookingService<U, T>
where
    U: UserRepositoryTrait,
    T: TableBookingRepositoryTrait,
{
    users: Arc<U>,
    bookings: Arc<T>,
}

impl<U, T> TableBookingService<U, T>
where
    U: UserRepositoryTrait,
    T: TableBookingRepositoryTrait,
{
    pub fn new(users: Arc<U>, bookings: Arc<T>) -> Self {
        Self { users, bookings }
    }

    async fn restaurant(&self, user_id: i64) -> Result<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("User not found"))?;

        if user.role_name != RESTAURANT_ROLE {
            return Err(CoreError::bad_request("User is not a Restaurant"));
        }
        Ok(user)
    }

    /// 按分栏分页列出订座
    ///
    /// 查询前先把本餐厅超时未到店的订座自动取消；
    /// completed 分栏还会把已结束的 inProgress 订座置为 completed。
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: i64,
        tab: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<TableBookingPage> {
        let restaurant = self.restaurant(user_id).await?;
        let tab = TableTab::parse(tab)
            .ok_or_else(|| CoreError::bad_request("Invalid booking type requested"))?;
        let page = Page::new(page, limit);
        let now = Utc::now();

        let cancelled = self
            .bookings
            .cancel_overdue(Some(restaurant.id), now, INLINE_SWEEP_BATCH)
            .await?;
        if cancelled > 0 {
            metrics::record_booking_transition(KIND, "scheduled", "cancelled", cancelled);
            info!(restaurant_id = restaurant.id, cancelled, "已自动取消超时订座");
        }

        if tab == TableTab::Completed {
            let completed = self
                .bookings
                .complete_overdue(Some(restaurant.id), now, INLINE_SWEEP_BATCH)
                .await?;
            if completed > 0 {
                metrics::record_booking_transition(KIND, "inProgress", "completed", completed);
            }
        }

        let total = self.bookings.count_tab(restaurant.id, tab, now).await?;
        let rows = self.bookings.list_tab(restaurant.id, tab, now, page).await?;

        let bookings = rows
            .into_iter()
            .map(|booking| {
                let (can_cancel, can_check_in) = match tab {
                    TableTab::Scheduled => (
                        true,
                        booking.start_date_time <= now && now < booking.end_date_time,
                    ),
                    TableTab::InProgress => (true, false),
                    TableTab::Completed | TableTab::Cancelled => (false, false),
                };
                TableBookingItem {
                    booking,
                    can_cancel,
                    can_check_in,
                }
            })
            .collect();

        Ok(TableBookingPage {
            bookings,
            total,
            current_page: page.page,
            total_pages: page.total_pages(total),
        })
    }

    /// 查询单个订座，不存在时返回空而非错误
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        user_id: i64,
        booking_id: i64,
        time_zone: Option<&str>,
    ) -> Result<TableBookingDetail> {
        let restaurant = self.restaurant(user_id).await?;
        let booking = self
            .bookings
            .find_for_restaurant(restaurant.id, booking_id)
            .await?;

        let now = Utc::now();
        let tz = resolve_zone(time_zone);

        Ok(TableBookingDetail {
            booking: booking.map(|booking| {
                let status = booking.status;
                TableBookingState {
                    scheduled: status == BookingStatus::Scheduled,
                    in_progress: status == BookingStatus::InProgress,
                    completed: status == BookingStatus::Completed,
                    cancelled: status == BookingStatus::Cancelled,
                    can_cancel: matches!(
                        status,
                        BookingStatus::Scheduled | BookingStatus::InProgress
                    ),
                    can_check_in: status == BookingStatus::Scheduled
                        && booking.end_date_time > now,
                    start: local_now(tz, booking.start_date_time),
                    current_time: local_now(tz, now),
                    booking,
                }
            }),
        })
    }

    /// 餐厅取消订座
    #[instrument(skip(self, reason))]
    pub async fn cancel(
        &self,
        user_id: i64,
        booking_id: i64,
        reason: &str,
    ) -> Result<TableBookingEnvelope> {
        let restaurant = self.restaurant(user_id).await?;
        let booking = self.find(restaurant.id, booking_id).await?;

        match booking.status {
            BookingStatus::Cancelled => {
                return Err(CoreError::bad_request("booking is already cancelled"));
            }
            BookingStatus::Scheduled => {}
            _ => return Err(CoreError::bad_request("booking cannot be cancelled")),
        }

        let updated = self
            .bookings
            .cancel(restaurant.id, booking.id, reason, Utc::now())
            .await?
            .ok_or_else(|| {
                warn!(booking_id, "取消订座时状态已被并发修改");
                CoreError::bad_request("booking cannot be cancelled")
            })?;

        metrics::record_booking_transition(KIND, "scheduled", "cancelled", 1);
        info!(booking_id, restaurant_id = restaurant.id, "餐厅已取消订座");

        Ok(TableBookingEnvelope { booking: updated })
    }

    /// 顾客到店签到
    #[instrument(skip(self))]
    pub async fn check_in(
        &self,
        user_id: i64,
        booking_id: i64,
        time_zone: Option<&str>,
    ) -> Result<TableBookingEnvelope> {
        if time_zone.is_none_or(|tz| tz.trim().is_empty()) {
            return Err(CoreError::bad_request("timeZone is required"));
        }

        let restaurant = self.restaurant(user_id).await?;
        let booking = self.find(restaurant.id, booking_id).await?;

        match booking.status {
            BookingStatus::InProgress => {
                return Err(CoreError::bad_request("booking is already inProgress"));
            }
            BookingStatus::Scheduled => {}
            _ => return Err(CoreError::bad_request("booking cannot be checkedIn")),
        }

        let now = Utc::now();
        if booking.end_date_time < now {
            return Err(CoreError::bad_request(
                "booking cannot be checkedIn as it has already ended",
            ));
        }

        let updated = self
            .bookings
            .check_in(restaurant.id, booking.id, now)
            .await?
            .ok_or_else(|| CoreError::bad_request("booking cannot be checkedIn"))?;

        metrics::record_booking_transition(KIND, "scheduled", "inProgress", 1);
        info!(booking_id, restaurant_id = restaurant.id, "订座已签到");

        Ok(TableBookingEnvelope { booking: updated })
    }

    /// 直接改写订座的起止时间与状态（测试辅助，仅管理员）
    #[instrument(skip(self))]
    pub async fn update_temp(
        &self,
        booking_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        status: BookingStatus,
    ) -> Result<TableBookingEnvelope> {
        if start >= end {
            return Err(CoreError::validation("startDateTime must be before endDateTime"));
        }

        let booking = self
            .bookings
            .update_temp(booking_id, start, end, status)
            .await?
            .ok_or_else(|| CoreError::not_found("booking not found"))?;

        info!(booking_id, status = %status, "订座时间已被改写");
        Ok(TableBookingEnvelope { booking })
    }

    /// 全量扫描：取消超时未到店的订座，完成已结束的进行中订座
    pub async fn sweep_overdue(&self, now: DateTime<Utc>, batch_size: i64) -> Result<SweepCounts> {
        let cancelled = self.bookings.cancel_overdue(None, now, batch_size).await?;
        let completed = self.bookings.complete_overdue(None, now, batch_size).await?;

        if cancelled > 0 {
            metrics::record_booking_transition(KIND, "scheduled", "cancelled", cancelled);
        }
        if completed > 0 {
            metrics::record_booking_transition(KIND, "inProgress", "completed", completed);
        }

        Ok(SweepCounts {
            cancelled,
            completed,
        })
    }

    async fn find(&self, restaurant_id: i64, booking_id: i64) -> Result<TableBooking> {
        self.bookings
            .find_for_restaurant(restaurant_id, booking_id)
            .await?
            .ok_or_else(|| CoreError::not_found("booking not found"))
    }
}
