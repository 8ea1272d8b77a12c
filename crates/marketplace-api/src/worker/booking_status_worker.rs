//! 预订状态 Worker
//!
//! 定期推进到期预订的状态：
//! 1. 活动已结束的 inProgress 活动预订置为 completed
//! 2. 超时未到店的餐厅订座自动取消，已结束的 inProgress 订座置为 completed
//!
//! 仓储层使用 `FOR UPDATE SKIP LOCKED` 分批处理，多实例部署时不会重复处理

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use marketplace_shared::config::WorkerConfig;
use marketplace_shared::observability::metrics;
use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::state::{EventBookings, TableBookings};

const WORKER_NAME: &str = "booking_status_worker";

/// 一轮扫描的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub event_bookings_completed: u64,
    pub table_bookings_cancelled: u64,
    pub table_bookings_completed: u64,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.event_bookings_completed == 0
            && self.table_bookings_cancelled == 0
            && self.table_bookings_completed == 0
    }
}

/// 预订状态 Worker
pub struct BookingStatusWorker {
    event_bookings: Arc<EventBookings>,
    table_bookings: Arc<TableBookings>,
    poll_interval: Duration,
    batch_size: i64,
}

impl BookingStatusWorker {
    pub fn new(
        event_bookings: Arc<EventBookings>,
        table_bookings: Arc<TableBookings>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            event_bookings,
            table_bookings,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            batch_size: config.batch_size,
        }
    }

    /// 主循环：持续扫描直到进程退出，单轮失败只记录日志
    pub async fn run(&self) {
        info!(
            poll_interval = ?self.poll_interval,
            batch_size = self.batch_size,
            "BookingStatusWorker 已启动"
        );

        loop {
            let now = Utc::now();

            if let Err(e) = self.event_bookings.complete_overdue(now, self.batch_size).await {
                error!(error = %e, "自动完成活动预订出错");
            }

            if let Err(e) = self.table_bookings.sweep_overdue(now, self.batch_size).await {
                error!(error = %e, "清理超时订座出错");
            }

            metrics::set_worker_last_run(WORKER_NAME);

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// 立即执行一轮扫描（管理员手动触发）
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let event_bookings_completed = self
            .event_bookings
            .complete_overdue(now, self.batch_size)
            .await?;
        let tables = self.table_bookings.sweep_overdue(now, self.batch_size).await?;

        let report = SweepReport {
            event_bookings_completed,
            table_bookings_cancelled: tables.cancelled,
            table_bookings_completed: tables.completed,
        };
        if !report.is_empty() {
            info!(?report, "手动扫描完成");
        }
        metrics::set_worker_last_run(WORKER_NAME);

        Ok(report)
    }
}
