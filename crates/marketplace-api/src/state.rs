//! 应用状态定义
//!
//! 所有服务在启动时基于同一个连接池组装，通过 Arc 在 handler 间共享

use std::sync::Arc;

use marketplace_core::repository::{
    AnalyticsRepository, EventBookingRepository, EventRepository, InterestRepository,
    ProducerRepository, TableBookingRepository, UserRepository,
};
use marketplace_core::service::{
    DashboardService, EventBookingService, EventService, InsightsService, InterestService,
    TableBookingService,
};
use marketplace_shared::config::AppConfig;
use marketplace_shared::database::Database;

use crate::auth::{AuthService, JwtManager};
use crate::worker::BookingStatusWorker;

pub type EventBookings = EventBookingService<UserRepository, EventRepository, EventBookingRepository>;
pub type TableBookings = TableBookingService<UserRepository, TableBookingRepository>;
pub type Events = EventService<UserRepository, ProducerRepository, EventRepository>;
pub type Interests =
    InterestService<UserRepository, ProducerRepository, EventRepository, InterestRepository>;
pub type Dashboard = DashboardService<ProducerRepository, AnalyticsRepository>;
pub type Insights = InsightsService<ProducerRepository, AnalyticsRepository>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub auth: Arc<AuthService<UserRepository>>,
    pub event_bookings: Arc<EventBookings>,
    pub table_bookings: Arc<TableBookings>,
    pub events: Arc<Events>,
    pub interests: Arc<Interests>,
    pub dashboard: Arc<Dashboard>,
    pub insights: Arc<Insights>,
    pub status_worker: Arc<BookingStatusWorker>,
}

impl AppState {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        let pool = db.pool().clone();

        let users = Arc::new(UserRepository::new(pool.clone()));
        let producers = Arc::new(ProducerRepository::new(pool.clone()));
        let events = Arc::new(EventRepository::new(pool.clone()));
        let event_booking_repo = Arc::new(EventBookingRepository::new(pool.clone()));
        let table_booking_repo = Arc::new(TableBookingRepository::new(pool.clone()));
        let interests = Arc::new(InterestRepository::new(pool.clone()));
        let analytics = Arc::new(AnalyticsRepository::new(pool));

        let jwt = Arc::new(JwtManager::new(&config.auth));

        let event_bookings = Arc::new(EventBookingService::new(
            users.clone(),
            events.clone(),
            event_booking_repo,
        ));
        let table_bookings = Arc::new(TableBookingService::new(users.clone(), table_booking_repo));
        let status_worker = Arc::new(BookingStatusWorker::new(
            event_bookings.clone(),
            table_bookings.clone(),
            &config.worker,
        ));

        Self {
            auth: Arc::new(AuthService::new(users.clone(), jwt.clone())),
            events: Arc::new(EventService::new(
                users.clone(),
                producers.clone(),
                events.clone(),
            )),
            interests: Arc::new(InterestService::new(
                users,
                producers.clone(),
                events,
                interests,
            )),
            dashboard: Arc::new(DashboardService::new(producers.clone(), analytics.clone())),
            insights: Arc::new(InsightsService::new(producers, analytics)),
            event_bookings,
            table_bookings,
            status_worker,
            jwt,
            db,
        }
    }
}
