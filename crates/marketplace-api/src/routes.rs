//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use std::time::Duration;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use marketplace_shared::observability::middleware as obs_middleware;
use tower_http::timeout::TimeoutLayer;

use crate::middleware::{auth_middleware, require_admin, require_producer};
use crate::{handlers, state::AppState};

/// 构建认证相关的路由
///
/// login / refresh 在认证中间件的公开路径中放行
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/login", post(handlers::auth::login))
        .route("/v1/auth/refresh", post(handlers::auth::refresh_token))
        .route("/v1/auth/logout", post(handlers::auth::logout))
        .route("/v1/auth/me", get(handlers::auth::get_current_user))
}

/// 构建 App 端路由：活动浏览、附近商家、意向与邀请
fn app_routes() -> Router<AppState> {
    Router::new()
        // 活动
        .route("/app/events", get(handlers::event::list_events))
        .route("/app/events/types", get(handlers::event::event_types))
        .route("/app/events/{id}", get(handlers::event::get_event))
        // 商家
        .route(
            "/app/producers/nearby",
            get(handlers::producer::nearby_producers),
        )
        .route(
            "/app/producers/{id}/events",
            get(handlers::event::events_by_producer),
        )
        .route(
            "/app/producers/{id}/slots",
            get(handlers::producer::producer_slots),
        )
        // 意向
        .route(
            "/app/interests",
            post(handlers::interest::create_interest).get(handlers::interest::my_interests),
        )
        .route(
            "/app/interests/invited",
            get(handlers::interest::invited_interests),
        )
        .route(
            "/app/interests/accept",
            post(handlers::interest::accept_invite),
        )
        .route(
            "/app/interests/decline",
            post(handlers::interest::decline_invite),
        )
        .route(
            "/app/interests/suggest",
            post(handlers::interest::suggest_new_time),
        )
        .route(
            "/app/interests/{id}",
            get(handlers::interest::interest_details),
        )
        .route(
            "/app/interests/{id}/respond",
            put(handlers::interest::respond_invite),
        )
}

/// 构建预订路由
///
/// 活动预订对所有登录用户开放；餐厅订座的角色规则由服务层判断
fn booking_routes() -> Router<AppState> {
    Router::new()
        // 活动预订
        .route(
            "/producer/booking/createBooking/{event_id}",
            post(handlers::event_booking::create_booking),
        )
        .route(
            "/producer/booking/getUserBookings",
            get(handlers::event_booking::list_bookings),
        )
        .route(
            "/producer/booking/booking/{id}",
            get(handlers::event_booking::get_booking),
        )
        .route(
            "/producer/booking/cancelBooking/{id}",
            put(handlers::event_booking::cancel_booking),
        )
        .route(
            "/producer/booking/checkIn/{id}",
            put(handlers::event_booking::check_in),
        )
        // 餐厅订座
        .route(
            "/producer/booking/getBookings",
            get(handlers::table_booking::list_table_bookings),
        )
        .route(
            "/producer/booking/getBooking/{id}",
            get(handlers::table_booking::get_table_booking),
        )
        .route(
            "/producer/booking/cancel/{id}",
            put(handlers::table_booking::cancel_table_booking),
        )
        .route(
            "/producer/booking/tableCheckIn/{id}",
            put(handlers::table_booking::table_check_in),
        )
}

/// 构建商家路由：活动管理、时段预览、看板与洞察
fn producer_routes() -> Router<AppState> {
    Router::new()
        // 活动管理
        .route(
            "/producer/events",
            post(handlers::event::create_event).get(handlers::event::my_events),
        )
        .route(
            "/producer/events/{id}",
            get(handlers::event::get_my_event)
                .put(handlers::event::update_event)
                .delete(handlers::event::delete_event),
        )
        .route(
            "/producer/slots/preview",
            get(handlers::event::preview_slots),
        )
        // 看板
        .route(
            "/producer/dashboard/overview",
            get(handlers::dashboard::overview),
        )
        .route(
            "/producer/dashboard/user-insights",
            get(handlers::dashboard::user_insights),
        )
        .route(
            "/producer/dashboard/trends",
            get(handlers::dashboard::trends),
        )
        .route(
            "/producer/dashboard/ratings",
            get(handlers::dashboard::ratings),
        )
        .route(
            "/producer/dashboard/event-insights",
            get(handlers::dashboard::event_insights),
        )
        .route(
            "/producer/dashboard/dish-ratings",
            get(handlers::dashboard::dish_ratings),
        )
        .route(
            "/producer/dashboard/get-categories",
            get(handlers::dashboard::categories),
        )
        .route(
            "/producer/dashboard/menu-overview",
            get(handlers::dashboard::menu_overview),
        )
        .route(
            "/producer/dashboard/dish-drop-alerts",
            get(handlers::dashboard::dish_drop_alerts),
        )
        // 洞察
        .route(
            "/producer/insights/most-engaged",
            get(handlers::insights::most_engaged),
        )
        .route(
            "/producer/insights/upcoming-bookings",
            get(handlers::insights::upcoming_bookings),
        )
        .route(
            "/producer/insights/referrals",
            get(handlers::insights::referrals),
        )
        .route(
            "/producer/insights/monthly-rating",
            get(handlers::insights::monthly_rating),
        )
        .route(
            "/producer/insights/customers-by-rating",
            get(handlers::insights::customers_by_rating),
        )
        .route(
            "/producer/insights/rating-breakdown",
            get(handlers::insights::rating_breakdown),
        )
        .route_layer(middleware::from_fn(require_producer))
}

/// 构建管理员路由
fn admin_routes() -> Router<AppState> {
    let guarded = Router::new()
        .route(
            "/admin/bookings/{id}/temp",
            put(handlers::admin::update_temp),
        )
        .route(
            "/admin/bookings/sweep",
            post(handlers::admin::sweep_bookings),
        )
        .route_layer(middleware::from_fn(require_admin));

    Router::new()
        .route("/admin/auth/login", post(handlers::auth::admin_login))
        .merge(guarded)
}

/// 构建完整的 API 路由（不含探针与全局中间件）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(app_routes())
        .merge(booking_routes())
        .merge(producer_routes())
        .merge(admin_routes())
}

/// 组装应用：API 路由 + 探针 + 认证与可观测性中间件
///
/// CORS 与安全头由 main.rs 在外层追加
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        // 认证中间件：验证 JWT Token
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        // 可观测性中间件：请求追踪和指标收集
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 外层通用中间件：安全响应头与请求超时，超时返回 408
pub fn with_edge_layers(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(middleware::from_fn(security_headers))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// 为所有响应注入 HTTP 安全头
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );
    headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("0"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenType;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::Utc;
    use marketplace_core::models::User;
    use marketplace_shared::config::AppConfig;
    use marketplace_shared::database::Database;
    use marketplace_shared::test_utils::TestDataGenerator;
    use serde_json::Value;
    use tower::ServiceExt;

    #[test]
    fn test_routes_construction() {
        let _auth = auth_routes();
        let _app = app_routes();
        let _booking = booking_routes();
        let _producer = producer_routes();
        let _admin = admin_routes();
        let _api = api_routes();
    }

    /// 连接池惰性建立，不触达数据库的请求可以直接测试
    fn lazy_state() -> AppState {
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/marketplace_test")
            .expect("lazy pool");
        AppState::new(Database::from_pool(pool), &AppConfig::default())
    }

    fn user(role_id: i64, role: &str, active: bool) -> User {
        User {
            id: 11,
            email: TestDataGenerator::email(),
            full_name: Some(TestDataGenerator::full_name()),
            password_hash: None,
            role_id,
            role_name: role.to_string(),
            is_active: active,
            is_deleted: false,
            latitude: None,
            longitude: None,
            profile_image_url: None,
            created_at: Utc::now(),
        }
    }

    fn bearer(state: &AppState, user: &User) -> String {
        let (token, _) = state.jwt.issue(user, TokenType::Access).unwrap();
        format!("Bearer {token}")
    }

    async fn send(state: AppState, method: &str, uri: &str, auth: Option<String>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let response = app(state)
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (status, body) = send(lazy_state(), "GET", "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let (status, body) = send(lazy_state(), "GET", "/app/events", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "token is missing in header");
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let (status, body) = send(
            lazy_state(),
            "GET",
            "/v1/auth/me",
            Some("Bearer not.a.token".to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_deactivated_account_is_forbidden() {
        let state = lazy_state();
        let auth = bearer(&state, &user(2, "user", false));
        let (status, body) = send(state, "GET", "/app/events", Some(auth)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Your account has been deactivated");
    }

    #[tokio::test]
    async fn test_role_guards() {
        struct Case {
            name: &'static str,
            role_id: i64,
            role: &'static str,
            method: &'static str,
            uri: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            Case {
                name: "regular user on dashboard",
                role_id: 2,
                role: "user",
                method: "GET",
                uri: "/producer/dashboard/overview",
                expected: "User is not a producer",
            },
            Case {
                name: "regular user creating event",
                role_id: 2,
                role: "user",
                method: "POST",
                uri: "/producer/events",
                expected: "User is not a producer",
            },
            Case {
                name: "producer triggering sweep",
                role_id: 3,
                role: "restaurant",
                method: "POST",
                uri: "/admin/bookings/sweep",
                expected: "User is not an admin",
            },
        ];

        for case in cases {
            let state = lazy_state();
            let auth = bearer(&state, &user(case.role_id, case.role, true));
            let (status, body) = send(state, case.method, case.uri, Some(auth)).await;

            assert_eq!(status, StatusCode::FORBIDDEN, "case: {}", case.name);
            assert_eq!(body["message"], case.expected, "case: {}", case.name);
        }
    }

    #[tokio::test]
    async fn test_slot_preview_for_producer() {
        let state = lazy_state();
        let auth = bearer(&state, &user(3, "restaurant", true));
        let (status, body) = send(
            state,
            "GET",
            "/producer/slots/preview?start=09:00&end=12:30&hourLimit=1",
            Some(auth),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let slots = body["data"].as_array().unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0]["startTime"], "09:00");
        assert_eq!(slots[2]["endTime"], "12:00");
    }

    #[tokio::test]
    async fn test_slot_preview_rejects_out_of_range_hour_limit() {
        let state = lazy_state();
        let auth = bearer(&state, &user(3, "restaurant", true));
        let (status, body) = send(
            state,
            "GET",
            "/producer/slots/preview?start=09:00&end=12:00&hourLimit=30",
            Some(auth),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_list_endpoints_reject_oversized_page() {
        let cases = [
            (2, "user", "/app/producers/nearby?page=9223372036854775807"),
            (3, "restaurant", "/producer/booking/getBookings?booking=completed&page=9223372036854775807"),
            (3, "restaurant", "/producer/dashboard/get-categories?page=100001"),
        ];

        for (role_id, role, uri) in cases {
            let state = lazy_state();
            let auth = bearer(&state, &user(role_id, role, true));
            let (status, body) = send(state, "GET", uri, Some(auth)).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["code"], "VALIDATION_ERROR", "{uri}");
        }
    }

    #[tokio::test]
    async fn test_edge_layers_set_security_headers() {
        let router = with_edge_layers(app(lazy_state()), Duration::from_secs(5));
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[tokio::test]
    async fn test_edge_layers_time_out_with_408() {
        let slow = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                "late"
            }),
        );
        let response = with_edge_layers(slow, Duration::from_millis(10))
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
