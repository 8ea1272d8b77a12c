//! 市场预订 API 服务
//!
//! 提供活动预订、餐厅订座、意向邀请与商家看板等 REST API。

use std::time::Duration;

use axum::http::HeaderValue;
use marketplace_api::{AppState, routes};
use marketplace_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 统一加载配置：config/default.toml、环境配置与 MARKET_ 环境变量
    let config = AppConfig::load("marketplace-api")?;

    let obs_config = config.observability.clone().with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    if config.auth.uses_default_secrets() {
        if config.is_production() {
            anyhow::bail!("生产环境必须通过 MARKET_AUTH__ACCESS_SECRET / MARKET_AUTH__REFRESH_SECRET 设置 JWT 密钥");
        }
        warn!("使用默认 JWT 密钥，仅限开发环境");
    }

    info!("Starting marketplace-api on {}", config.server_addr());

    let db = Database::connect(&config.database).await?;
    let state = AppState::new(db, &config);

    if config.worker.enabled {
        let worker = state.status_worker.clone();
        tokio::spawn(async move {
            worker.run().await;
        });
        info!("预订状态 Worker 已启动");
    } else {
        info!("预订状态 Worker 已禁用");
    }

    let app = routes::with_edge_layers(
        routes::app(state),
        Duration::from_secs(config.server.request_timeout_seconds),
    )
    .layer(cors_layer(&config));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：通过 MARKET_CORS_ORIGINS 控制允许的来源，逗号分隔
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed_origins = std::env::var("MARKET_CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("MARKET_CORS_ORIGINS=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    info!("CORS allowed_origins: {}", allowed_origins);
    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("注册 Ctrl+C 处理器失败: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
