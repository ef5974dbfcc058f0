//! 出勤记录服务入口

use std::time::Duration;

use anyhow::Context;
use axum::{Json, http::StatusCode, routing::get};
use celula_shared::{config::AppConfig, database::Database, observability};
use presence::{routes, state::AppState, time_window::TimeWindowResolver};
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::info;

const SERVICE_NAME: &str = "presence-service";

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(SERVICE_NAME).context("failed to load configuration")?;
    let _guard = observability::init(&config.observability, SERVICE_NAME).await?;

    info!(
        environment = %config.environment,
        "Starting {} on {}",
        SERVICE_NAME,
        config.server_addr()
    );

    let resolver = TimeWindowResolver::from_offset_minutes(config.organization.utc_offset_minutes)
        .with_context(|| {
            format!(
                "invalid organization.utc_offset_minutes: {}",
                config.organization.utc_offset_minutes
            )
        })?;

    let db = Database::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db.migrate(&MIGRATOR)
        .await
        .context("failed to apply database migrations")?;

    let state = AppState::with_pool(
        db.pool().clone(),
        resolver,
        config.presence.max_concurrency,
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::build_router(state)
        .route(
            "/ready",
            get({
                let db_for_ready = db.clone();
                move || readiness_check(db_for_ready.clone())
            }),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_seconds),
        ))
        .layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号（SIGTERM 或 Ctrl+C）
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "注册 Ctrl+C 处理器失败");
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
                tracing::error!(error = %e, "注册 SIGTERM 处理器失败");
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

/// 就绪探针：检查数据库连接
async fn readiness_check(db: Database) -> Json<serde_json::Value> {
    let latency = db.health_check().await.ok();
    let db_ok = latency.is_some();

    Json(serde_json::json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "service": SERVICE_NAME,
        "checks": {
            "database": if db_ok { "ok" } else { "fail" },
            "databaseLatencyMs": latency.map(|d| d.as_millis() as u64)
        }
    }))
}
