//! 路由配置模块

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};

use celula_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 出勤记录路由
fn presence_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/presencas/cultos",
            post(handlers::presence::record_weekly_service),
        )
        .route(
            "/presencas/cultos/{id}",
            get(handlers::presence::list_weekly_service_presences),
        )
        .route(
            "/presencas/reunioes-celula",
            post(handlers::presence::record_cell_meeting),
        )
        .route(
            "/presencas/reunioes-celula/{id}",
            get(handlers::presence::list_cell_meeting_presences),
        )
}

/// 月度事件路由
fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/cultos", get(handlers::schedule::list_weekly_services))
        .route(
            "/reunioes-celula",
            get(handlers::schedule::list_cell_meetings),
        )
}

/// 成员角色路由
fn member_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/mobile/membros/{id}",
            get(handlers::member::get_mobile_profile),
        )
        .route(
            "/admin/membros/{id}/role",
            put(handlers::member::assign_role),
        )
}

/// 全部 API 路由（挂载在 /api 下）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(presence_routes())
        .merge(schedule_routes())
        .merge(member_routes())
}

/// 构建应用路由，包含存活探针与可观测性中间件
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "presence-service"
    }))
}
