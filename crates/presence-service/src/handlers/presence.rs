//! 出勤 API 处理器
//!
//! 两类事件共用同一个处理流程，仅 ID 校验策略不同

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{
    dto::{ApiResponse, EventPresencesDto},
    error::PresenceError,
    models::{BatchResult, EventKind, EventRef},
    state::AppState,
    validation::{ValidationReport, validate_batch},
};

/// 记录礼拜出勤
///
/// POST /api/presencas/cultos
pub async fn record_weekly_service(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResult>>, PresenceError> {
    record(state, EventKind::WeeklyService, payload).await
}

/// 记录小组聚会出勤
///
/// POST /api/presencas/reunioes-celula
pub async fn record_cell_meeting(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResult>>, PresenceError> {
    record(state, EventKind::CellMeeting, payload).await
}

async fn record(
    state: AppState,
    kind: EventKind,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiResponse<BatchResult>>, PresenceError> {
    let Json(payload) = payload.map_err(|e| ValidationReport::malformed(e.body_text()))?;
    let request = validate_batch(&payload, kind)?;
    let result = state.presence_service.record(request).await?;
    Ok(Json(ApiResponse::batch(result)))
}

/// 礼拜出勤列表
///
/// GET /api/presencas/cultos/{id}
pub async fn list_weekly_service_presences(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EventPresencesDto>>, PresenceError> {
    list(state, EventRef::weekly_service(id)).await
}

/// 小组聚会出勤列表
///
/// GET /api/presencas/reunioes-celula/{id}
pub async fn list_cell_meeting_presences(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<EventPresencesDto>>, PresenceError> {
    list(state, EventRef::cell_meeting(id)).await
}

async fn list(
    state: AppState,
    event: EventRef,
) -> Result<Json<ApiResponse<EventPresencesDto>>, PresenceError> {
    let records = state.presence_service.list_presences(&event).await?;
    Ok(Json(ApiResponse::success(EventPresencesDto::new(
        &event, records,
    ))))
}
