//! 月度事件列表处理器

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::Utc;
use validator::Validate;

use crate::{
    dto::{ApiResponse, MonthEventsDto, MonthQuery, MonthSelector},
    error::PresenceError,
    models::EventKind,
    state::AppState,
};

/// 当月礼拜列表
///
/// GET /api/cultos?year=2024&month=2
pub async fn list_weekly_services(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MonthEventsDto>>, PresenceError> {
    list_month(state, EventKind::WeeklyService, query).await
}

/// 当月小组聚会列表
///
/// GET /api/reunioes-celula?at=2024-02-15T03:00:00Z
pub async fn list_cell_meetings(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MonthEventsDto>>, PresenceError> {
    list_month(state, EventKind::CellMeeting, query).await
}

async fn list_month(
    state: AppState,
    kind: EventKind,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<MonthEventsDto>>, PresenceError> {
    let Query(query) = query.map_err(|e| PresenceError::InvalidParameter(e.body_text()))?;
    query.validate()?;

    let schedule = match query.selector() {
        MonthSelector::Instant(at) => state.schedule_service.events_in_month(kind, at).await?,
        MonthSelector::YearMonth(year, month) => {
            state
                .schedule_service
                .events_in_month_of(kind, year, month)
                .await?
        }
        MonthSelector::Current => {
            state
                .schedule_service
                .events_in_month(kind, Utc::now())
                .await?
        }
    };

    Ok(Json(ApiResponse::success(MonthEventsDto::new(kind, schedule))))
}
