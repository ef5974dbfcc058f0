//! 事件仓储
//!
//! 礼拜实例与小组聚会分别存放在 `culto_individual` 与 `reuniao_celula` 两张表中，
//! 这里统一映射为 `Event`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::EventRepositoryTrait;
use crate::error::Result;
use crate::models::{Event, EventKind, EventRef};

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    scope_id: String,
    starts_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, kind: EventKind) -> Event {
        Event {
            id: self.id,
            kind,
            scope_id: self.scope_id,
            starts_at: self.starts_at,
        }
    }
}

struct EventQueries {
    find: &'static str,
    list_between: &'static str,
}

static WEEKLY_SERVICE_QUERIES: EventQueries = EventQueries {
    find: r#"
        SELECT id, culto_semanal_id AS scope_id, data_inicio_culto AS starts_at
        FROM culto_individual
        WHERE id = $1
    "#,
    list_between: r#"
        SELECT id, culto_semanal_id AS scope_id, data_inicio_culto AS starts_at
        FROM culto_individual
        WHERE data_inicio_culto BETWEEN $1 AND $2
        ORDER BY data_inicio_culto ASC
    "#,
};

static CELL_MEETING_QUERIES: EventQueries = EventQueries {
    find: r#"
        SELECT id, celula_id AS scope_id, data_reuniao AS starts_at
        FROM reuniao_celula
        WHERE id = $1
    "#,
    list_between: r#"
        SELECT id, celula_id AS scope_id, data_reuniao AS starts_at
        FROM reuniao_celula
        WHERE data_reuniao BETWEEN $1 AND $2
        ORDER BY data_reuniao ASC
    "#,
};

fn queries(kind: EventKind) -> &'static EventQueries {
    match kind {
        EventKind::WeeklyService => &WEEKLY_SERVICE_QUERIES,
        EventKind::CellMeeting => &CELL_MEETING_QUERIES,
    }
}

/// 事件仓储（只读）
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepositoryTrait for EventRepository {
    async fn find_event(&self, event: &EventRef) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(queries(event.kind).find)
            .bind(&event.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_event(event.kind)))
    }

    async fn list_events_between(
        &self,
        kind: EventKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(queries(kind).list_between)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_event(kind)).collect())
    }
}
