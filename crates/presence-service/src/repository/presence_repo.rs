//! 出勤记录仓储
//!
//! 写入均为单条 `INSERT ... ON CONFLICT` 语句，依赖表上的
//! `UNIQUE (membro_id, <事件列>)` 约束，不做先读后写

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::traits::PresenceRepositoryTrait;
use crate::error::Result;
use crate::models::{EventKind, EventRef, PresenceRecord, WriteOutcome};

#[derive(Debug, sqlx::FromRow)]
struct PresenceRow {
    id: String,
    member_id: String,
    event_id: String,
    present: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PresenceRow {
    fn into_record(self, kind: EventKind) -> PresenceRecord {
        PresenceRecord {
            id: self.id,
            member_id: self.member_id,
            event_id: self.event_id,
            event_kind: kind,
            present: self.present,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

struct PresenceQueries {
    insert_if_absent: &'static str,
    upsert: &'static str,
    find: &'static str,
    list_by_event: &'static str,
}

static WEEKLY_SERVICE_QUERIES: PresenceQueries = PresenceQueries {
    insert_if_absent: r#"
        INSERT INTO presenca_culto (id, membro_id, culto_individual_id, presente)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (membro_id, culto_individual_id) DO NOTHING
        RETURNING id
    "#,
    upsert: r#"
        INSERT INTO presenca_culto (id, membro_id, culto_individual_id, presente)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (membro_id, culto_individual_id)
        DO UPDATE SET presente = EXCLUDED.presente, updated_at = NOW()
        RETURNING (xmax = 0) AS inserted
    "#,
    find: r#"
        SELECT id, membro_id AS member_id, culto_individual_id AS event_id,
               presente AS present, created_at, updated_at
        FROM presenca_culto
        WHERE culto_individual_id = $1 AND membro_id = $2
    "#,
    list_by_event: r#"
        SELECT id, membro_id AS member_id, culto_individual_id AS event_id,
               presente AS present, created_at, updated_at
        FROM presenca_culto
        WHERE culto_individual_id = $1
        ORDER BY created_at ASC, membro_id ASC
    "#,
};

static CELL_MEETING_QUERIES: PresenceQueries = PresenceQueries {
    insert_if_absent: r#"
        INSERT INTO presenca_reuniao_celula (id, membro_id, reuniao_celula_id, presente)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (membro_id, reuniao_celula_id) DO NOTHING
        RETURNING id
    "#,
    upsert: r#"
        INSERT INTO presenca_reuniao_celula (id, membro_id, reuniao_celula_id, presente)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (membro_id, reuniao_celula_id)
        DO UPDATE SET presente = EXCLUDED.presente, updated_at = NOW()
        RETURNING (xmax = 0) AS inserted
    "#,
    find: r#"
        SELECT id, membro_id AS member_id, reuniao_celula_id AS event_id,
               presente AS present, created_at, updated_at
        FROM presenca_reuniao_celula
        WHERE reuniao_celula_id = $1 AND membro_id = $2
    "#,
    list_by_event: r#"
        SELECT id, membro_id AS member_id, reuniao_celula_id AS event_id,
               presente AS present, created_at, updated_at
        FROM presenca_reuniao_celula
        WHERE reuniao_celula_id = $1
        ORDER BY created_at ASC, membro_id ASC
    "#,
};

fn queries(kind: EventKind) -> &'static PresenceQueries {
    match kind {
        EventKind::WeeklyService => &WEEKLY_SERVICE_QUERIES,
        EventKind::CellMeeting => &CELL_MEETING_QUERIES,
    }
}

/// 出勤记录仓储
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceRepositoryTrait for PresenceRepository {
    async fn insert_if_absent(
        &self,
        event: &EventRef,
        member_id: &str,
        present: bool,
    ) -> Result<WriteOutcome> {
        let inserted = sqlx::query(queries(event.kind).insert_if_absent)
            .bind(Uuid::now_v7().to_string())
            .bind(member_id)
            .bind(&event.id)
            .bind(present)
            .fetch_optional(&self.pool)
            .await?;

        Ok(match inserted {
            Some(_) => WriteOutcome::Created,
            None => WriteOutcome::Unchanged,
        })
    }

    async fn upsert(
        &self,
        event: &EventRef,
        member_id: &str,
        present: bool,
    ) -> Result<WriteOutcome> {
        let row = sqlx::query(queries(event.kind).upsert)
            .bind(Uuid::now_v7().to_string())
            .bind(member_id)
            .bind(&event.id)
            .bind(present)
            .fetch_one(&self.pool)
            .await?;

        let inserted: bool = row.try_get("inserted")?;
        Ok(if inserted {
            WriteOutcome::Created
        } else {
            WriteOutcome::Updated
        })
    }

    async fn find(&self, event: &EventRef, member_id: &str) -> Result<Option<PresenceRecord>> {
        let row = sqlx::query_as::<_, PresenceRow>(queries(event.kind).find)
            .bind(&event.id)
            .bind(member_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_record(event.kind)))
    }

    async fn list_by_event(&self, event: &EventRef) -> Result<Vec<PresenceRecord>> {
        let rows = sqlx::query_as::<_, PresenceRow>(queries(event.kind).list_by_event)
            .bind(&event.id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|r| r.into_record(event.kind)).collect())
    }
}
