//! PostgreSQL 仓储测试
//!
//! 需要可用的数据库：`DATABASE_URL=postgres://... cargo test -- --ignored`

use std::sync::Arc;

use celula_shared::{config::DatabaseConfig, database::Database};
use chrono::{TimeZone, Utc};
use presence::repository::{
    EventRepository, EventRepositoryTrait, MemberRepository, MemberRepositoryTrait,
    PresenceRepository, PresenceRepositoryTrait,
};
use presence::service::PresenceService;
use presence::{BatchEntry, BatchRequest, EventKind, EventRef, RecordOutcome, WriteOutcome};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> PgPool {
    let config = DatabaseConfig {
        url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DatabaseConfig::default().url),
        ..Default::default()
    };
    let db = Database::connect(&config).await.unwrap();
    db.migrate(&sqlx::migrate!("./migrations")).await.unwrap();
    db.pool().clone()
}

/// 插入一个成员与一次小组聚会，返回 (member_id, meeting_id)
async fn seed(pool: &PgPool) -> (String, String) {
    let member_id = Uuid::now_v7().to_string();
    let meeting_id = Uuid::now_v7().to_string();

    sqlx::query("INSERT INTO users (id, first_name, role) VALUES ($1, 'Ana', 'USERLIDER')")
        .bind(&member_id)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO reuniao_celula (id, celula_id, data_reuniao) VALUES ($1, 'celula-1', $2)")
        .bind(&meeting_id)
        .bind(Utc.with_ymd_and_hms(2024, 2, 20, 23, 0, 0).unwrap())
        .execute(pool)
        .await
        .unwrap();

    (member_id, meeting_id)
}

#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_insert_if_absent_respects_unique_constraint() {
    let pool = setup().await;
    let (member_id, meeting_id) = seed(&pool).await;
    let repo = PresenceRepository::new(pool.clone());
    let event = EventRef::cell_meeting(&meeting_id);

    assert_eq!(
        repo.insert_if_absent(&event, &member_id, true).await.unwrap(),
        WriteOutcome::Created
    );
    assert_eq!(
        repo.insert_if_absent(&event, &member_id, false).await.unwrap(),
        WriteOutcome::Unchanged
    );

    let records = repo.list_by_event(&event).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].present);
}

#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_upsert_reports_insert_then_update() {
    let pool = setup().await;
    let (member_id, meeting_id) = seed(&pool).await;
    let repo = PresenceRepository::new(pool.clone());
    let event = EventRef::cell_meeting(&meeting_id);

    assert_eq!(
        repo.upsert(&event, &member_id, true).await.unwrap(),
        WriteOutcome::Created
    );
    assert_eq!(
        repo.upsert(&event, &member_id, false).await.unwrap(),
        WriteOutcome::Updated
    );

    let record = repo.find(&event, &member_id).await.unwrap().unwrap();
    assert!(!record.present);
    assert!(record.updated_at >= record.created_at);
}

#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_event_and_member_gateways() {
    let pool = setup().await;
    let (member_id, meeting_id) = seed(&pool).await;

    let events = EventRepository::new(pool.clone());
    let event = events
        .find_event(&EventRef::cell_meeting(&meeting_id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.scope_id, "celula-1");
    assert!(
        events
            .find_event(&EventRef::weekly_service(&meeting_id))
            .await
            .unwrap()
            .is_none()
    );

    let listed = events
        .list_events_between(
            EventKind::CellMeeting,
            Utc.with_ymd_and_hms(2024, 2, 1, 3, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 2, 59, 59).unwrap(),
        )
        .await
        .unwrap();
    assert!(listed.iter().any(|e| e.id == meeting_id));

    let members = MemberRepository::new(pool.clone());
    let member = members.find_member(&member_id).await.unwrap().unwrap();
    assert_eq!(member.name, "Ana");
    assert!(members.update_role(&member_id, "USERCENTRAL").await.unwrap());
    assert!(!members.update_role("ghost", "USERCENTRAL").await.unwrap());
}

#[tokio::test]
#[ignore] // 需要数据库连接
async fn test_concurrent_batches_against_postgres() {
    let pool = setup().await;
    let (member_id, meeting_id) = seed(&pool).await;

    let svc = Arc::new(PresenceService::new(
        Arc::new(EventRepository::new(pool.clone())),
        Arc::new(MemberRepository::new(pool.clone())),
        Arc::new(PresenceRepository::new(pool.clone())),
    ));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let svc = svc.clone();
            let request = BatchRequest::new(
                EventRef::cell_meeting(&meeting_id),
                vec![BatchEntry::new(&member_id, true)],
            );
            tokio::spawn(async move { svc.record(request).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        if result.results[0].outcome == RecordOutcome::Created {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    let records = PresenceRepository::new(pool)
        .list_by_event(&EventRef::cell_meeting(&meeting_id))
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
}
