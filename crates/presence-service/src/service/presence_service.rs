//! 出勤批处理服务
//!
//! 处理流程：
//!
//! 1. 解析事件引用，事件不存在则整批拒绝，不写入任何记录
//! 2. 按成员 ID 去重（同一成员以最后一次出现的状态为准）
//! 3. 逐个成员处理，互不影响：
//!    - 成员不存在 -> `failed` / `MEMBER_NOT_FOUND`
//!    - 未允许覆盖 -> 原子 create-if-absent，已存在则 `skipped`
//!    - 允许覆盖 -> 原子 upsert，`created` 或 `updated`
//!    - 存储出错 -> `failed` / `STORAGE_FAILURE`，不自动重试
//! 4. 按去重后的输入顺序返回结果与计数汇总
//!
//! 两类事件共用同一套流程，差异只在仓储层。

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, instrument, warn};

use celula_shared::observability::metrics as presence_metrics;

use crate::error::{PresenceError, Result};
use crate::models::{
    BatchEntry, BatchRequest, BatchResult, EventRef, FailureKind, MemberResult, PresenceRecord,
    RecordOutcome, WriteOutcome,
};
use crate::repository::{EventRepositoryTrait, MemberRepositoryTrait, PresenceRepositoryTrait};

/// 默认的批内并发度
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// 出勤批处理服务
pub struct PresenceService {
    events: Arc<dyn EventRepositoryTrait>,
    members: Arc<dyn MemberRepositoryTrait>,
    presences: Arc<dyn PresenceRepositoryTrait>,
    max_concurrency: usize,
}

impl PresenceService {
    pub fn new(
        events: Arc<dyn EventRepositoryTrait>,
        members: Arc<dyn MemberRepositoryTrait>,
        presences: Arc<dyn PresenceRepositoryTrait>,
    ) -> Self {
        Self {
            events,
            members,
            presences,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// 设置批内并发度，最小为 1
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// 记录一批出勤
    ///
    /// 只有事件不存在或事件查询失败时返回错误；单个成员的失败体现在结果中
    #[instrument(
        skip(self, request),
        fields(
            event_kind = %request.event.kind,
            event_id = %request.event.id,
            entry_count = request.entries.len(),
            allow_update = request.allow_update
        )
    )]
    pub async fn record(&self, request: BatchRequest) -> Result<BatchResult> {
        let started = Instant::now();
        let event = &request.event;

        if self.events.find_event(event).await?.is_none() {
            warn!("事件不存在，整批拒绝");
            return Err(PresenceError::EventNotFound(event.clone()));
        }

        let entries = request.deduplicated_entries();
        let allow_update = request.allow_update;

        let results: Vec<MemberResult> = stream::iter(entries)
            .map(|entry| self.process_entry(event, entry, allow_update))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let result = BatchResult::new(event, results);
        let kind = event.kind.as_str();

        presence_metrics::record_presence_batch(
            kind,
            result.status.as_str(),
            started.elapsed().as_secs_f64(),
        );
        for (outcome, count) in [
            (RecordOutcome::Created, result.summary.created_count),
            (RecordOutcome::Updated, result.summary.updated_count),
            (RecordOutcome::Skipped, result.summary.skipped_count),
            (RecordOutcome::Failed, result.summary.failed_count),
        ] {
            if count > 0 {
                presence_metrics::record_presence_outcome(kind, outcome.as_str(), u64::from(count));
            }
        }

        info!(
            status = result.status.as_str(),
            created = result.summary.created_count,
            updated = result.summary.updated_count,
            skipped = result.summary.skipped_count,
            failed = result.summary.failed_count,
            "出勤批处理完成"
        );

        Ok(result)
    }

    async fn process_entry(
        &self,
        event: &EventRef,
        entry: BatchEntry,
        allow_update: bool,
    ) -> MemberResult {
        let member_id = entry.member_id;

        match self.members.find_member(&member_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(member_id = %member_id, "成员不存在");
                return MemberResult::failed(member_id, FailureKind::MemberNotFound);
            }
            Err(e) => {
                warn!(member_id = %member_id, error = %e, "成员查询失败");
                return MemberResult::failed(member_id, FailureKind::StorageFailure);
            }
        }

        let written = if allow_update {
            self.presences.upsert(event, &member_id, entry.present).await
        } else {
            self.presences
                .insert_if_absent(event, &member_id, entry.present)
                .await
        };

        match written {
            Ok(WriteOutcome::Created) => MemberResult::new(member_id, RecordOutcome::Created),
            Ok(WriteOutcome::Updated) => MemberResult::new(member_id, RecordOutcome::Updated),
            Ok(WriteOutcome::Unchanged) => MemberResult::new(member_id, RecordOutcome::Skipped),
            Err(e) => {
                warn!(member_id = %member_id, error = %e, "出勤写入失败");
                MemberResult::failed(member_id, FailureKind::StorageFailure)
            }
        }
    }

    /// 列出某个事件的全部出勤记录
    #[instrument(skip(self), fields(event_kind = %event.kind, event_id = %event.id))]
    pub async fn list_presences(&self, event: &EventRef) -> Result<Vec<PresenceRecord>> {
        if self.events.find_event(event).await?.is_none() {
            return Err(PresenceError::EventNotFound(event.clone()));
        }
        self.presences.list_by_event(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BatchStatus, Event, EventKind, Member};
    use crate::repository::{
        MockEventRepositoryTrait, MockMemberRepositoryTrait, MockPresenceRepositoryTrait,
    };
    use chrono::Utc;

    fn existing_event(kind: EventKind, id: &str) -> Event {
        Event {
            id: id.to_string(),
            kind,
            scope_id: "scope-1".to_string(),
            starts_at: Utc::now(),
        }
    }

    fn event_repo_with(event: Option<Event>) -> MockEventRepositoryTrait {
        let mut repo = MockEventRepositoryTrait::new();
        repo.expect_find_event()
            .returning(move |_| Ok(event.clone()));
        repo
    }

    fn members_that_exist(known: &'static [&'static str]) -> MockMemberRepositoryTrait {
        let mut repo = MockMemberRepositoryTrait::new();
        repo.expect_find_member().returning(move |id| {
            Ok(known
                .iter()
                .any(|k| *k == id)
                .then(|| Member::new(id, format!("Membro {id}"))))
        });
        repo
    }

    fn service(
        events: MockEventRepositoryTrait,
        members: MockMemberRepositoryTrait,
        presences: MockPresenceRepositoryTrait,
    ) -> PresenceService {
        PresenceService::new(Arc::new(events), Arc::new(members), Arc::new(presences))
    }

    #[tokio::test]
    async fn test_event_not_found_writes_nothing() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences.expect_insert_if_absent().never();
        presences.expect_upsert().never();

        let mut members = MockMemberRepositoryTrait::new();
        members.expect_find_member().never();

        let svc = service(event_repo_with(None), members, presences);
        let request = BatchRequest::new(
            EventRef::weekly_service("missing"),
            vec![BatchEntry::new("m1", true)],
        );

        let err = svc.record(request).await.unwrap_err();
        assert!(matches!(err, PresenceError::EventNotFound(ref e) if e.id == "missing"));
    }

    #[tokio::test]
    async fn test_event_lookup_failure_aborts_batch() {
        let mut events = MockEventRepositoryTrait::new();
        events
            .expect_find_event()
            .returning(|_| Err(PresenceError::Database(sqlx::Error::PoolTimedOut)));

        let mut presences = MockPresenceRepositoryTrait::new();
        presences.expect_insert_if_absent().never();

        let svc = service(events, MockMemberRepositoryTrait::new(), presences);
        let request =
            BatchRequest::new(EventRef::cell_meeting("r1"), vec![BatchEntry::new("m1", true)]);

        let err = svc.record(request).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_default_policy_uses_create_if_absent() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences
            .expect_insert_if_absent()
            .withf(|event, member_id, present| {
                event.kind == EventKind::CellMeeting && member_id == "m1" && *present
            })
            .times(1)
            .returning(|_, _, _| Ok(WriteOutcome::Created));
        presences
            .expect_insert_if_absent()
            .withf(|_, member_id, _| member_id == "m2")
            .times(1)
            .returning(|_, _, _| Ok(WriteOutcome::Unchanged));
        presences.expect_upsert().never();

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::CellMeeting, "r1"))),
            members_that_exist(&["m1", "m2"]),
            presences,
        );
        let request = BatchRequest::new(
            EventRef::cell_meeting("r1"),
            vec![BatchEntry::new("m1", true), BatchEntry::new("m2", false)],
        );

        let result = svc.record(request).await.unwrap();

        assert_eq!(result.status, BatchStatus::Succeeded);
        assert_eq!(result.results[0].outcome, RecordOutcome::Created);
        assert_eq!(result.results[1].outcome, RecordOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_allow_update_uses_upsert() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences.expect_insert_if_absent().never();
        presences
            .expect_upsert()
            .times(1)
            .returning(|_, _, _| Ok(WriteOutcome::Updated));

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::WeeklyService, "c1"))),
            members_that_exist(&["m1"]),
            presences,
        );
        let request = BatchRequest::new(
            EventRef::weekly_service("c1"),
            vec![BatchEntry::new("m1", false)],
        )
        .with_allow_update(true);

        let result = svc.record(request).await.unwrap();

        assert_eq!(result.summary.updated_count, 1);
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_missing_member_does_not_abort_siblings() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences
            .expect_insert_if_absent()
            .withf(|_, member_id, _| member_id != "m2")
            .times(2)
            .returning(|_, _, _| Ok(WriteOutcome::Created));

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::CellMeeting, "r1"))),
            members_that_exist(&["m1", "m3"]),
            presences,
        );
        let request = BatchRequest::new(
            EventRef::cell_meeting("r1"),
            vec![
                BatchEntry::new("m1", true),
                BatchEntry::new("m2", true),
                BatchEntry::new("m3", false),
            ],
        );

        let result = svc.record(request).await.unwrap();

        assert_eq!(result.status, BatchStatus::PartiallyFailed);
        let ids: Vec<&str> = result.results.iter().map(|r| r.member_id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
        assert_eq!(
            result.result_for("m2").unwrap().error_kind,
            Some(FailureKind::MemberNotFound)
        );
        assert_eq!(result.summary.created_count, 2);
        assert_eq!(result.summary.failed_count, 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_per_entry() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences
            .expect_insert_if_absent()
            .returning(|_, member_id, _| {
                if member_id == "m1" {
                    Err(PresenceError::Database(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(WriteOutcome::Created)
                }
            });

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::CellMeeting, "r1"))),
            members_that_exist(&["m1", "m2"]),
            presences,
        );
        let request = BatchRequest::new(
            EventRef::cell_meeting("r1"),
            vec![BatchEntry::new("m1", true), BatchEntry::new("m2", true)],
        );

        let result = svc.record(request).await.unwrap();

        assert_eq!(result.status, BatchStatus::PartiallyFailed);
        assert_eq!(
            result.results[0].error_kind,
            Some(FailureKind::StorageFailure)
        );
        assert_eq!(result.results[1].outcome, RecordOutcome::Created);
    }

    #[tokio::test]
    async fn test_member_lookup_failure_is_storage_failure() {
        let mut members = MockMemberRepositoryTrait::new();
        members
            .expect_find_member()
            .returning(|_| Err(PresenceError::Database(sqlx::Error::PoolClosed)));

        let mut presences = MockPresenceRepositoryTrait::new();
        presences.expect_insert_if_absent().never();

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::CellMeeting, "r1"))),
            members,
            presences,
        );
        let request =
            BatchRequest::new(EventRef::cell_meeting("r1"), vec![BatchEntry::new("m1", true)]);

        let result = svc.record(request).await.unwrap();
        assert_eq!(
            result.results[0].error_kind,
            Some(FailureKind::StorageFailure)
        );
    }

    #[tokio::test]
    async fn test_duplicates_write_once_with_last_status() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences
            .expect_insert_if_absent()
            .withf(|_, member_id, present| member_id == "m1" && !*present)
            .times(1)
            .returning(|_, _, _| Ok(WriteOutcome::Created));

        let svc = service(
            event_repo_with(Some(existing_event(EventKind::CellMeeting, "r1"))),
            members_that_exist(&["m1"]),
            presences,
        );
        let request = BatchRequest::new(
            EventRef::cell_meeting("r1"),
            vec![BatchEntry::new("m1", true), BatchEntry::new("m1", false)],
        );

        let result = svc.record(request).await.unwrap();
        assert_eq!(result.results.len(), 1);
    }

    #[tokio::test]
    async fn test_list_presences_requires_event() {
        let mut presences = MockPresenceRepositoryTrait::new();
        presences.expect_list_by_event().never();

        let svc = service(
            event_repo_with(None),
            MockMemberRepositoryTrait::new(),
            presences,
        );

        let err = svc
            .list_presences(&EventRef::weekly_service("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "EVENT_NOT_FOUND");
    }
}
