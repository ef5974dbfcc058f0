//! 内存存储
//!
//! 基于 DashMap 实现全部仓储接口，用于本地开发与确定性测试。
//! 出勤写入通过 entry API 在同一个分片锁内完成判断与写入，与数据库唯一约束语义一致。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use uuid::Uuid;

use super::traits::{EventRepositoryTrait, MemberRepositoryTrait, PresenceRepositoryTrait};
use crate::error::{PresenceError, Result};
use crate::models::{Event, EventKind, EventRef, Member, PresenceRecord, WriteOutcome};

type PresenceKey = (EventRef, String);

/// 内存仓储
///
/// 克隆后共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    events: Arc<DashMap<EventRef, Event>>,
    members: Arc<DashMap<String, Member>>,
    presences: Arc<DashMap<PresenceKey, PresenceRecord>>,
    failing_members: Arc<DashSet<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&self, event: Event) {
        self.events.insert(event.event_ref(), event);
    }

    pub fn add_member(&self, member: Member) {
        self.members.insert(member.id.clone(), member);
    }

    /// 让指定成员的出勤写入返回存储错误，用于模拟存储故障
    pub fn fail_writes_for(&self, member_id: impl Into<String>) {
        self.failing_members.insert(member_id.into());
    }

    /// 出勤记录总数
    pub fn presence_count(&self) -> usize {
        self.presences.len()
    }

    fn check_writable(&self, member_id: &str) -> Result<()> {
        if self.failing_members.contains(member_id) {
            return Err(PresenceError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn new_record(event: &EventRef, member_id: &str, present: bool) -> PresenceRecord {
        let now = Utc::now();
        PresenceRecord {
            id: Uuid::now_v7().to_string(),
            member_id: member_id.to_string(),
            event_id: event.id.clone(),
            event_kind: event.kind,
            present,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl EventRepositoryTrait for InMemoryStore {
    async fn find_event(&self, event: &EventRef) -> Result<Option<Event>> {
        Ok(self.events.get(event).map(|e| e.value().clone()))
    }

    async fn list_events_between(
        &self,
        kind: EventKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| e.kind == kind && e.starts_at >= start && e.starts_at <= end)
            .map(|e| e.value().clone())
            .collect();
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }
}

#[async_trait]
impl MemberRepositoryTrait for InMemoryStore {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>> {
        Ok(self.members.get(member_id).map(|m| m.value().clone()))
    }

    async fn update_role(&self, member_id: &str, role: &str) -> Result<bool> {
        Ok(match self.members.get_mut(member_id) {
            Some(mut member) => {
                member.role = Some(role.to_string());
                true
            }
            None => false,
        })
    }
}

#[async_trait]
impl PresenceRepositoryTrait for InMemoryStore {
    async fn insert_if_absent(
        &self,
        event: &EventRef,
        member_id: &str,
        present: bool,
    ) -> Result<WriteOutcome> {
        self.check_writable(member_id)?;

        match self.presences.entry((event.clone(), member_id.to_string())) {
            Entry::Occupied(_) => Ok(WriteOutcome::Unchanged),
            Entry::Vacant(slot) => {
                slot.insert(Self::new_record(event, member_id, present));
                Ok(WriteOutcome::Created)
            }
        }
    }

    async fn upsert(
        &self,
        event: &EventRef,
        member_id: &str,
        present: bool,
    ) -> Result<WriteOutcome> {
        self.check_writable(member_id)?;

        match self.presences.entry((event.clone(), member_id.to_string())) {
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                record.present = present;
                record.updated_at = Utc::now();
                Ok(WriteOutcome::Updated)
            }
            Entry::Vacant(slot) => {
                slot.insert(Self::new_record(event, member_id, present));
                Ok(WriteOutcome::Created)
            }
        }
    }

    async fn find(&self, event: &EventRef, member_id: &str) -> Result<Option<PresenceRecord>> {
        Ok(self
            .presences
            .get(&(event.clone(), member_id.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn list_by_event(&self, event: &EventRef) -> Result<Vec<PresenceRecord>> {
        let mut records: Vec<PresenceRecord> = self
            .presences
            .iter()
            .filter(|r| &r.key().0 == event)
            .map(|r| r.value().clone())
            .collect();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.member_id.cmp(&b.member_id))
        });
        Ok(records)
    }
}
