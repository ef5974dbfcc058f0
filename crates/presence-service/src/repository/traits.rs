//! 仓储 Trait 定义
//!
//! 服务层只依赖这些接口，具体实现（PostgreSQL / 内存）在启动时注入

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Event, EventKind, EventRef, Member, PresenceRecord, WriteOutcome};

/// 事件仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepositoryTrait: Send + Sync {
    async fn find_event(&self, event: &EventRef) -> Result<Option<Event>>;

    /// 列出开始时间落在 `[start, end]` 内的事件，按开始时间升序
    async fn list_events_between(
        &self,
        kind: EventKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Event>>;
}

/// 成员仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemberRepositoryTrait: Send + Sync {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>>;

    /// 更新角色（持久化词表），成员不存在时返回 false
    async fn update_role(&self, member_id: &str, role: &str) -> Result<bool>;
}

/// 出勤记录仓储接口
///
/// 写操作必须是单条原子语句，由唯一约束保证 (成员, 事件) 至多一条记录
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceRepositoryTrait: Send + Sync {
    /// 不存在时创建；已存在时不做修改，返回 `Unchanged`
    async fn insert_if_absent(
        &self,
        event: &EventRef,
        member_id: &str,
        present: bool,
    ) -> Result<WriteOutcome>;

    /// 不存在时创建，已存在时覆盖出勤状态
    async fn upsert(&self, event: &EventRef, member_id: &str, present: bool)
    -> Result<WriteOutcome>;

    async fn find(&self, event: &EventRef, member_id: &str) -> Result<Option<PresenceRecord>>;

    async fn list_by_event(&self, event: &EventRef) -> Result<Vec<PresenceRecord>>;
}
