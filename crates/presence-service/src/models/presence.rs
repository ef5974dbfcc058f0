//! 出勤记录模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::EventKind;

/// 出勤记录
///
/// 每个 (成员, 事件) 至多一条，由存储层唯一约束保证
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub id: String,
    pub member_id: String,
    pub event_id: String,
    pub event_kind: EventKind,
    pub present: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 存储层原子写入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// 新插入一条记录
    Created,
    /// 覆盖了已有记录
    Updated,
    /// 已有记录，未做修改
    Unchanged,
}
