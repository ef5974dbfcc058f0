//! 事件模型

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::EventKind;

/// 对某个事件的引用：类型 + ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub kind: EventKind,
    pub id: String,
}

impl EventRef {
    pub fn new(kind: EventKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn weekly_service(id: impl Into<String>) -> Self {
        Self::new(EventKind::WeeklyService, id)
    }

    pub fn cell_meeting(id: impl Into<String>) -> Self {
        Self::new(EventKind::CellMeeting, id)
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// 已存在的事件
///
/// 核心从不创建事件，只在记录出勤前确认其存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub kind: EventKind,
    /// 所属范围：礼拜系列 ID 或小组 ID
    pub scope_id: String,
    pub starts_at: DateTime<Utc>,
}

impl Event {
    pub fn event_ref(&self) -> EventRef {
        EventRef::new(self.kind, self.id.clone())
    }
}
