//! 出勤服务枚举类型定义

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validation::IdentifierPolicy;

/// 事件类型
///
/// 两类事件在存储层是不同的表，但共享同一套出勤处理流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// 每周礼拜（culto）的单次实例
    WeeklyService,
    /// 小组聚会（reunião de célula）
    CellMeeting,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeeklyService => "WEEKLY_SERVICE",
            Self::CellMeeting => "CELL_MEETING",
        }
    }

    /// 该类事件请求体所适用的 ID 校验策略
    ///
    /// 礼拜要求合法 UUID；小组聚会沿用宽松的非空字符串约定。
    pub fn identifier_policy(&self) -> IdentifierPolicy {
        match self {
            Self::WeeklyService => IdentifierPolicy::Strict,
            Self::CellMeeting => IdentifierPolicy::Permissive,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个成员的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    /// 首次记录
    Created,
    /// 已有记录被覆盖（仅 allowUpdate 时）
    Updated,
    /// 已有记录且未允许覆盖，保持原样
    Skipped,
    /// 该成员处理失败，不影响批次内其他成员
    Failed,
}

impl RecordOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// 单条失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    MemberNotFound,
    StorageFailure,
}

/// 批次整体状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    /// 所有成员均已处理（created / updated / skipped）
    Succeeded,
    /// 至少一个成员失败，其余已照常处理
    PartiallyFailed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "SUCCEEDED",
            Self::PartiallyFailed => "PARTIALLY_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&EventKind::WeeklyService).unwrap(),
            "\"WEEKLY_SERVICE\""
        );
        assert_eq!(EventKind::CellMeeting.to_string(), "CELL_MEETING");
    }

    #[test]
    fn test_identifier_policy_per_kind() {
        assert_eq!(
            EventKind::WeeklyService.identifier_policy(),
            IdentifierPolicy::Strict
        );
        assert_eq!(
            EventKind::CellMeeting.identifier_policy(),
            IdentifierPolicy::Permissive
        );
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&RecordOutcome::Skipped).unwrap(),
            "\"skipped\""
        );
        assert_eq!(
            serde_json::to_string(&FailureKind::MemberNotFound).unwrap(),
            "\"MEMBER_NOT_FOUND\""
        );
        assert_eq!(
            serde_json::to_string(&BatchStatus::PartiallyFailed).unwrap(),
            "\"PARTIALLY_FAILED\""
        );
    }
}
