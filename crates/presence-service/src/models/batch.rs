//! 批量出勤请求与结果

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::enums::{BatchStatus, EventKind, FailureKind, RecordOutcome};
use super::event::EventRef;

/// 批次中的单个成员条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub member_id: String,
    pub present: bool,
}

impl BatchEntry {
    pub fn new(member_id: impl Into<String>, present: bool) -> Self {
        Self {
            member_id: member_id.into(),
            present,
        }
    }
}

/// 已通过结构校验的批量出勤请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub event: EventRef,
    /// 非空；允许重复的成员 ID
    pub entries: Vec<BatchEntry>,
    /// 是否允许覆盖已有记录，默认 false
    pub allow_update: bool,
}

impl BatchRequest {
    pub fn new(event: EventRef, entries: Vec<BatchEntry>) -> Self {
        Self {
            event,
            entries,
            allow_update: false,
        }
    }

    pub fn with_allow_update(mut self, allow_update: bool) -> Self {
        self.allow_update = allow_update;
        self
    }

    /// 按成员 ID 去重
    ///
    /// 保留每个 ID 首次出现的位置，取最后一次出现的出勤状态。
    pub fn deduplicated_entries(&self) -> Vec<BatchEntry> {
        let mut positions: HashMap<&str, usize> = HashMap::with_capacity(self.entries.len());
        let mut deduped: Vec<BatchEntry> = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            match positions.get(entry.member_id.as_str()) {
                Some(&index) => deduped[index].present = entry.present,
                None => {
                    positions.insert(entry.member_id.as_str(), deduped.len());
                    deduped.push(entry.clone());
                }
            }
        }

        deduped
    }
}

/// 单个成员的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResult {
    pub member_id: String,
    pub outcome: RecordOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
}

impl MemberResult {
    pub fn new(member_id: impl Into<String>, outcome: RecordOutcome) -> Self {
        Self {
            member_id: member_id.into(),
            outcome,
            error_kind: None,
        }
    }

    pub fn failed(member_id: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            member_id: member_id.into(),
            outcome: RecordOutcome::Failed,
            error_kind: Some(kind),
        }
    }
}

/// 批次计数汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub created_count: u32,
    pub updated_count: u32,
    pub skipped_count: u32,
    pub failed_count: u32,
}

impl BatchSummary {
    pub fn from_results(results: &[MemberResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result.outcome {
                RecordOutcome::Created => summary.created_count += 1,
                RecordOutcome::Updated => summary.updated_count += 1,
                RecordOutcome::Skipped => summary.skipped_count += 1,
                RecordOutcome::Failed => summary.failed_count += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> u32 {
        self.created_count + self.updated_count + self.skipped_count + self.failed_count
    }
}

/// 批量出勤处理结果
///
/// `results` 与去重后的输入顺序一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub event_id: String,
    pub event_kind: EventKind,
    pub status: BatchStatus,
    pub summary: BatchSummary,
    pub results: Vec<MemberResult>,
}

impl BatchResult {
    pub fn new(event: &EventRef, results: Vec<MemberResult>) -> Self {
        let summary = BatchSummary::from_results(&results);
        let status = if summary.failed_count > 0 {
            BatchStatus::PartiallyFailed
        } else {
            BatchStatus::Succeeded
        };

        Self {
            event_id: event.id.clone(),
            event_kind: event.kind,
            status,
            summary,
            results,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == BatchStatus::Succeeded
    }

    /// 查找某个成员的结果
    pub fn result_for(&self, member_id: &str) -> Option<&MemberResult> {
        self.results.iter().find(|r| r.member_id == member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(entries: Vec<BatchEntry>) -> BatchRequest {
        BatchRequest::new(EventRef::cell_meeting("reuniao-1"), entries)
    }

    #[test]
    fn test_dedup_keeps_last_status_at_first_position() {
        let req = request(vec![
            BatchEntry::new("m1", true),
            BatchEntry::new("m2", true),
            BatchEntry::new("m1", false),
            BatchEntry::new("m3", false),
            BatchEntry::new("m2", false),
        ]);

        let deduped = req.deduplicated_entries();

        assert_eq!(
            deduped,
            vec![
                BatchEntry::new("m1", false),
                BatchEntry::new("m2", false),
                BatchEntry::new("m3", false),
            ]
        );
    }

    #[test]
    fn test_dedup_without_duplicates_is_identity() {
        let entries = vec![BatchEntry::new("a", true), BatchEntry::new("b", false)];
        assert_eq!(request(entries.clone()).deduplicated_entries(), entries);
    }

    #[test]
    fn test_allow_update_defaults_to_false() {
        let req = request(vec![BatchEntry::new("m1", true)]);
        assert!(!req.allow_update);
        assert!(req.with_allow_update(true).allow_update);
    }

    #[test]
    fn test_batch_result_status_and_summary() {
        let event = EventRef::weekly_service("e1");
        let ok = BatchResult::new(
            &event,
            vec![
                MemberResult::new("m1", RecordOutcome::Created),
                MemberResult::new("m2", RecordOutcome::Skipped),
            ],
        );
        assert!(ok.is_success());
        assert_eq!(ok.summary.created_count, 1);
        assert_eq!(ok.summary.skipped_count, 1);
        assert_eq!(ok.summary.total(), 2);

        let partial = BatchResult::new(
            &event,
            vec![
                MemberResult::new("m1", RecordOutcome::Updated),
                MemberResult::failed("m2", FailureKind::MemberNotFound),
            ],
        );
        assert_eq!(partial.status, BatchStatus::PartiallyFailed);
        assert_eq!(partial.summary.failed_count, 1);
        assert_eq!(
            partial.result_for("m2").and_then(|r| r.error_kind),
            Some(FailureKind::MemberNotFound)
        );
    }

    #[test]
    fn test_member_result_serialization_omits_missing_error_kind() {
        let json = serde_json::to_value(MemberResult::new("m1", RecordOutcome::Created)).unwrap();
        assert_eq!(json["memberId"], "m1");
        assert_eq!(json["outcome"], "created");
        assert!(json.get("errorKind").is_none());
    }
}
