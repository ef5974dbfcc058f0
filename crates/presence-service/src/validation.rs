//! 批量出勤请求体校验
//!
//! 在任何业务逻辑执行前，对未类型化的 JSON 请求体做结构与类型校验。
//! 一次性收集所有能检测到的问题，数组内的问题带上下标，便于调用方定位。
//!
//! 请求体形如：
//!
//! ```json
//! { "eventId": "...", "members": [{ "id": "...", "status": true }], "allowUpdate": false }
//! ```

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::models::{BatchEntry, BatchRequest, EventKind, EventRef};

/// ID 校验策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// 必须是规范形式的 UUID（小写、连字符分隔）
    ///
    /// 存储层按文本比较 ID，其他写法（大写、花括号、urn、无连字符）永远匹配不到记录
    Strict,
    /// 非空字符串即可
    Permissive,
}

impl IdentifierPolicy {
    /// 判断一个 ID 是否符合策略
    pub fn accepts(&self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        match self {
            Self::Strict => {
                Uuid::try_parse(value).is_ok_and(|id| id.hyphenated().to_string() == value)
            }
            Self::Permissive => true,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Strict => "必须是小写连字符格式的 UUID",
            Self::Permissive => "必须是非空字符串",
        }
    }
}

/// 违规类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    /// 请求体不是 JSON 对象
    MalformedPayload,
    InvalidReference,
    EmptyBatch,
    InvalidMember,
    InvalidFlag,
}

/// 单条校验违规
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    /// 出错字段路径，如 `members[2].status`
    pub field: String,
    /// 成员数组中的下标
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            index: None,
            message: message.into(),
        }
    }

    fn member(index: usize, field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ViolationKind::InvalidMember,
            field: format!("members[{index}].{field}"),
            index: Some(index),
            message: message.into(),
        }
    }
}

/// 校验报告：所有违规的集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// 请求体无法解析为 JSON 时的报告
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation::new(ViolationKind::MalformedPayload, "$", message)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// 是否存在某类违规
    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    /// 成员数组中出错的下标（升序去重）
    pub fn member_indexes(&self) -> Vec<usize> {
        let mut indexes: Vec<usize> = self.violations.iter().filter_map(|v| v.index).collect();
        indexes.dedup();
        indexes
    }

    fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationReport {}

/// 校验批量出勤请求体
///
/// 事件类型决定 ID 校验策略；成功时返回类型化的 `BatchRequest`。
pub fn validate_batch(payload: &Value, kind: EventKind) -> Result<BatchRequest, ValidationReport> {
    let policy = kind.identifier_policy();
    let mut report = ValidationReport::default();

    let Some(body) = payload.as_object() else {
        report.push(Violation::new(
            ViolationKind::MalformedPayload,
            "$",
            "请求体必须是 JSON 对象",
        ));
        return Err(report);
    };

    let event_id = check_event_reference(body, policy, &mut report);
    let entries = check_members(body, policy, &mut report);
    let allow_update = check_allow_update(body, &mut report);

    match (event_id, report.is_empty()) {
        (Some(event_id), true) => Ok(BatchRequest {
            event: EventRef::new(kind, event_id),
            entries,
            allow_update,
        }),
        _ => Err(report),
    }
}

fn check_event_reference(
    body: &Map<String, Value>,
    policy: IdentifierPolicy,
    report: &mut ValidationReport,
) -> Option<String> {
    match body.get("eventId") {
        Some(Value::String(id)) if policy.accepts(id) => Some(id.clone()),
        Some(Value::String(_)) => {
            report.push(Violation::new(
                ViolationKind::InvalidReference,
                "eventId",
                format!("eventId {}", policy.describe()),
            ));
            None
        }
        Some(Value::Null) | None => {
            report.push(Violation::new(
                ViolationKind::InvalidReference,
                "eventId",
                "eventId 不能为空",
            ));
            None
        }
        Some(_) => {
            report.push(Violation::new(
                ViolationKind::InvalidReference,
                "eventId",
                "eventId 必须是字符串",
            ));
            None
        }
    }
}

fn check_members(
    body: &Map<String, Value>,
    policy: IdentifierPolicy,
    report: &mut ValidationReport,
) -> Vec<BatchEntry> {
    let members = match body.get("members") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        Some(Value::Array(_)) | Some(Value::Null) | None => {
            report.push(Violation::new(
                ViolationKind::EmptyBatch,
                "members",
                "members 至少包含一个成员",
            ));
            return Vec::new();
        }
        Some(_) => {
            report.push(Violation::new(
                ViolationKind::EmptyBatch,
                "members",
                "members 必须是数组",
            ));
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(members.len());

    for (index, item) in members.iter().enumerate() {
        let Some(member) = item.as_object() else {
            report.push(Violation {
                kind: ViolationKind::InvalidMember,
                field: format!("members[{index}]"),
                index: Some(index),
                message: "成员条目必须是对象".to_string(),
            });
            continue;
        };

        let member_id = match member.get("id") {
            Some(Value::String(id)) if policy.accepts(id) => Some(id.clone()),
            Some(Value::String(_)) => {
                report.push(Violation::member(
                    index,
                    "id",
                    format!("id {}", policy.describe()),
                ));
                None
            }
            _ => {
                report.push(Violation::member(index, "id", "id 必须是非空字符串"));
                None
            }
        };

        let status = match member.get("status") {
            Some(Value::Bool(status)) => Some(*status),
            _ => {
                report.push(Violation::member(index, "status", "status 必须是布尔值"));
                None
            }
        };

        if let (Some(member_id), Some(present)) = (member_id, status) {
            entries.push(BatchEntry { member_id, present });
        }
    }

    entries
}

fn check_allow_update(body: &Map<String, Value>, report: &mut ValidationReport) -> bool {
    match body.get("allowUpdate") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Null) | None => false,
        Some(_) => {
            report.push(Violation::new(
                ViolationKind::InvalidFlag,
                "allowUpdate",
                "allowUpdate 必须是布尔值",
            ));
            false
        }
    }
}
