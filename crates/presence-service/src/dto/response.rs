//! 响应 DTO 定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BatchResult, Event, EventKind, EventRef, Member, PresenceRecord};
use crate::service::MonthSchedule;

/// API 统一响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<BatchResult> {
    /// 批处理响应：部分失败时仍返回结果，`code` 区分整体状态
    pub fn batch(result: BatchResult) -> Self {
        let message = if result.is_success() {
            "出勤已记录"
        } else {
            "部分成员处理失败"
        };
        Self {
            success: true,
            code: result.status.as_str().to_string(),
            message: message.to_string(),
            data: Some(result),
        }
    }
}

/// 某个事件的出勤列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPresencesDto {
    pub event_id: String,
    pub event_kind: EventKind,
    pub present_count: usize,
    pub absent_count: usize,
    pub records: Vec<PresenceRecord>,
}

impl EventPresencesDto {
    pub fn new(event: &EventRef, records: Vec<PresenceRecord>) -> Self {
        let present_count = records.iter().filter(|r| r.present).count();
        Self {
            event_id: event.id.clone(),
            event_kind: event.kind,
            present_count,
            absent_count: records.len() - present_count,
            records,
        }
    }
}

/// 月度事件列表
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthEventsDto {
    pub event_kind: EventKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub events: Vec<Event>,
}

impl MonthEventsDto {
    pub fn new(kind: EventKind, schedule: MonthSchedule) -> Self {
        Self {
            event_kind: kind,
            start: schedule.window.start,
            end: schedule.window.end,
            events: schedule.events,
        }
    }
}

/// 移动端成员信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberProfileDto {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
}

impl From<Member> for MemberProfileDto {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            role: member.role,
        }
    }
}

/// 角色设置结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignmentDto {
    pub member_id: String,
    /// 实际写入的持久化角色
    pub role: String,
}
