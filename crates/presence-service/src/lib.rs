//! 出勤记录服务
//!
//! 以幂等批处理的方式记录成员在每周礼拜与小组聚会上的出勤，
//! 并在管理后台、移动端与持久化层之间转换角色命名。
//!
//! ## 模块
//!
//! - `validation`: 批量请求体校验，一次报告全部问题
//! - `service`: 出勤批处理、月度事件查询、成员角色
//! - `repository`: 事件 / 成员 / 出勤记录仓储（PostgreSQL 与内存实现）
//! - `roles`: 角色词表转换
//! - `time_window`: 组织时区的自然月窗口

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod roles;
pub mod routes;
pub mod service;
pub mod state;
pub mod time_window;
pub mod validation;

pub use error::{PresenceError, Result};
pub use models::{
    BatchEntry, BatchRequest, BatchResult, BatchStatus, BatchSummary, Event, EventKind, EventRef,
    FailureKind, Member, MemberResult, PresenceRecord, RecordOutcome, WriteOutcome,
};
pub use roles::RoleNormalizer;
pub use time_window::{MonthWindow, TimeWindowResolver};
