//! 出勤服务领域模型
//!
//! 成员与事件由持久化层拥有，核心只通过 ID 解析它们；
//! 出勤记录是本服务唯一负责写入的实体。

pub mod batch;
pub mod enums;
pub mod event;
pub mod member;
pub mod presence;

pub use batch::{BatchEntry, BatchRequest, BatchResult, BatchSummary, MemberResult};
pub use enums::{BatchStatus, EventKind, FailureKind, RecordOutcome};
pub use event::{Event, EventRef};
pub use member::Member;
pub use presence::{PresenceRecord, WriteOutcome};
