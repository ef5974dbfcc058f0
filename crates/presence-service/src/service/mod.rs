//! 业务服务层

mod member_service;
mod presence_service;
mod schedule_service;

pub use member_service::MemberService;
pub use presence_service::{DEFAULT_MAX_CONCURRENCY, PresenceService};
pub use schedule_service::{MonthSchedule, ScheduleService};
