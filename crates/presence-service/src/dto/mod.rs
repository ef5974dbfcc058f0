//! 数据传输对象（DTO）

pub mod request;
pub mod response;

pub use request::{AssignRoleRequest, MonthQuery, MonthSelector};
pub use response::{
    ApiResponse, EventPresencesDto, MemberProfileDto, MonthEventsDto, RoleAssignmentDto,
};
