//! HTTP 请求处理器

pub mod member;
pub mod presence;
pub mod schedule;
