//! 请求 DTO 定义
//!
//! 批量出勤请求体不在这里定义：它以未类型化 JSON 接收，交给 `validation` 模块逐项校验

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// 月度事件查询参数
///
/// `at` 与 `year`/`month` 二选一；都不提供时取当前月份
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_month_selector"))]
pub struct MonthQuery {
    pub at: Option<DateTime<Utc>>,
    #[validate(range(min = 1970, max = 9999, message = "年份必须在1970-9999之间"))]
    pub year: Option<i32>,
    #[validate(range(min = 1, max = 12, message = "月份必须在1-12之间"))]
    pub month: Option<u32>,
}

/// 解析后的月份选择
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthSelector {
    Instant(DateTime<Utc>),
    YearMonth(i32, u32),
    Current,
}

impl MonthQuery {
    /// 在 `validate()` 通过后调用
    pub fn selector(&self) -> MonthSelector {
        match (self.at, self.year, self.month) {
            (Some(at), _, _) => MonthSelector::Instant(at),
            (None, Some(year), Some(month)) => MonthSelector::YearMonth(year, month),
            _ => MonthSelector::Current,
        }
    }
}

fn validate_month_selector(query: &MonthQuery) -> Result<(), ValidationError> {
    if query.year.is_some() != query.month.is_some() {
        let mut error = ValidationError::new("year_month_pair");
        error.message = Some("year 与 month 必须同时提供".into());
        return Err(error);
    }
    if query.at.is_some() && query.year.is_some() {
        let mut error = ValidationError::new("ambiguous_month");
        error.message = Some("at 与 year/month 不能同时提供".into());
        return Err(error);
    }
    Ok(())
}

/// 设置成员角色请求（管理后台词表）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    #[validate(length(min = 1, max = 50, message = "角色长度必须在1-50个字符之间"))]
    pub role: String,
}
