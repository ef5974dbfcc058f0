//! 组织日历月窗口
//!
//! 出勤报表按组织所在时区的自然月分组，与请求来源或存储时区无关。

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};

/// 默认组织时区偏移（UTC-03:00）
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = -180;

/// 一个自然月的绝对时间范围，两端均包含
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// 月窗口解析器
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowResolver {
    offset: FixedOffset,
}

impl TimeWindowResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// 按分钟偏移构造，超出 ±24h 时返回 None
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    pub fn organization_default() -> Self {
        Self::from_offset_minutes(DEFAULT_UTC_OFFSET_MINUTES)
            .unwrap_or_else(|| Self::new(Utc.fix()))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 给定时刻所在的组织自然月
    ///
    /// `start` 为当月 1 日 00:00 本地时间，`end` 为下月 1 日 00:00 前 1 毫秒
    pub fn month_window(&self, instant: DateTime<Utc>) -> MonthWindow {
        let local = instant.with_timezone(&self.offset).date_naive();
        let first = local - Duration::days(i64::from(local.day0()));
        self.window_from_first_day(first)
    }

    /// 指定年月的组织自然月，月份不合法时返回 None
    pub fn month_window_of(&self, year: i32, month: u32) -> Option<MonthWindow> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| self.window_from_first_day(first))
    }

    fn window_from_first_day(&self, first: NaiveDate) -> MonthWindow {
        let later = first + Duration::days(32);
        let next_first = later - Duration::days(i64::from(later.day0()));

        let start = self.local_midnight_to_utc(first);
        let end = self.local_midnight_to_utc(next_first) - Duration::milliseconds(1);

        MonthWindow { start, end }
    }

    fn local_midnight_to_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        (local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

impl Default for TimeWindowResolver {
    fn default() -> Self {
        Self::organization_default()
    }
}
