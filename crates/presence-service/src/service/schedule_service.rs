//! 月度事件查询服务
//!
//! 按组织时区的自然月列出礼拜或小组聚会

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::error::{PresenceError, Result};
use crate::models::{Event, EventKind};
use crate::repository::EventRepositoryTrait;
use crate::time_window::{MonthWindow, TimeWindowResolver};

/// 某个自然月内的事件
#[derive(Debug, Clone)]
pub struct MonthSchedule {
    pub window: MonthWindow,
    pub events: Vec<Event>,
}

pub struct ScheduleService {
    events: Arc<dyn EventRepositoryTrait>,
    resolver: TimeWindowResolver,
}

impl ScheduleService {
    pub fn new(events: Arc<dyn EventRepositoryTrait>, resolver: TimeWindowResolver) -> Self {
        Self { events, resolver }
    }

    pub fn resolver(&self) -> &TimeWindowResolver {
        &self.resolver
    }

    /// 列出 `at` 所在月份的事件
    #[instrument(skip(self))]
    pub async fn events_in_month(&self, kind: EventKind, at: DateTime<Utc>) -> Result<MonthSchedule> {
        let window = self.resolver.month_window(at);
        self.list(kind, window).await
    }

    /// 列出指定年月的事件
    #[instrument(skip(self))]
    pub async fn events_in_month_of(
        &self,
        kind: EventKind,
        year: i32,
        month: u32,
    ) -> Result<MonthSchedule> {
        let window = self
            .resolver
            .month_window_of(year, month)
            .ok_or_else(|| PresenceError::InvalidParameter(format!("无效的年月: {year}-{month}")))?;
        self.list(kind, window).await
    }

    async fn list(&self, kind: EventKind, window: MonthWindow) -> Result<MonthSchedule> {
        let events = self
            .events
            .list_events_between(kind, window.start, window.end)
            .await?;

        debug!(
            start = %window.start,
            end = %window.end,
            count = events.len(),
            "月度事件查询完成"
        );

        Ok(MonthSchedule { window, events })
    }
}
