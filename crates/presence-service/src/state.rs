//! 应用状态定义

use std::sync::Arc;

use sqlx::PgPool;

use crate::repository::{
    EventRepository, EventRepositoryTrait, InMemoryStore, MemberRepository,
    MemberRepositoryTrait, PresenceRepository, PresenceRepositoryTrait,
};
use crate::service::{MemberService, PresenceService, ScheduleService};
use crate::time_window::TimeWindowResolver;

/// Axum 应用共享状态
///
/// 服务通过 Arc 在 handler 间共享，仓储实现在构造时注入
#[derive(Clone)]
pub struct AppState {
    pub presence_service: Arc<PresenceService>,
    pub schedule_service: Arc<ScheduleService>,
    pub member_service: Arc<MemberService>,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventRepositoryTrait>,
        members: Arc<dyn MemberRepositoryTrait>,
        presences: Arc<dyn PresenceRepositoryTrait>,
        resolver: TimeWindowResolver,
        max_concurrency: usize,
    ) -> Self {
        let presence_service = PresenceService::new(events.clone(), members.clone(), presences)
            .with_max_concurrency(max_concurrency);

        Self {
            presence_service: Arc::new(presence_service),
            schedule_service: Arc::new(ScheduleService::new(events, resolver)),
            member_service: Arc::new(MemberService::new(members)),
        }
    }

    /// 基于 PostgreSQL 仓储构造
    pub fn with_pool(pool: PgPool, resolver: TimeWindowResolver, max_concurrency: usize) -> Self {
        Self::new(
            Arc::new(EventRepository::new(pool.clone())),
            Arc::new(MemberRepository::new(pool.clone())),
            Arc::new(PresenceRepository::new(pool)),
            resolver,
            max_concurrency,
        )
    }

    /// 基于内存仓储构造
    pub fn in_memory(store: InMemoryStore, resolver: TimeWindowResolver) -> Self {
        let store = Arc::new(store);
        Self::new(
            store.clone(),
            store.clone(),
            store,
            resolver,
            crate::service::DEFAULT_MAX_CONCURRENCY,
        )
    }
}
