//! 数据仓储层
//!
//! 事件与成员的查询网关，以及出勤记录的原子写入。
//!
//! - 仓储只负责持久化，不包含业务逻辑
//! - PostgreSQL 实现用于生产，`InMemoryStore` 用于开发与测试
//! - 服务层通过 trait 对象依赖仓储，便于 mock

mod event_repo;
mod member_repo;
mod memory;
mod presence_repo;
mod traits;

pub use event_repo::EventRepository;
pub use member_repo::MemberRepository;
pub use memory::InMemoryStore;
pub use presence_repo::PresenceRepository;
pub use traits::*;
