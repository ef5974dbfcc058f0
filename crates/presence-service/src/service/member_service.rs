//! 成员角色服务
//!
//! 角色跨系统边界时在这里做词表转换：写入前 admin -> 持久化，
//! 返回移动端前 持久化 -> mobile

use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{PresenceError, Result};
use crate::models::Member;
use crate::repository::MemberRepositoryTrait;
use crate::roles::RoleNormalizer;

pub struct MemberService {
    members: Arc<dyn MemberRepositoryTrait>,
    roles: &'static RoleNormalizer,
}

impl MemberService {
    pub fn new(members: Arc<dyn MemberRepositoryTrait>) -> Self {
        Self::with_roles(members, RoleNormalizer::standard())
    }

    pub fn with_roles(members: Arc<dyn MemberRepositoryTrait>, roles: &'static RoleNormalizer) -> Self {
        Self { members, roles }
    }

    /// 移动端视角的成员信息，角色已转换为移动端词表
    #[instrument(skip(self))]
    pub async fn mobile_profile(&self, member_id: &str) -> Result<Member> {
        let mut member = self
            .members
            .find_member(member_id)
            .await?
            .ok_or_else(|| PresenceError::MemberNotFound(member_id.to_string()))?;

        member.role = member
            .role
            .as_deref()
            .map(|role| self.roles.to_mobile(role).to_string());

        Ok(member)
    }

    /// 以管理后台词表设置角色，返回实际写入的持久化角色
    #[instrument(skip(self))]
    pub async fn assign_role(&self, member_id: &str, admin_role: &str) -> Result<String> {
        let persisted = self.roles.to_persisted(admin_role);

        if !self.members.update_role(member_id, persisted).await? {
            return Err(PresenceError::MemberNotFound(member_id.to_string()));
        }

        info!(admin_role = %admin_role, persisted_role = %persisted, "成员角色已更新");
        Ok(persisted.to_string())
    }
}
