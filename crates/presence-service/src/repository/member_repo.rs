//! 成员仓储
//!
//! 成员数据归用户管理模块所有，这里只读取展示名与角色，并允许更新角色

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::MemberRepositoryTrait;
use crate::error::Result;
use crate::models::Member;

pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn find_member(&self, member_id: &str) -> Result<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, first_name AS name, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn update_role(&self, member_id: &str, role: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET role = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
