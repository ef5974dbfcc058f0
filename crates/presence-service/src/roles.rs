//! 角色词表转换
//!
//! 管理后台、移动端与持久化层各自维护一套角色命名。这里只做尽力翻译：
//! 表中没有的角色原样返回，从不报错。

use std::collections::HashMap;
use std::sync::LazyLock;

/// 管理后台角色 -> 持久化角色
const ADMIN_TO_PERSISTED: &[(&str, &str)] = &[
    ("USER_CENTRAL", "USERCENTRAL"),
    ("USER_SUPERVISOR_AREA", "USERSUPERVISOR"),
    ("USER_SUPERVISOR_SETOR", "USERSUPERVISOR"),
    ("USER_LIDER", "USERLIDER"),
];

/// 持久化角色 -> 移动端角色
///
/// 历史数据中两种写法并存（带下划线与不带下划线），都映射到移动端写法
const PERSISTED_TO_MOBILE: &[(&str, &str)] = &[
    ("USER_CENTRAL", "USER_CENTRAL"),
    ("USER_SUPERVISOR", "USER_SUPERVISOR"),
    ("USER_LIDER", "USER_LIDER"),
    ("USERCENTRAL", "USER_CENTRAL"),
    ("USERSUPERVISOR", "USER_SUPERVISOR"),
    ("USERLIDER", "USER_LIDER"),
    ("USER_FINANCEIRO", "USER_FINANCEIRO"),
    ("ADMIN", "ADMIN"),
];

static STANDARD: LazyLock<RoleNormalizer> = LazyLock::new(|| {
    RoleNormalizer::from_tables(ADMIN_TO_PERSISTED, PERSISTED_TO_MOBILE)
});

/// 角色转换器
///
/// 进程启动后只读，可在任意线程共享
#[derive(Debug, Clone)]
pub struct RoleNormalizer {
    admin_to_persisted: HashMap<&'static str, &'static str>,
    persisted_to_mobile: HashMap<&'static str, &'static str>,
}

impl RoleNormalizer {
    /// 内置映射表
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    pub fn from_tables(
        admin_to_persisted: &[(&'static str, &'static str)],
        persisted_to_mobile: &[(&'static str, &'static str)],
    ) -> Self {
        Self {
            admin_to_persisted: admin_to_persisted.iter().copied().collect(),
            persisted_to_mobile: persisted_to_mobile.iter().copied().collect(),
        }
    }

    /// 管理后台角色转为持久化角色，未知角色原样返回
    pub fn to_persisted<'a>(&self, admin_role: &'a str) -> &'a str {
        self.admin_to_persisted
            .get(admin_role)
            .copied()
            .unwrap_or(admin_role)
    }

    /// 持久化角色转为移动端角色，未知角色原样返回
    pub fn to_mobile<'a>(&self, persisted_role: &'a str) -> &'a str {
        self.persisted_to_mobile
            .get(persisted_role)
            .copied()
            .unwrap_or(persisted_role)
    }
}
