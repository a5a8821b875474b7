//! service 单元测试共用的调用方构造

use crate::{
    auth::{AuthUser, PrincipalKind},
    extractors::Actor,
};
use database::admin::model::AdminRole;

pub fn admin_actor_with_role(id: &str, role: AdminRole) -> Actor {
    let user = AuthUser {
        subject: id.to_string(),
        kind: PrincipalKind::Admin,
        role: Some(role),
        permissions: role.default_permissions().into_iter().collect(),
        token_id: format!("test-{}", id),
        token_exp: 0,
    };
    Actor::new(user, "127.0.0.1")
}

/// 超级管理员身份，权限全开
pub fn admin_actor(id: &str) -> Actor {
    admin_actor_with_role(id, AdminRole::SuperAdmin)
}

pub fn staff_actor(id: i64) -> Actor {
    let user = AuthUser {
        subject: id.to_string(),
        kind: PrincipalKind::Staff,
        role: None,
        permissions: Default::default(),
        token_id: format!("test-staff-{}", id),
        token_exp: 0,
    };
    Actor::new(user, "127.0.0.1")
}
