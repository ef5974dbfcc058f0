//! 成员角色处理器

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::{
    dto::{ApiResponse, AssignRoleRequest, MemberProfileDto, RoleAssignmentDto},
    error::PresenceError,
    state::AppState,
};

/// 移动端获取成员信息
///
/// GET /api/mobile/membros/{id}
pub async fn get_mobile_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MemberProfileDto>>, PresenceError> {
    let member = state.member_service.mobile_profile(&id).await?;
    Ok(Json(ApiResponse::success(member.into())))
}

/// 管理后台设置成员角色
///
/// PUT /api/admin/membros/{id}/role
pub async fn assign_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignRoleRequest>,
) -> Result<Json<ApiResponse<RoleAssignmentDto>>, PresenceError> {
    req.validate()?;

    let role = state.member_service.assign_role(&id, &req.role).await?;

    Ok(Json(ApiResponse::success_with_message(
        RoleAssignmentDto {
            member_id: id,
            role,
        },
        "角色已更新",
    )))
}
