//! Protected resources. Every handler here runs behind the authentication
//! gate, and all but `/profile` also behind a permission gate.

use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use roleguard_auth::Role;

use crate::app::dto::UpdateRoleRequest;
use crate::app::errors::AccessError;
use crate::context::IdentityContext;
use crate::state::AppState;

/// GET /admin
pub async fn admin(State(state): State<AppState>) -> Result<impl IntoResponse, AccessError> {
    let users = state.users.list().await?;

    Ok(Json(json!({
        "message": "Admin access granted: You have the required permission to view this page.",
        "users": users,
    })))
}

/// PUT /admin/update-role
pub async fn update_role(
    State(state): State<AppState>,
    Extension(caller): Extension<IdentityContext>,
    payload: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AccessError> {
    let Json(body) = payload?;

    let new_role = body
        .new_role
        .map(Role::from)
        .filter(Role::is_assignable)
        .ok_or_else(|| AccessError::validation("Invalid role specified"))?;

    let user_id = body
        .user_id
        .as_ref()
        .and_then(|input| input.parse().ok())
        .ok_or_else(|| AccessError::validation("Invalid user id specified"))?;

    let updated = state
        .users
        .update_role(user_id, &new_role)
        .await?
        .ok_or_else(|| AccessError::not_found("User not found or role update failed"))?;

    tracing::info!(
        user_id = %updated.id,
        new_role = %updated.role,
        changed_by = %caller.username(),
        "user role updated"
    );

    Ok(Json(json!({
        "message": "User role updated successfully",
        "updatedUser": updated,
    })))
}

/// GET /moderator
pub async fn moderator() -> impl IntoResponse {
    Json(json!({
        "message": "Moderator access granted: You have the required permission to view this page.",
    }))
}

/// GET /user
pub async fn user() -> impl IntoResponse {
    Json(json!({
        "message": "User access granted: You have the required permission to view this page.",
    }))
}

/// GET /profile
pub async fn profile(Extension(caller): Extension<IdentityContext>) -> impl IntoResponse {
    Json(json!({
        "message": format!("Hello {}, your role is {}.", caller.username(), caller.role()),
    }))
}
