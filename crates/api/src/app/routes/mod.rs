use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use roleguard_auth::Permission;

use crate::middleware::{authenticate, require_permission, PermissionGate};
use crate::state::AppState;

pub mod access;
pub mod account;
pub mod system;

/// Full route table.
///
/// Permission gates are layered per group and the authentication gate
/// wraps them all, so authentication always runs first.
pub fn router(state: &AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin", get(access::admin))
        .route("/admin/update-role", put(access::update_role))
        .route_layer(from_fn_with_state(
            PermissionGate::new(state.policy.clone(), Permission::DASHBOARD_EDIT),
            require_permission,
        ));

    let moderator = Router::new()
        .route("/moderator", get(access::moderator))
        .route_layer(from_fn_with_state(
            PermissionGate::new(state.policy.clone(), Permission::WRITE),
            require_permission,
        ));

    let user = Router::new()
        .route("/user", get(access::user))
        .route_layer(from_fn_with_state(
            PermissionGate::new(state.policy.clone(), Permission::READ),
            require_permission,
        ));

    let protected = Router::new()
        .route("/profile", get(access::profile))
        .merge(admin)
        .merge(moderator)
        .merge(user)
        .route_layer(from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/login", post(account::login))
        .route("/createUser", post(account::create_user))
        .route("/refresh", post(account::refresh))
        .route("/logout", post(account::logout))
        .merge(protected)
}
