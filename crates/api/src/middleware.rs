//! Request gates: authentication (bearer token) and authorization (permission).
//!
//! Authorization always runs inside authentication; it only reads the
//! identity the authentication gate attached and never looks at tokens.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use roleguard_auth::{authorize, session_key, Permission, RolePolicy};

use crate::app::errors::AccessError;
use crate::context::IdentityContext;
use crate::state::AppState;

/// Reject requests without a usable access token, or whose token or session
/// was revoked; otherwise attach [`IdentityContext`] and continue.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let token = bearer_token(req.headers())
        .ok_or(AccessError::Unauthenticated)?
        .to_owned();

    // Revocation is checked before the signature so a logged-out token is
    // refused even while it is still cryptographically valid.
    if state.revocations.contains(&token).await? {
        tracing::warn!(path = %req.uri().path(), "rejected revoked token");
        return Err(AccessError::TokenRevoked);
    }

    let claims = state.tokens.verify_access(&token).map_err(|_| {
        tracing::warn!(path = %req.uri().path(), "rejected invalid token");
        AccessError::InvalidToken
    })?;

    if state.revocations.contains(&session_key(&claims.sid)).await? {
        tracing::warn!(path = %req.uri().path(), "rejected token of a logged-out session");
        return Err(AccessError::TokenRevoked);
    }

    req.extensions_mut().insert(IdentityContext::new(claims.identity()));

    Ok(next.run(req).await)
}

/// Permission requirement for one group of routes.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    policy: Arc<RolePolicy>,
    required: Permission,
}

impl PermissionGate {
    pub fn new(policy: Arc<RolePolicy>, required: Permission) -> Self {
        Self { policy, required }
    }
}

pub async fn require_permission(
    State(gate): State<PermissionGate>,
    req: Request,
    next: Next,
) -> Result<Response, AccessError> {
    let identity = req
        .extensions()
        .get::<IdentityContext>()
        .map(IdentityContext::identity);

    if let Err(e) = authorize(identity, &gate.required, &gate.policy) {
        tracing::warn!(
            path = %req.uri().path(),
            required = %gate.required,
            role = identity.map(|i| i.role.as_str()).unwrap_or(""),
            "authorization denied"
        );
        return Err(e.into());
    }

    Ok(next.run(req).await)
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A missing header, a non-UTF-8 value, another scheme, or an empty token
/// all yield `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }

    Some(token)
}
