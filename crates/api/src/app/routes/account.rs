//! Account routes: registration, login, token refresh, logout.
//!
//! Registration and login run before authentication (they establish it), so
//! they call the credential store and token service directly.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use roleguard_auth::{session_key, Identity, Role, TokenPair};
use roleguard_infra::NewUser;

use crate::app::dto::{self, CreateUserRequest, LoginRequest, RefreshRequest};
use crate::app::errors::{AccessError, AccountError};
use crate::middleware::bearer_token;
use crate::state::AppState;

/// POST /createUser
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AccountError> {
    let Json(body) = payload?;

    let (username, password) = match (body.username, body.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(AccountError::Validation(
                "Please provide username, password, and role".to_string(),
            ));
        }
    };
    // Taken verbatim: registration does not restrict which role a caller
    // may claim.
    let role = Role::from(body.role.unwrap_or_default());

    let credentials = state.credentials;
    let password_hash = tokio::task::spawn_blocking(move || credentials.hash(&password))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))??;

    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AccountError::UserExists);
    }

    let user = state
        .users
        .insert(NewUser {
            username,
            password_hash,
            role,
        })
        .await?;

    let tokens = state
        .tokens
        .issue(&Identity::new(user.username.clone(), user.role.clone()))?;
    let headers = dto::token_headers(&tokens).map_err(AccountError::Internal)?;

    tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "user registered");

    Ok((
        StatusCode::OK,
        headers,
        Json(json!({
            "status": 0,
            "description": "User registered successfully",
        })),
    ))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    request_headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AccountError> {
    let Json(body) = payload?;
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AccountError::UserNotFound)?;

    let credentials = state.credentials;
    let hashed = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || credentials.verify(&password, &hashed))
        .await
        .map_err(|e| AccountError::Internal(e.to_string()))??;

    if !matches {
        tracing::info!(username = %user.username, "login rejected: invalid password");
        return Err(AccountError::InvalidCredentials);
    }

    // A new login supersedes an old, revoked token presented with it, and
    // lifts the revocation of that token's session.
    if let Some(old_token) = bearer_token(&request_headers) {
        if state.revocations.contains(old_token).await? {
            state.revocations.remove(old_token).await?;
            if let Ok(old_claims) = state.tokens.verify(old_token) {
                state.revocations.remove(&session_key(&old_claims.sid)).await?;
            }
            tracing::debug!(username = %user.username, "old token removed from revocation registry");
        }
    }

    let tokens = state
        .tokens
        .issue(&Identity::new(user.username.clone(), user.role.clone()))?;

    tracing::info!(username = %user.username, role = %user.role, "user logged in");

    issued_response("Successful login", tokens)
}

/// POST /refresh
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AccountError> {
    let Json(body) = payload?;
    let refresh_token = body
        .refreshtoken
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AccountError::Validation("No refresh token provided".to_string()))?;

    if state.revocations.contains(&refresh_token).await? {
        return Err(AccountError::TokenRevoked);
    }

    let claims = state.tokens.verify_refresh(&refresh_token)?;
    if state.revocations.contains(&session_key(&claims.sid)).await? {
        return Err(AccountError::TokenRevoked);
    }

    let tokens = state.tokens.refresh(&claims)?;
    issued_response("Token refreshed", tokens)
}

/// POST /logout
///
/// Any presented string is blacklisted without verification. When it is a
/// valid token, its whole session is revoked too, so the refresh token from
/// the same login stops working.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AccessError> {
    let token = bearer_token(&headers).ok_or_else(|| AccessError::validation("No token provided"))?;

    state.revocations.add(token).await?;
    if let Ok(claims) = state.tokens.verify(token) {
        state.revocations.add(&session_key(&claims.sid)).await?;
    }
    tracing::info!("token revoked on logout");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

fn issued_response(
    description: &'static str,
    tokens: TokenPair,
) -> Result<(StatusCode, HeaderMap, Json<serde_json::Value>), AccountError> {
    let headers = dto::token_headers(&tokens).map_err(AccountError::Internal)?;
    Ok((
        StatusCode::OK,
        headers,
        Json(json!({
            "status": 0,
            "description": description,
            "tokens": tokens,
        })),
    ))
}
