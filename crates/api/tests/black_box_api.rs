use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use roleguard_api::state::AppState;
use roleguard_auth::{
    Claims, CredentialStore, InMemoryRevocationRegistry, RevocationError, RevocationRegistry, Role,
    TokenKind, TokenService,
};
use roleguard_core::UserId;
use roleguard_infra::{InMemoryUserStore, NewUser, StoreError, UserRecord, UserStore, UserSummary};
use serde_json::{json, Value};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory backends, cheap bcrypt, ephemeral port.
        let state = AppState::in_memory(SECRET, CredentialStore::with_cost(4))
            .expect("failed to build state");
        Self::spawn_with(state).await
    }

    async fn spawn_with(state: AppState) -> Self {
        let app = roleguard_api::app::build_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str, password: &str, role: &str) -> reqwest::Response {
        self.client
            .post(self.url("/createUser"))
            .json(&json!({ "username": username, "password": password, "role": role }))
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register + login, returning `(accesstoken, refreshtoken)`.
    async fn session(&self, username: &str, role: &str) -> (String, String) {
        assert_eq!(self.register(username, "pw", role).await.status(), StatusCode::OK);
        let res = self.login(username, "pw").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        (
            body["tokens"]["accesstoken"].as_str().unwrap().to_string(),
            body["tokens"]["refreshtoken"].as_str().unwrap().to_string(),
        )
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn logout(&self, token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/logout"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, role: &str, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = Claims {
        username: "mallory".to_string(),
        role: Role::new(role.to_string()),
        typ: TokenKind::Access,
        jti: "forged".to_string(),
        sid: "forged-session".to_string(),
        iat: (now - ChronoDuration::hours(2)).timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// User store whose every call fails like a lost database connection.
struct UnavailableUserStore;

#[async_trait]
impl UserStore for UnavailableUserStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn insert(&self, _user: NewUser) -> Result<UserRecord, StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn list(&self) -> Result<Vec<UserSummary>, StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }

    async fn update_role(&self, _id: UserId, _role: &Role) -> Result<Option<UserSummary>, StoreError> {
        Err(StoreError::Database("connection refused".to_string()))
    }
}

/// Revocation registry whose backend is unreachable.
struct UnavailableRegistry;

#[async_trait]
impl RevocationRegistry for UnavailableRegistry {
    async fn add(&self, _entry: &str) -> Result<(), RevocationError> {
        Err(RevocationError::Backend("connection reset".to_string()))
    }

    async fn remove(&self, _entry: &str) -> Result<(), RevocationError> {
        Err(RevocationError::Backend("connection reset".to_string()))
    }

    async fn contains(&self, _entry: &str) -> Result<bool, RevocationError> {
        Err(RevocationError::Backend("connection reset".to_string()))
    }
}

fn state_with(users: Arc<dyn UserStore>, revocations: Arc<dyn RevocationRegistry>) -> AppState {
    AppState::new(
        TokenService::new(SECRET).unwrap(),
        CredentialStore::with_cost(4),
        users,
        revocations,
    )
}

async fn message(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["message"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn root_and_health_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello, World");

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_and_duplicate_registration() {
    let srv = TestServer::spawn().await;

    let res = srv.register("alice", "p1", "user").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access_token").is_some());
    assert!(res.headers().get("refresh_token").is_some());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], 0);
    assert_eq!(body["description"], "User registered successfully");

    let res = srv.login("alice", "p1").await;
    assert_eq!(res.status(), StatusCode::OK);
    let header_token = res.headers()["access_token"].to_str().unwrap().to_string();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "Successful login");
    let access = body["tokens"]["accesstoken"].as_str().unwrap();
    let refresh = body["tokens"]["refreshtoken"].as_str().unwrap();
    assert_eq!(access, header_token);
    assert_ne!(access, refresh);
    assert_eq!(access.split('.').count(), 3);

    let res = srv.login("alice", "wrong").await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": -1, "description": "Invalid password" }));

    let res = srv.register("alice", "p2", "user").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "User already exists");
}

#[tokio::test]
async fn login_unknown_user_is_not_found() {
    let srv = TestServer::spawn().await;

    let res = srv.login("nobody", "pw").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "User not found");
}

#[tokio::test]
async fn registration_requires_username_and_password() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/createUser"))
        .json(&json!({ "username": "bob" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], -1);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/admin")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await, "Access Denied");
}

#[tokio::test]
async fn forged_and_expired_tokens_are_invalid() {
    let srv = TestServer::spawn().await;

    let forged = mint_jwt("some-other-secret", "admin", ChronoDuration::minutes(10));
    let res = srv.get("/admin", &forged).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(res).await, "Invalid Token");

    let expired = mint_jwt(SECRET, "admin", ChronoDuration::minutes(-10));
    let res = srv.get("/profile", &expired).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(res).await, "Invalid Token");

    let valid = mint_jwt(SECRET, "admin", ChronoDuration::minutes(10));
    let res = srv.get("/profile", &valid).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(message(res).await, "Hello mallory, your role is admin.");
}

#[tokio::test]
async fn roles_are_checked_against_the_policy() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.session("carol", "user").await;

    let res = srv.get("/user", &token).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        message(res).await,
        "User access granted: You have the required permission to view this page."
    );

    let res = srv.get("/moderator", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        message(res).await,
        "Access Forbidden: You do not have the required permissions"
    );

    let res = srv.get("/admin", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (token, _) = srv.session("dave", "moderator").await;
    assert_eq!(srv.get("/moderator", &token).await.status(), StatusCode::OK);
    assert_eq!(srv.get("/user", &token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_role_is_told_to_log_in() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/createUser"))
        .json(&json!({ "username": "erin", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = srv.login("erin", "pw").await.json().await.unwrap();
    let token = body["tokens"]["accesstoken"].as_str().unwrap();

    let res = srv.get("/user", token).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(res).await, "No user role found, please log in");

    // Authentication alone still succeeds.
    assert_eq!(srv.get("/profile", token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_revokes_the_token() {
    let srv = TestServer::spawn().await;
    let (token, _) = srv.session("frank", "user").await;

    assert_eq!(srv.get("/profile", &token).await.status(), StatusCode::OK);

    let res = srv.logout(&token).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(message(res).await, "Logged out successfully");

    let res = srv.get("/profile", &token).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(res).await, "Token has been invalidated");

    // Logging out twice is harmless.
    assert_eq!(srv.logout(&token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_without_token_is_rejected() {
    let srv = TestServer::spawn().await;

    let res = srv.client.post(srv.url("/logout")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(res).await, "No token provided");
}

#[tokio::test]
async fn login_with_revoked_token_lifts_the_revocation() {
    let srv = TestServer::spawn().await;
    let (old_token, _) = srv.session("grace", "user").await;

    srv.logout(&old_token).await;
    assert_eq!(srv.get("/profile", &old_token).await.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/login"))
        .bearer_auth(&old_token)
        .json(&json!({ "username": "grace", "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    assert_eq!(srv.get("/profile", &old_token).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_tokens_only_work_on_refresh() {
    let srv = TestServer::spawn().await;
    let (access, refresh) = srv.session("heidi", "user").await;

    let res = srv.get("/profile", &refresh).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(res).await, "Invalid Token");

    let res = srv
        .client
        .post(srv.url("/refresh"))
        .json(&json!({ "refreshtoken": access }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/refresh"))
        .json(&json!({ "refreshtoken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "Token refreshed");
    let new_access = body["tokens"]["accesstoken"].as_str().unwrap();
    assert_eq!(srv.get("/profile", new_access).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn revoked_refresh_token_cannot_be_exchanged() {
    let srv = TestServer::spawn().await;
    let (_, refresh) = srv.session("ivan", "user").await;

    srv.logout(&refresh).await;

    let res = srv
        .client
        .post(srv.url("/refresh"))
        .json(&json!({ "refreshtoken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "Token has been invalidated");
}

#[tokio::test]
async fn admin_lists_users_and_updates_roles() {
    let srv = TestServer::spawn().await;
    let (admin, _) = srv.session("judy", "admin").await;
    let (_, _) = srv.session("ken", "user").await;

    let res = srv.get("/admin", &admin).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none()));
    let ken = users.iter().find(|u| u["username"] == "ken").unwrap();
    let ken_id = ken["id"].as_i64().unwrap();

    let update = |body: Value| {
        srv.client
            .put(srv.url("/admin/update-role"))
            .bearer_auth(&admin)
            .json(&body)
            .send()
    };

    let res = update(json!({ "userId": ken_id, "newRole": "moderator" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "User role updated successfully");
    assert_eq!(body["updatedUser"]["role"], "moderator");
    assert_eq!(body["updatedUser"]["username"], "ken");

    let res = update(json!({ "userId": ken_id.to_string(), "newRole": "superuser" }))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(res).await, "Invalid role specified");

    let res = update(json!({ "userId": "abc", "newRole": "user" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = update(json!({ "userId": 999, "newRole": "user" })).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(message(res).await, "User not found or role update failed");
}

#[tokio::test]
async fn logout_ends_the_whole_session() {
    let srv = TestServer::spawn().await;
    let (access, refresh) = srv.session("leo", "admin").await;

    assert_eq!(srv.logout(&access).await.status(), StatusCode::OK);

    let res = srv
        .client
        .post(srv.url("/refresh"))
        .json(&json!({ "refreshtoken": refresh }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["description"], "Token has been invalidated");
}

#[tokio::test]
async fn logout_after_refresh_revokes_earlier_tokens() {
    let srv = TestServer::spawn().await;
    let (first_access, refresh) = srv.session("mia", "user").await;

    let body: Value = srv
        .client
        .post(srv.url("/refresh"))
        .json(&json!({ "refreshtoken": refresh }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let renewed = body["tokens"]["accesstoken"].as_str().unwrap().to_string();

    srv.logout(&renewed).await;

    let res = srv.get("/profile", &first_access).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(res).await, "Token has been invalidated");

    // A new login starts a new session.
    let body: Value = srv.login("mia", "pw").await.json().await.unwrap();
    let fresh = body["tokens"]["accesstoken"].as_str().unwrap();
    assert_eq!(srv.get("/profile", fresh).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_store_failure_is_reported_with_detail() {
    let srv = TestServer::spawn_with(state_with(
        Arc::new(UnavailableUserStore),
        Arc::new(InMemoryRevocationRegistry::new()),
    ))
    .await;

    let res = srv.login("alice", "p1").await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": -1,
            "description": "Database error\nError message: database error: connection refused",
        })
    );

    let admin = mint_jwt(SECRET, "admin", ChronoDuration::minutes(10));
    let res = srv.get("/admin", &admin).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Internal server error",
            "error": "database error: connection refused",
        })
    );
}

#[tokio::test]
async fn revocation_backend_failure_is_reported_with_detail() {
    let srv = TestServer::spawn_with(state_with(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(UnavailableRegistry),
    ))
    .await;

    let token = mint_jwt(SECRET, "user", ChronoDuration::minutes(10));
    let res = srv.get("/profile", &token).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Internal server error",
            "error": "revocation backend error: connection reset",
        })
    );
}
