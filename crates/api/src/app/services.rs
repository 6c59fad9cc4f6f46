//! Backend selection: which user store and revocation registry the process runs on.

use std::sync::Arc;

use roleguard_auth::{CredentialStore, InMemoryRevocationRegistry, RevocationRegistry, TokenService};
use roleguard_infra::{InMemoryUserStore, PostgresUserStore, UserStore};

use crate::config::ApiConfig;
use crate::state::AppState;

pub async fn build_state(config: &ApiConfig) -> anyhow::Result<AppState> {
    let tokens = TokenService::new(&config.access_secret)?;
    let credentials = CredentialStore::with_cost(config.bcrypt_cost);

    let users = build_user_store(config).await?;
    let revocations = build_revocation_registry(config).await?;

    Ok(AppState::new(tokens, credentials, users, revocations))
}

async fn build_user_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresUserStore::connect(url).await?;
            tracing::info!("using postgres user store");
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
    }
}

async fn build_revocation_registry(config: &ApiConfig) -> anyhow::Result<Arc<dyn RevocationRegistry>> {
    if let Some(url) = config.redis_url.as_deref() {
        #[cfg(feature = "redis")]
        {
            let registry = roleguard_infra::revocation::RedisRevocationRegistry::connect(url).await?;
            tracing::info!("using redis revocation registry");
            return Ok(Arc::new(registry));
        }
        #[cfg(not(feature = "redis"))]
        {
            let _ = url;
            tracing::warn!("REDIS_URL set but redis feature not enabled, falling back to in-memory");
        }
    }

    Ok(Arc::new(InMemoryRevocationRegistry::new()))
}
