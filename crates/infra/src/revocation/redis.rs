//! Redis-backed revocation registry (optional).
//!
//! Stores revoked entries in a single Redis set so every instance behind a
//! load balancer sees the same blacklist. Set commands are atomic on the
//! server.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use roleguard_auth::{RevocationError, RevocationRegistry};

const REVOKED_SET_KEY: &str = "roleguard:revoked-tokens";

/// Registry over one multiplexed connection that reconnects on failure.
#[derive(Clone)]
pub struct RedisRevocationRegistry {
    connection: ConnectionManager,
}

fn backend(e: redis::RedisError) -> RevocationError {
    RevocationError::Backend(e.to_string())
}

impl RedisRevocationRegistry {
    pub async fn connect(redis_url: &str) -> Result<Self, RevocationError> {
        let client = redis::Client::open(redis_url).map_err(backend)?;
        let connection = ConnectionManager::new(client).await.map_err(backend)?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl RevocationRegistry for RedisRevocationRegistry {
    async fn add(&self, entry: &str) -> Result<(), RevocationError> {
        let mut conn = self.connection.clone();
        let _: i64 = conn.sadd(REVOKED_SET_KEY, entry).await.map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, entry: &str) -> Result<(), RevocationError> {
        let mut conn = self.connection.clone();
        let _: i64 = conn.srem(REVOKED_SET_KEY, entry).await.map_err(backend)?;
        Ok(())
    }

    async fn contains(&self, entry: &str) -> Result<bool, RevocationError> {
        let mut conn = self.connection.clone();
        conn.sismember(REVOKED_SET_KEY, entry).await.map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_a_backend_error() {
        let err = RedisRevocationRegistry::connect("not a redis url")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RevocationError::Backend(_)));
    }
}
