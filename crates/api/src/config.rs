//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use roleguard_auth::DEFAULT_COST;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// HMAC secret for signing tokens (`ACCESS_SECRET_KEY`).
    pub access_secret: String,
    /// Postgres connection string; `None` selects the in-memory user store.
    pub database_url: Option<String>,
    /// Redis connection string for a shared revocation registry.
    pub redis_url: Option<String>,
    pub bcrypt_cost: u32,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("access_secret", &"<redacted>")
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("redis_url", &self.redis_url)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_secret = get("ACCESS_SECRET_KEY").ok_or(ConfigError::Missing("ACCESS_SECRET_KEY"))?;

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: e.to_string(),
            })?;

        let bcrypt_cost = match get("BCRYPT_COST") {
            None => DEFAULT_COST,
            Some(raw) => {
                let cost = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                    key: "BCRYPT_COST",
                    message: e.to_string(),
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        key: "BCRYPT_COST",
                        message: format!("{cost} is outside 4..=31"),
                    });
                }
                cost
            }
        };

        Ok(Self {
            bind_addr,
            access_secret,
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
            bcrypt_cost,
        })
    }
}
