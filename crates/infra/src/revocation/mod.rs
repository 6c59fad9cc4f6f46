//! Revocation registry backends that outlive a single process.
//!
//! The in-process default lives in `roleguard-auth`; the backends here share
//! the blacklist between instances.

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisRevocationRegistry;
