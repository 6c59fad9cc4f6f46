//! `roleguard-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to hash credentials, sign and verify tokens, track revoked tokens and
//! decide whether a role holds a permission.

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod identity;
pub mod permissions;
pub mod policy;
pub mod revocation;
pub mod roles;
pub mod token;

pub use authorize::{authorize, AuthzError};
pub use claims::{validate_claims, Claims, TokenKind, TokenValidationError};
pub use credentials::{CredentialError, CredentialStore, DEFAULT_COST};
pub use identity::Identity;
pub use permissions::Permission;
pub use policy::RolePolicy;
pub use revocation::{session_key, InMemoryRevocationRegistry, RevocationError, RevocationRegistry};
pub use roles::Role;
pub use token::{TokenError, TokenPair, TokenService};
