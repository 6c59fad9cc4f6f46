//! Signed access/refresh token issuance and verification (HS256 JWT).

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{validate_claims, Claims, Identity, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signing secret is empty. Raised at construction, never per call.
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Malformed, mis-signed, expired, or of the wrong kind.
    /// Carries no detail about which check failed.
    #[error("invalid token")]
    Invalid,
}

/// Access and refresh token minted together for one identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub accesstoken: String,
    pub refreshtoken: String,
}

/// Issues and verifies tokens under a single shared secret.
///
/// Cheap to clone; keys are shared behind `Arc`.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service with the standard lifetimes (1 hour access,
    /// 3 days refresh).
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret)),
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            validation: Arc::new(validation),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(3),
        })
    }

    /// Issue an access/refresh pair for `identity` under a new session.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a pair under a new session as if the current time were `now`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        self.issue_session(identity, &Uuid::now_v7().to_string(), now)
    }

    /// Verify signature and expiry of any token kind and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            TokenError::Invalid
        })?;

        validate_claims(&data.claims, Utc::now()).map_err(|e| {
            tracing::debug!(error = %e, "token claims rejected");
            TokenError::Invalid
        })?;

        Ok(data.claims)
    }

    /// Verify a token and require it to be an access token.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Access)
    }

    /// Verify a token and require it to be a refresh token.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    /// Mint a fresh pair continuing the session of verified refresh claims.
    pub fn refresh(&self, claims: &Claims) -> Result<TokenPair, TokenError> {
        if claims.typ != TokenKind::Refresh {
            return Err(TokenError::Invalid);
        }
        self.issue_session(&claims.identity(), &claims.sid, Utc::now())
    }

    fn issue_session(
        &self,
        identity: &Identity,
        sid: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            accesstoken: self.sign(identity, sid, TokenKind::Access, now)?,
            refreshtoken: self.sign(identity, sid, TokenKind::Refresh, now)?,
        })
    }

    fn verify_kind(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.typ != kind {
            tracing::debug!(expected = ?kind, actual = ?claims.typ, "token kind mismatch");
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }

    fn sign(
        &self,
        identity: &Identity,
        sid: &str,
        kind: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            username: identity.username.clone(),
            role: identity.role.clone(),
            typ: kind,
            jti: Uuid::now_v7().to_string(),
            sid: sid.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}
