use crate::claims::{Claims, OPERATOR_SUBJECT};
use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use std::fmt;

/// A signed operator token as handed to the client.
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl BearerToken {
    pub(crate) fn new(value: String, claims: &Claims) -> Result<Self> {
        Ok(Self {
            value,
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Lifetime in seconds, as advertised in the login response.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The authenticated operator, as seen by protected handlers.
///
/// There is exactly one authorizable identity; the token id and expiry are
/// exposed for auditing only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    token_id: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthenticatedPrincipal {
    pub(crate) fn from_claims(claims: Claims) -> Result<Self> {
        Ok(Self {
            issued_at: timestamp(claims.iat)?,
            expires_at: timestamp(claims.exp)?,
            token_id: claims.jti,
        })
    }

    pub fn subject(&self) -> &'static str {
        OPERATOR_SUBJECT
    }

    pub fn token_id(&self) -> &str {
        &self.token_id
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or(AuthError::Malformed)
}
