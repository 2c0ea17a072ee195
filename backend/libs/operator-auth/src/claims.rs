use crate::config::{TokenPolicy, MAX_VALIDITY_SECONDS};
use crate::error::{AuthError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The one identity this server knows about.
pub const OPERATOR_SUBJECT: &str = "operator";

/// JWT claims carried by every operator bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Always [`OPERATOR_SUBJECT`]
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token identifier, for log correlation
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Claims for a token issued at `issued_at`.
    ///
    /// A lifetime outside `1..=MAX_VALIDITY_SECONDS` or an expiry past the
    /// representable range is a server fault, never a rejection.
    pub(crate) fn operator(issued_at: DateTime<Utc>, policy: &TokenPolicy) -> Result<Self> {
        let validity = policy.validity.num_seconds();
        if !(1..=MAX_VALIDITY_SECONDS).contains(&validity) {
            return Err(AuthError::Signing(format!(
                "token validity of {validity}s is out of range"
            )));
        }

        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(validity)
            .filter(|exp| DateTime::<Utc>::from_timestamp(*exp, 0).is_some())
            .ok_or_else(|| AuthError::Signing("token expiry is out of range".to_string()))?;

        Ok(Self {
            sub: OPERATOR_SUBJECT.to_string(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
            iss: policy.issuer.clone(),
            aud: policy.audience.clone(),
        })
    }
}
