use crate::kdf::KdfParams;
use chrono::Duration;

const DEFAULT_VALIDITY_HOURS: i64 = 8;

/// Longest token lifetime the issuer will sign, ten years.
pub const MAX_VALIDITY_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// How tokens are minted and what the validator insists on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Lifetime of an issued token
    pub validity: Duration,
    /// Clock skew tolerated on `exp` and `iat`
    pub leeway: Duration,
    /// Embedded as `iss` and required on validation when set
    pub issuer: Option<String>,
    /// Embedded as `aud` and required on validation when set
    pub audience: Option<String>,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            validity: Duration::hours(DEFAULT_VALIDITY_HOURS),
            leeway: Duration::zero(),
            issuer: None,
            audience: None,
        }
    }
}

impl TokenPolicy {
    pub fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

/// Everything needed to turn the operator password into a working auth state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    pub kdf: KdfParams,
    pub tokens: TokenPolicy,
}
