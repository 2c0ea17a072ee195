use crate::claims::{Claims, OPERATOR_SUBJECT};
use crate::config::TokenPolicy;
use crate::error::{AuthError, Result};
use crate::kdf::SigningKey;
use crate::token::AuthenticatedPrincipal;
use crate::TOKEN_ALGORITHM;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

/// Verifies operator bearer tokens against this process's signing key.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
    policy: TokenPolicy,
}

impl TokenValidator {
    pub(crate) fn new(signing_key: &SigningKey, policy: TokenPolicy) -> Self {
        // Signature and structure only; time and claim checks below run
        // against the caller's clock after the signature has verified.
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(signing_key.as_bytes()),
            validation,
            policy,
        }
    }

    pub fn validate(&self, token: &str) -> Result<AuthenticatedPrincipal> {
        self.validate_at(token, Utc::now())
    }

    /// [`TokenValidator::validate`] against an explicit clock reading.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedPrincipal> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token decode failed");
                AuthError::from(e)
            })?
            .claims;

        let now = now.timestamp();
        let leeway = self.policy.leeway.num_seconds();

        if claims.exp < now - leeway {
            return Err(AuthError::Expired);
        }
        if claims.iat > now + leeway {
            return Err(AuthError::NotYetValid);
        }
        self.check_claims(&claims)?;

        AuthenticatedPrincipal::from_claims(claims)
    }

    fn check_claims(&self, claims: &Claims) -> Result<()> {
        if claims.sub != OPERATOR_SUBJECT {
            return Err(AuthError::InvalidClaims);
        }
        if let Some(issuer) = &self.policy.issuer {
            if claims.iss.as_ref() != Some(issuer) {
                return Err(AuthError::InvalidClaims);
            }
        }
        if let Some(audience) = &self.policy.audience {
            if claims.aud.as_ref() != Some(audience) {
                return Err(AuthError::InvalidClaims);
            }
        }
        Ok(())
    }
}
