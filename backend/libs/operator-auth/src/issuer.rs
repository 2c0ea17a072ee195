use crate::claims::Claims;
use crate::config::TokenPolicy;
use crate::error::{AuthError, Result};
use crate::kdf::{CredentialVerifier, SecretDeriver, SigningKey};
use crate::token::BearerToken;
use crate::TOKEN_ALGORITHM;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;
use tracing::{debug, info};

/// Exchanges the operator password for a signed bearer token.
pub struct TokenIssuer {
    deriver: Arc<SecretDeriver>,
    verifier: CredentialVerifier,
    encoding_key: EncodingKey,
    policy: TokenPolicy,
}

impl TokenIssuer {
    pub(crate) fn new(
        deriver: Arc<SecretDeriver>,
        verifier: CredentialVerifier,
        signing_key: &SigningKey,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            deriver,
            verifier,
            encoding_key: EncodingKey::from_secret(signing_key.as_bytes()),
            policy,
        }
    }

    /// Check `supplied` against the operator password and mint a token on match.
    ///
    /// Runs one full KDF evaluation whatever the input, so callers should keep
    /// it off async executor threads.
    pub fn issue(&self, supplied: &str) -> Result<BearerToken> {
        self.issue_at(supplied, Utc::now())
    }

    /// [`TokenIssuer::issue`] with an explicit issuance instant.
    pub fn issue_at(&self, supplied: &str, issued_at: DateTime<Utc>) -> Result<BearerToken> {
        let candidate = self.deriver.verifier_for(supplied)?;
        if !self.verifier.matches(&candidate) {
            debug!("operator credential mismatch");
            return Err(AuthError::InvalidCredential);
        }

        self.mint(issued_at)
    }

    /// Reject a login request whose body could not be read.
    ///
    /// Spends the same KDF work as a wrong password so both outcomes look alike.
    pub fn reject_malformed(&self) -> AuthError {
        match self.deriver.verifier_for("") {
            Ok(candidate) => {
                let _ = self.verifier.matches(&candidate);
                AuthError::InvalidCredential
            }
            Err(e) => e,
        }
    }

    pub fn validity(&self) -> Duration {
        self.policy.validity
    }

    fn mint(&self, issued_at: DateTime<Utc>) -> Result<BearerToken> {
        let claims = Claims::operator(issued_at, &self.policy)?;

        let token = encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        info!(jti = %claims.jti, exp = claims.exp, "operator token issued");
        BearerToken::new(token, &claims)
    }
}
