//! Operator authentication for the team server
//!
//! **Flow**:
//! - The operator password is supplied once at launch and stretched into a
//!   signing key plus a login verifier ([`SecretDeriver`])
//! - `POST /auth/login` trades the password for an HS256 bearer token
//!   ([`TokenIssuer`])
//! - Every protected request presents the token, which is checked for
//!   signature and expiry ([`TokenValidator`])
//!
//! Tokens are stateless. There is no revocation list; a restart draws a new
//! KDF salt, which invalidates everything issued before it.

use jsonwebtoken::Algorithm;
use std::sync::Arc;
use tracing::info;

mod claims;
pub mod config;
pub mod credential;
pub mod error;
pub mod issuer;
pub mod kdf;
pub mod strength;
pub mod token;
pub mod validator;

pub use claims::{Claims, OPERATOR_SUBJECT};
pub use config::{AuthConfig, TokenPolicy, MAX_VALIDITY_SECONDS};
pub use credential::OperatorCredential;
pub use error::{AuthError, Result};
pub use issuer::TokenIssuer;
pub use kdf::{KdfParams, SecretDeriver, SigningKey};
pub use strength::CredentialStrength;
pub use token::{AuthenticatedPrincipal, BearerToken};
pub use validator::TokenValidator;

/// Only algorithm ever produced or accepted.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Issuer and validator sharing one derived signing key.
#[derive(Clone)]
pub struct OperatorAuth {
    issuer: Arc<TokenIssuer>,
    validator: Arc<TokenValidator>,
}

impl OperatorAuth {
    /// Derive key material from the launch credential and build the auth state.
    ///
    /// Consumes the credential; the plaintext password is gone once this returns.
    pub fn initialize(credential: OperatorCredential, config: AuthConfig) -> Result<Self> {
        let deriver = SecretDeriver::new(config.kdf)?;
        Self::with_deriver(credential, deriver, config.tokens)
    }

    pub fn with_deriver(
        credential: OperatorCredential,
        deriver: SecretDeriver,
        policy: TokenPolicy,
    ) -> Result<Self> {
        let (signing_key, verifier) = deriver.derive_keys(&credential)?;
        drop(credential);

        let deriver = Arc::new(deriver);
        let issuer = TokenIssuer::new(deriver, verifier, &signing_key, policy.clone());
        let validator = TokenValidator::new(&signing_key, policy);

        info!("operator signing key derived");
        Ok(Self {
            issuer: Arc::new(issuer),
            validator: Arc::new(validator),
        })
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    pub fn validator(&self) -> &Arc<TokenValidator> {
        &self.validator
    }
}
