use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuthError>;

/// Every way operator authentication can fail.
///
/// The rejection variants exist for diagnostics only. Callers facing the
/// network must collapse them into one unauthorized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no operator password provided")]
    StartupCredentialMissing,

    #[error("invalid operator credential")]
    InvalidCredential,

    #[error("missing bearer token")]
    Missing,

    #[error("malformed token")]
    Malformed,

    #[error("token signature mismatch")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("token issued in the future")]
    NotYetValid,

    #[error("token claims rejected")]
    InvalidClaims,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// True when the failure was caused by the caller rather than the server.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AuthError::StartupCredentialMissing
                | AuthError::KeyDerivation(_)
                | AuthError::Signing(_)
        )
    }

    /// Short stable label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::StartupCredentialMissing => "startup_credential_missing",
            AuthError::InvalidCredential => "invalid_credential",
            AuthError::Missing => "missing",
            AuthError::Malformed => "malformed",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::NotYetValid => "not_yet_valid",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::KeyDerivation(_) => "key_derivation",
            AuthError::Signing(_) => "signing",
        }
    }
}

/// Maps token decoding failures onto the rejection taxonomy.
impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience | ErrorKind::InvalidSubject => {
                AuthError::InvalidClaims
            }
            _ => AuthError::Malformed,
        }
    }
}
