use crate::error::{AuthError, Result};
use crate::strength::{self, CredentialStrength};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// The shared operator password.
///
/// Only lives until the signing key has been derived from it; the
/// initialization path takes it by value and drops it afterwards.
pub struct OperatorCredential(SecretString);

impl OperatorCredential {
    /// Wrap a launch-time password. An empty string is a fatal startup error.
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(AuthError::StartupCredentialMissing);
        }
        Ok(Self(SecretString::from(raw)))
    }

    /// Same as [`OperatorCredential::new`], treating an absent argument like an empty one.
    pub fn from_launch_arg(raw: Option<String>) -> Result<Self> {
        match raw {
            Some(raw) => Self::new(raw),
            None => Err(AuthError::StartupCredentialMissing),
        }
    }

    pub fn strength(&self) -> CredentialStrength {
        strength::assess(self.expose())
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for OperatorCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OperatorCredential([REDACTED])")
    }
}
