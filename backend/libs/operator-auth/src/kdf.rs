//! Operator password -> key material
//!
//! Argon2id stretches the password (with a salt drawn once per process) into a
//! master secret. HKDF-SHA256 then expands the master into two independent
//! subkeys: the HS256 token signing key and the login verifier that incoming
//! passwords are compared against. Neither subkey reveals the other.

use crate::credential::OperatorCredential;
use crate::error::{AuthError, Result};
use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const SALT_LEN: usize = 16;
pub const SIGNING_KEY_LEN: usize = 64;
const MASTER_LEN: usize = 32;
const VERIFIER_LEN: usize = 32;

const SIGNING_INFO: &[u8] = b"teamserver/v1/token-signing";
const VERIFIER_INFO: &[u8] = b"teamserver/v1/login-verifier";

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Symmetric key used to sign and verify bearer tokens.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey([u8; SIGNING_KEY_LEN]);

impl SigningKey {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq for SigningKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for SigningKey {}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey([REDACTED])")
    }
}

/// KDF output that a supplied login password must reproduce.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct CredentialVerifier([u8; VERIFIER_LEN]);

impl CredentialVerifier {
    pub(crate) fn matches(&self, candidate: &CredentialVerifier) -> bool {
        self.0[..].ct_eq(&candidate.0[..]).into()
    }
}

/// Deterministic password-to-key derivation for the lifetime of one process.
pub struct SecretDeriver {
    params: Params,
    salt: [u8; SALT_LEN],
}

impl SecretDeriver {
    /// Deriver with a fresh random salt. Keys from a previous process never
    /// match keys from this one, even for the same password.
    pub fn new(params: KdfParams) -> Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::with_salt(params, salt)
    }

    pub fn with_salt(params: KdfParams, salt: [u8; SALT_LEN]) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(MASTER_LEN),
        )
        .map_err(|e| AuthError::KeyDerivation(format!("invalid Argon2 parameters: {e}")))?;

        Ok(Self { params, salt })
    }

    /// Derive the token signing key for `credential`.
    pub fn derive(&self, credential: &OperatorCredential) -> Result<SigningKey> {
        let master = self.master(credential.expose().as_bytes())?;
        self.signing_key(&master)
    }

    /// One Argon2 pass producing both subkeys, used when the auth state is built.
    pub(crate) fn derive_keys(
        &self,
        credential: &OperatorCredential,
    ) -> Result<(SigningKey, CredentialVerifier)> {
        let master = self.master(credential.expose().as_bytes())?;
        Ok((self.signing_key(&master)?, self.verifier(&master)?))
    }

    /// Verifier for a password supplied at login time.
    pub(crate) fn verifier_for(&self, supplied: &str) -> Result<CredentialVerifier> {
        let master = self.master(supplied.as_bytes())?;
        self.verifier(&master)
    }

    fn master(&self, secret: &[u8]) -> Result<Zeroizing<[u8; MASTER_LEN]>> {
        let mut master = Zeroizing::new([0u8; MASTER_LEN]);
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password_into(secret, &self.salt, &mut master[..])
            .map_err(|e| AuthError::KeyDerivation(e.to_string()))?;
        Ok(master)
    }

    fn signing_key(&self, master: &[u8; MASTER_LEN]) -> Result<SigningKey> {
        let mut key = SigningKey([0u8; SIGNING_KEY_LEN]);
        expand(master, SIGNING_INFO, &mut key.0)?;
        Ok(key)
    }

    fn verifier(&self, master: &[u8; MASTER_LEN]) -> Result<CredentialVerifier> {
        let mut verifier = CredentialVerifier([0u8; VERIFIER_LEN]);
        expand(master, VERIFIER_INFO, &mut verifier.0)?;
        Ok(verifier)
    }
}

impl fmt::Debug for SecretDeriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDeriver")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish_non_exhaustive()
    }
}

fn expand(master: &[u8], info: &[u8], out: &mut [u8]) -> Result<()> {
    Hkdf::<Sha256>::new(None, master)
        .expand(info, out)
        .map_err(|e| AuthError::KeyDerivation(format!("HKDF expand failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };

    fn credential(raw: &str) -> OperatorCredential {
        OperatorCredential::new(raw).unwrap()
    }

    #[test]
    fn test_derive_is_deterministic() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        let first = deriver.derive(&credential("hunter2")).unwrap();
        let second = deriver.derive(&credential("hunter2")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_bytes().len(), SIGNING_KEY_LEN);
    }

    #[test]
    fn test_same_salt_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = SecretDeriver::with_salt(FAST, salt).unwrap();
        let b = SecretDeriver::with_salt(FAST, salt).unwrap();
        assert_eq!(
            a.derive(&credential("hunter2")).unwrap(),
            b.derive(&credential("hunter2")).unwrap()
        );
    }

    #[test]
    fn test_new_process_salt_changes_key() {
        let a = SecretDeriver::new(FAST).unwrap();
        let b = SecretDeriver::new(FAST).unwrap();
        assert_ne!(
            a.derive(&credential("hunter2")).unwrap(),
            b.derive(&credential("hunter2")).unwrap()
        );
    }

    #[test]
    fn test_different_passwords_different_keys() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        assert_ne!(
            deriver.derive(&credential("hunter2")).unwrap(),
            deriver.derive(&credential("hunter3")).unwrap()
        );
    }

    #[test]
    fn test_key_is_not_raw_password() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        let key = deriver.derive(&credential("hunter2")).unwrap();
        assert!(!key
            .as_bytes()
            .windows(b"hunter2".len())
            .any(|w| w == b"hunter2"));
    }

    #[test]
    fn test_signing_key_matches_derive_keys() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        let cred = credential("hunter2");
        let (signing, _) = deriver.derive_keys(&cred).unwrap();
        assert_eq!(signing, deriver.derive(&cred).unwrap());
    }

    #[test]
    fn test_verifier_round_trip() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        let (_, stored) = deriver.derive_keys(&credential("hunter2")).unwrap();

        assert!(stored.matches(&deriver.verifier_for("hunter2").unwrap()));
        assert!(!stored.matches(&deriver.verifier_for("hunter3").unwrap()));
        assert!(!stored.matches(&deriver.verifier_for("").unwrap()));
    }

    #[test]
    fn test_verifier_differs_from_signing_key() {
        let deriver = SecretDeriver::new(FAST).unwrap();
        let (signing, verifier) = deriver.derive_keys(&credential("hunter2")).unwrap();
        assert_ne!(&signing.as_bytes()[..VERIFIER_LEN], &verifier.0[..]);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = KdfParams {
            memory_kib: 1,
            iterations: 1,
            parallelism: 1,
        };
        assert!(matches!(
            SecretDeriver::new(params),
            Err(AuthError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_debug_hides_salt() {
        let deriver = SecretDeriver::with_salt(FAST, [0xAB; SALT_LEN]).unwrap();
        let rendered = format!("{:?}", deriver);
        assert!(!rendered.contains("171"));
        assert!(format!("{:?}", deriver.derive(&credential("x")).unwrap()).contains("REDACTED"));
    }
}
