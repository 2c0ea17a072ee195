//! Configuration for the team server
//!
//! Loaded from environment variables, optionally seeded from a `.env` file.
//! The operator password is not part of this: it arrives on the command line.

use crate::logging::LogFormat;
use actix_middleware::LoginRateLimitConfig;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Duration;
use operator_auth::{AuthConfig, KdfParams, TokenPolicy, MAX_VALIDITY_SECONDS};
use std::env;

/// Application settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthConfig,
    pub login_limit: LoginRateLimitConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unset keys take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerSettings {
            host: var("TEAMSERVER_HOST", "0.0.0.0"),
            port: var("TEAMSERVER_PORT", "5000")
                .parse()
                .context("Invalid TEAMSERVER_PORT")?,
            workers: optional("TEAMSERVER_WORKERS")
                .map(|v| v.parse::<usize>())
                .transpose()
                .context("Invalid TEAMSERVER_WORKERS")?,
        };
        if server.workers == Some(0) {
            bail!("TEAMSERVER_WORKERS must be at least 1");
        }

        let validity: i64 = var("TOKEN_VALIDITY_SECONDS", "28800")
            .parse()
            .context("Invalid TOKEN_VALIDITY_SECONDS")?;
        if validity <= 0 {
            bail!("TOKEN_VALIDITY_SECONDS must be positive");
        }
        if validity > MAX_VALIDITY_SECONDS {
            bail!("TOKEN_VALIDITY_SECONDS must be at most {MAX_VALIDITY_SECONDS}");
        }
        let leeway: u32 = var("TOKEN_LEEWAY_SECONDS", "0")
            .parse()
            .context("Invalid TOKEN_LEEWAY_SECONDS")?;

        let tokens = TokenPolicy {
            validity: Duration::seconds(validity),
            leeway: Duration::seconds(i64::from(leeway)),
            issuer: optional("TOKEN_ISSUER"),
            audience: optional("TOKEN_AUDIENCE"),
        };

        let defaults = KdfParams::default();
        let kdf = KdfParams {
            memory_kib: var("KDF_MEMORY_KIB", &defaults.memory_kib.to_string())
                .parse()
                .context("Invalid KDF_MEMORY_KIB")?,
            iterations: var("KDF_ITERATIONS", &defaults.iterations.to_string())
                .parse()
                .context("Invalid KDF_ITERATIONS")?,
            parallelism: var("KDF_PARALLELISM", &defaults.parallelism.to_string())
                .parse()
                .context("Invalid KDF_PARALLELISM")?,
        };

        let login_limit = LoginRateLimitConfig {
            attempts_per_minute: var("LOGIN_ATTEMPTS_PER_MINUTE", "10")
                .parse()
                .context("Invalid LOGIN_ATTEMPTS_PER_MINUTE")?,
            burst: var("LOGIN_BURST", "5")
                .parse()
                .context("Invalid LOGIN_BURST")?,
        };

        let log_format = var("LOG_FORMAT", "pretty")
            .parse::<LogFormat>()
            .map_err(|e| anyhow!("Invalid LOG_FORMAT: {e}"))?;

        Ok(Self {
            server,
            auth: AuthConfig { kdf, tokens },
            login_limit,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = load(&[]).unwrap();

        assert_eq!(settings.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(settings.server.workers, None);
        assert_eq!(settings.auth.tokens.validity, Duration::hours(8));
        assert_eq!(settings.auth.tokens.leeway, Duration::zero());
        assert_eq!(settings.auth.tokens.issuer, None);
        assert_eq!(settings.auth.kdf, KdfParams::default());
        assert_eq!(settings.login_limit, LoginRateLimitConfig::default());
        assert_eq!(settings.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let settings = load(&[
            ("TEAMSERVER_HOST", "127.0.0.1"),
            ("TEAMSERVER_PORT", "8443"),
            ("TEAMSERVER_WORKERS", "2"),
            ("TOKEN_VALIDITY_SECONDS", "600"),
            ("TOKEN_LEEWAY_SECONDS", "5"),
            ("TOKEN_ISSUER", "teamserver"),
            ("TOKEN_AUDIENCE", "operators"),
            ("KDF_MEMORY_KIB", "65536"),
            ("LOGIN_ATTEMPTS_PER_MINUTE", "0"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(settings.server.bind_addr(), "127.0.0.1:8443");
        assert_eq!(settings.server.workers, Some(2));
        assert_eq!(settings.auth.tokens.validity, Duration::seconds(600));
        assert_eq!(settings.auth.tokens.leeway, Duration::seconds(5));
        assert_eq!(settings.auth.tokens.issuer.as_deref(), Some("teamserver"));
        assert_eq!(settings.auth.tokens.audience.as_deref(), Some("operators"));
        assert_eq!(settings.auth.kdf.memory_kib, 65536);
        assert_eq!(settings.login_limit.attempts_per_minute, 0);
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        for (key, value) in [
            ("TEAMSERVER_PORT", "http"),
            ("TEAMSERVER_WORKERS", "0"),
            ("TOKEN_VALIDITY_SECONDS", "0"),
            ("TOKEN_VALIDITY_SECONDS", "315360001"),
            ("TOKEN_VALIDITY_SECONDS", "10000000000000000"),
            ("TOKEN_LEEWAY_SECONDS", "-1"),
            ("KDF_ITERATIONS", "many"),
            ("LOGIN_BURST", "lots"),
            ("LOG_FORMAT", "xml"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert!(
                format!("{err:#}").contains(key),
                "error for {key} was {err:#}"
            );
        }
    }

    #[test]
    fn test_longest_validity_is_accepted() {
        let settings = load(&[("TOKEN_VALIDITY_SECONDS", "315360000")]).unwrap();
        assert_eq!(
            settings.auth.tokens.validity,
            Duration::seconds(MAX_VALIDITY_SECONDS)
        );
    }

    #[test]
    fn test_blank_issuer_is_unset() {
        let settings = load(&[("TOKEN_ISSUER", "  ")]).unwrap();
        assert_eq!(settings.auth.tokens.issuer, None);
    }
}
